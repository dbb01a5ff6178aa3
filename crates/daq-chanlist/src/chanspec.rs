//! Packed channel specifications.
//!
//! A chanspec is the 32-bit word Comedi uses to describe one chanlist entry:
//!
//! ```text
//!  31  30  29  28  27  26  25  24  23 ........ 16  15 ................ 0
//! ┌───┬───┬───┬───┬───┬───┬───────┬──────────────┬─────────────────────┐
//! │INV│EDG│ - │ - │SRC│FLT│ AREF  │    RANGE     │       CHANNEL       │
//! └───┴───┴───┴───┴───┴───┴───────┴──────────────┴─────────────────────┘
//! ```
//!
//! [`Chanspec`] keeps that exact layout so packed words can be handed to a
//! command chanlist unchanged.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Mask of the channel number field.
pub const CHANNEL_MASK: u32 = 0xffff;
/// Shift of the range index field.
pub const RANGE_SHIFT: u32 = 16;
/// Mask of the range index field (after shifting).
pub const RANGE_MASK: u32 = 0xff;
/// Shift of the analog reference field.
pub const AREF_SHIFT: u32 = 24;
/// Mask of the analog reference field (after shifting).
pub const AREF_MASK: u32 = 0x03;
/// Bits 26-31, the whole flag field including unassigned bits.
pub const FLAG_FIELD_MASK: u32 = 0xfc00_0000;
/// Assigned flag bits. Packing drops everything else.
pub const FLAGS_MASK: u32 = ChanspecFlags::all().bits();

bitflags! {
    /// Flag bits carried in the top of a chanspec.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ChanspecFlags: u32 {
        /// Alternate filter: dither on analog inputs, deglitch on digital inputs
        const ALT_FILTER = 1 << 26;
        /// Alternate (calibration) source
        const ALT_SOURCE = 1 << 27;
        /// Edge-triggered trigger source
        const EDGE = 1 << 30;
        /// Inverted trigger polarity
        const INVERT = 1 << 31;
    }
}

impl ChanspecFlags {
    /// Alias used for analog inputs.
    pub const DITHER: Self = Self::ALT_FILTER;
    /// Alias used for digital inputs.
    pub const DEGLITCH: Self = Self::ALT_FILTER;
}

/// Analog reference type for measurements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum AnalogReference {
    /// Ground reference (single-ended, referenced to ground)
    #[default]
    Ground = 0,
    /// Common reference (single-ended, referenced to common)
    Common = 1,
    /// Differential (measures difference between two inputs)
    Differential = 2,
    /// Other/board-specific reference
    Other = 3,
}

impl AnalogReference {
    /// Convert from raw Comedi value.
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Ground),
            1 => Some(Self::Common),
            2 => Some(Self::Differential),
            3 => Some(Self::Other),
            _ => None,
        }
    }

    /// Convert to raw Comedi value.
    pub fn to_raw(self) -> u32 {
        self as u32
    }

    // The field is two bits wide, so every value maps.
    fn from_field(bits: u32) -> Self {
        match bits & AREF_MASK {
            0 => Self::Ground,
            1 => Self::Common,
            2 => Self::Differential,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for AnalogReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ground => write!(f, "ground"),
            Self::Common => write!(f, "common"),
            Self::Differential => write!(f, "differential"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// A packed chanspec word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Chanspec(u32);

impl Chanspec {
    /// Pack channel, range, analog reference, and flags.
    ///
    /// Each field is masked to its width; unassigned flag bits are dropped.
    pub const fn pack(channel: u32, range: u32, aref: AnalogReference, flags: ChanspecFlags) -> Self {
        Self(
            ((aref as u32 & AREF_MASK) << AREF_SHIFT)
                | ((range & RANGE_MASK) << RANGE_SHIFT)
                | (channel & CHANNEL_MASK)
                | (flags.bits() & FLAGS_MASK),
        )
    }

    /// Wrap a raw word without checks.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw packed word.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Channel number (bits 0-15).
    pub const fn channel(self) -> u32 {
        self.0 & CHANNEL_MASK
    }

    /// Range index (bits 16-23).
    pub const fn range(self) -> u32 {
        (self.0 >> RANGE_SHIFT) & RANGE_MASK
    }

    /// Analog reference (bits 24-25).
    pub fn aref(self) -> AnalogReference {
        AnalogReference::from_field(self.0 >> AREF_SHIFT)
    }

    /// Flag bits (26-31), unassigned bits retained.
    pub const fn flags(self) -> ChanspecFlags {
        ChanspecFlags::from_bits_retain(self.0 & FLAG_FIELD_MASK)
    }

    /// Split into `(channel, range, aref, flags)`.
    pub fn unpack(self) -> (u32, u32, AnalogReference, ChanspecFlags) {
        (self.channel(), self.range(), self.aref(), self.flags())
    }
}

impl From<Chanspec> for u32 {
    fn from(spec: Chanspec) -> Self {
        spec.raw()
    }
}

impl From<u32> for Chanspec {
    fn from(raw: u32) -> Self {
        Self::from_raw(raw)
    }
}

impl fmt::Display for Chanspec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ch{} range {} {}",
            self.channel(),
            self.range(),
            self.aref()
        )?;
        if !self.flags().is_empty() {
            write!(f, " flags {:#x}", self.flags().bits())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_field_layout() {
        let spec = Chanspec::pack(
            0x1234,
            0x56,
            AnalogReference::Differential,
            ChanspecFlags::INVERT,
        );
        assert_eq!(spec.raw(), 0x8000_0000 | 0x0200_0000 | 0x0056_0000 | 0x1234);
        assert_eq!(spec.channel(), 0x1234);
        assert_eq!(spec.range(), 0x56);
        assert_eq!(spec.aref(), AnalogReference::Differential);
        assert_eq!(spec.flags(), ChanspecFlags::INVERT);
    }

    #[test]
    fn test_flags_mask() {
        assert_eq!(FLAGS_MASK, 0xcc00_0000);
        assert_eq!(ChanspecFlags::DITHER, ChanspecFlags::ALT_FILTER);

        // Unassigned bits 28/29 are dropped by pack but visible through from_raw
        let packed = Chanspec::pack(
            1,
            0,
            AnalogReference::Ground,
            ChanspecFlags::from_bits_retain(1 << 28),
        );
        assert!(packed.flags().is_empty());

        let raw = Chanspec::from_raw(1 << 29 | 7);
        assert_eq!(raw.channel(), 7);
        assert_eq!(raw.flags().bits(), 1 << 29);
    }

    #[test]
    fn test_out_of_width_masked() {
        let spec = Chanspec::pack(0x1_0005, 0x1ff, AnalogReference::Ground, ChanspecFlags::empty());
        assert_eq!(spec.channel(), 5);
        assert_eq!(spec.range(), 0xff);
        assert_eq!(spec.aref(), AnalogReference::Ground);
    }

    #[test]
    fn test_aref_raw() {
        assert_eq!(AnalogReference::from_raw(2), Some(AnalogReference::Differential));
        assert_eq!(AnalogReference::from_raw(4), None);
        assert_eq!(AnalogReference::Other.to_raw(), 3);
    }

    fn any_aref() -> impl Strategy<Value = AnalogReference> {
        prop_oneof![
            Just(AnalogReference::Ground),
            Just(AnalogReference::Common),
            Just(AnalogReference::Differential),
            Just(AnalogReference::Other),
        ]
    }

    proptest! {
        #[test]
        fn pack_unpack_is_lossless(
            channel in 0u32..=0xffff,
            range in 0u32..=0xff,
            aref in any_aref(),
            flag_bits in any::<u32>(),
        ) {
            let flags = ChanspecFlags::from_bits_truncate(flag_bits);
            let spec = Chanspec::pack(channel, range, aref, flags);
            prop_assert_eq!(spec.unpack(), (channel, range, aref, flags));
        }
    }
}
