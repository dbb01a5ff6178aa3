//! Subdevice capability descriptors.
//!
//! The validator never talks to hardware. A driver describes what a
//! subdevice supports through [`SubdeviceCapabilities`]; the concrete
//! [`CapabilityDescriptor`] covers the common case and can be built from a
//! Comedi `SDF_*` flag word or deserialized from configuration.
//!
//! # Example Configuration
//!
//! ```toml
//! [subdevice]
//! class = "analog_input"
//! n_channels = 16
//! ranges = 4
//! arefs = "GROUND | COMMON | DIFF | OTHER"
//! command = true
//! dither = true
//! ```

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::chanspec::{AnalogReference, ChanspecFlags};
use crate::direction::Direction;

/// Comedi subdevice flag bits relevant to chanlist validation.
pub mod sdf {
    /// Subdevice supports asynchronous commands
    pub const SDF_CMD: u32 = 0x1000;
    /// Ground reference supported
    pub const SDF_GROUND: u32 = 0x0010_0000;
    /// Common reference supported
    pub const SDF_COMMON: u32 = 0x0020_0000;
    /// Differential reference supported
    pub const SDF_DIFF: u32 = 0x0040_0000;
    /// Board-specific reference supported
    pub const SDF_OTHER: u32 = 0x0080_0000;
    /// Dithering supported (analog inputs)
    pub const SDF_DITHER: u32 = 0x0100_0000;
    /// Deglitching supported (digital inputs)
    pub const SDF_DEGLITCH: u32 = 0x0200_0000;
}

/// Comedi subdevice type codes for the classes this crate validates.
const COMEDI_SUBD_AI: i32 = 1;
const COMEDI_SUBD_DI: i32 = 3;
const COMEDI_SUBD_DIO: i32 = 5;

/// Class of subdevice a chanlist is validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubdeviceClass {
    /// Analog input
    AnalogInput,
    /// Digital input
    DigitalInput,
    /// Bidirectional digital I/O
    #[serde(rename = "digital_io")]
    DigitalIO,
}

impl SubdeviceClass {
    /// Convert from a raw Comedi subdevice type.
    ///
    /// Returns `None` for subdevice types that carry no chanlist rules here.
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            COMEDI_SUBD_AI => Some(Self::AnalogInput),
            COMEDI_SUBD_DI => Some(Self::DigitalInput),
            COMEDI_SUBD_DIO => Some(Self::DigitalIO),
            _ => None,
        }
    }

    /// Raw Comedi subdevice type.
    pub fn to_raw(self) -> i32 {
        match self {
            Self::AnalogInput => COMEDI_SUBD_AI,
            Self::DigitalInput => COMEDI_SUBD_DI,
            Self::DigitalIO => COMEDI_SUBD_DIO,
        }
    }

    /// Whether an entry with `aref` may be used on this class.
    ///
    /// Digital subdevices carry no analog reference, so only ground is legal.
    pub fn permits_aref(self, aref: AnalogReference, supported: ArefMask) -> bool {
        match self {
            Self::AnalogInput => supported.contains(ArefMask::from(aref)),
            Self::DigitalInput | Self::DigitalIO => aref == AnalogReference::Ground,
        }
    }

    /// Whether an entry with `direction` may be used on this class.
    pub fn permits_direction(self, direction: Direction, command_mode: bool) -> bool {
        use Direction::*;

        match (self, command_mode) {
            (Self::AnalogInput, false) => direction == Input,
            (Self::AnalogInput, true) => direction == Input || direction.is_trigger(),
            (Self::DigitalInput, false) => matches!(direction, Input | Base),
            (Self::DigitalInput, true) => direction != Output,
            (Self::DigitalIO, false) => matches!(direction, Input | Output | Base),
            (Self::DigitalIO, true) => true,
        }
    }
}

impl fmt::Display for SubdeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AnalogInput => write!(f, "Analog Input"),
            Self::DigitalInput => write!(f, "Digital Input"),
            Self::DigitalIO => write!(f, "Digital I/O"),
        }
    }
}

bitflags! {
    /// Set of analog references a subdevice accepts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ArefMask: u32 {
        /// Ground reference
        const GROUND = 1 << 0;
        /// Common reference
        const COMMON = 1 << 1;
        /// Differential reference
        const DIFF = 1 << 2;
        /// Board-specific reference
        const OTHER = 1 << 3;
    }
}

impl ArefMask {
    /// Extract the reference bits from a Comedi subdevice flag word.
    pub fn from_subdevice_flags(flags: u32) -> Self {
        let mut mask = Self::empty();
        mask.set(Self::GROUND, flags & sdf::SDF_GROUND != 0);
        mask.set(Self::COMMON, flags & sdf::SDF_COMMON != 0);
        mask.set(Self::DIFF, flags & sdf::SDF_DIFF != 0);
        mask.set(Self::OTHER, flags & sdf::SDF_OTHER != 0);
        mask
    }
}

impl From<AnalogReference> for ArefMask {
    fn from(aref: AnalogReference) -> Self {
        Self::from_bits_retain(1 << aref.to_raw())
    }
}

/// Number of ranges per channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RangeTable {
    /// Every channel shares one range table
    Uniform(u32),
    /// Per-channel range counts; channels past the end have none
    PerChannel(Vec<u32>),
}

impl RangeTable {
    /// Number of ranges available on `channel`.
    pub fn count(&self, channel: u32) -> u32 {
        match self {
            Self::Uniform(n) => *n,
            Self::PerChannel(counts) => counts.get(channel as usize).copied().unwrap_or(0),
        }
    }
}

impl Default for RangeTable {
    fn default() -> Self {
        Self::Uniform(1)
    }
}

/// What a subdevice reports about itself, as seen by the validator.
pub trait SubdeviceCapabilities {
    /// Class of the subdevice.
    fn subdevice_class(&self) -> SubdeviceClass;

    /// Number of channels.
    fn max_channel_count(&self) -> u32;

    /// Number of ranges available on `channel`.
    fn range_count(&self, channel: u32) -> u32;

    /// Analog references the subdevice accepts.
    fn supported_arefs(&self) -> ArefMask;

    /// Whether hardware command (streaming) mode is available.
    fn supports_command_mode(&self) -> bool;

    /// Chanspec flag bits the subdevice honours.
    fn supported_flags(&self) -> ChanspecFlags;
}

/// Immutable snapshot of one subdevice's capabilities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityDescriptor {
    /// Subdevice class
    pub class: SubdeviceClass,
    /// Number of channels
    pub n_channels: u32,
    /// Range table
    #[serde(default)]
    pub ranges: RangeTable,
    /// Supported analog references
    #[serde(default = "default_arefs")]
    pub arefs: ArefMask,
    /// Command (streaming) mode available
    #[serde(default)]
    pub command: bool,
    /// Dithering available
    #[serde(default)]
    pub dither: bool,
    /// Deglitching available
    #[serde(default)]
    pub deglitch: bool,
}

fn default_arefs() -> ArefMask {
    ArefMask::GROUND
}

impl CapabilityDescriptor {
    /// Create a descriptor with a uniform range table and ground reference only.
    pub fn new(class: SubdeviceClass, n_channels: u32, n_ranges: u32) -> Self {
        Self {
            class,
            n_channels,
            ranges: RangeTable::Uniform(n_ranges),
            arefs: default_arefs(),
            command: false,
            dither: false,
            deglitch: false,
        }
    }

    /// Build a descriptor from a Comedi `SDF_*` flag word.
    pub fn from_subdevice_flags(
        class: SubdeviceClass,
        n_channels: u32,
        ranges: RangeTable,
        flags: u32,
    ) -> Self {
        Self {
            class,
            n_channels,
            ranges,
            arefs: ArefMask::from_subdevice_flags(flags),
            command: flags & sdf::SDF_CMD != 0,
            dither: flags & sdf::SDF_DITHER != 0,
            deglitch: flags & sdf::SDF_DEGLITCH != 0,
        }
    }

    /// Set the range table.
    pub fn with_ranges(mut self, ranges: RangeTable) -> Self {
        self.ranges = ranges;
        self
    }

    /// Set the supported analog references.
    pub fn with_arefs(mut self, arefs: ArefMask) -> Self {
        self.arefs = arefs;
        self
    }

    /// Enable or disable command mode.
    pub fn with_command(mut self, enable: bool) -> Self {
        self.command = enable;
        self
    }

    /// Enable or disable dithering.
    pub fn with_dither(mut self, enable: bool) -> Self {
        self.dither = enable;
        self
    }

    /// Enable or disable deglitching.
    pub fn with_deglitch(mut self, enable: bool) -> Self {
        self.deglitch = enable;
        self
    }
}

impl SubdeviceCapabilities for CapabilityDescriptor {
    fn subdevice_class(&self) -> SubdeviceClass {
        self.class
    }

    fn max_channel_count(&self) -> u32 {
        self.n_channels
    }

    fn range_count(&self, channel: u32) -> u32 {
        self.ranges.count(channel)
    }

    fn supported_arefs(&self) -> ArefMask {
        self.arefs
    }

    fn supports_command_mode(&self) -> bool {
        self.command
    }

    fn supported_flags(&self) -> ChanspecFlags {
        if self.dither || self.deglitch {
            ChanspecFlags::ALT_FILTER
        } else {
            ChanspecFlags::empty()
        }
    }
}
