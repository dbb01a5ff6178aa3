//! Error types for chanlist construction, parsing, and validation.
//!
//! Three families are kept apart so callers can react to each one:
//!
//! - [`RejectedReason`] - structural rejections from [`ChannelList`](crate::ChannelList)
//! - [`ParseError`] - malformed persisted chanlist text
//! - [`ValidationError`] - a chanlist that does not fit a subdevice
//!
//! [`ChanlistError`] wraps all of them for code that only needs to report.

use thiserror::Error;

use crate::capabilities::SubdeviceClass;
use crate::chanspec::AnalogReference;
use crate::direction::Direction;

/// Result type alias for chanlist operations.
pub type Result<T> = std::result::Result<T, ChanlistError>;

/// Structural rejection returned by [`ChannelList`](crate::ChannelList) operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectedReason {
    /// The requested special entry is already present
    #[error("A {direction} entry is already present in the channel list")]
    DuplicateSpecial { direction: Direction },

    /// Base and trigger entries are mutually exclusive
    #[error("Cannot add a {requested} entry while a {present} entry is present")]
    SpecialConflict {
        requested: Direction,
        present: Direction,
    },

    /// Index past the end of the addressed sequence
    #[error("Index {index} out of range: sequence has {len} entries")]
    OutOfRange { index: usize, len: usize },

    /// Export requested on a list without I/O channels
    #[error("Channel list has no I/O channels")]
    Empty,
}

/// Malformed persisted chanlist text.
///
/// `record` is the zero-based position of the comma-separated record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Record does not have exactly five `-` separated fields
    #[error("Record {record}: expected 5 fields, found {found}")]
    FieldCount { record: usize, found: usize },

    /// Field is not an unsigned integer
    #[error("Record {record}: {field} '{value}' is not a number")]
    InvalidNumber {
        record: usize,
        field: &'static str,
        value: String,
    },

    /// Field value does not fit its chanspec bit field
    #[error("Record {record}: {field} {value} exceeds maximum {max}")]
    OutOfWidth {
        record: usize,
        field: &'static str,
        value: u64,
        max: u64,
    },

    /// Flags field sets bits that are not chanspec flags
    #[error("Record {record}: flags {flags:#010x} contain unassigned bits")]
    InvalidFlags { record: usize, flags: u32 },

    /// Direction code outside the known set
    #[error("Record {record}: unknown direction code {code}")]
    UnknownDirection { record: usize, code: u64 },

    /// Record is well formed but the list refused it
    #[error("Record {record}: {reason}")]
    Rejected {
        record: usize,
        #[source]
        reason: RejectedReason,
    },
}

/// Reason a chanlist does not fit a subdevice.
///
/// Every per-entry variant carries the index of the offending entry in the
/// full sequence (special entries included).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// No I/O channels to acquire
    #[error("Channel list has no I/O channels")]
    EmptyChanlist,

    /// Channel number beyond the subdevice channel count
    #[error("Entry {index}: invalid channel {channel}, subdevice has {max} channels")]
    InvalidChannel { index: usize, channel: u32, max: u32 },

    /// Range index beyond the channel range table
    #[error("Entry {index}: invalid range {range}, channel has {max} ranges")]
    InvalidRange { index: usize, range: u32, max: u32 },

    /// Flag bits the subdevice does not advertise
    #[error("Entry {index}: unsupported chanspec flags {flags:#010x}")]
    InvalidFlags { index: usize, flags: u32 },

    /// Analog reference not usable on this subdevice
    #[error("Entry {index}: analog reference {aref} not supported by {class} subdevice")]
    InvalidReference {
        index: usize,
        aref: AnalogReference,
        class: SubdeviceClass,
    },

    /// Direction not usable on this subdevice in its current mode
    #[error("Entry {index}: direction {direction} not allowed on {class} subdevice (command mode: {command_mode})")]
    InvalidDirection {
        index: usize,
        direction: Direction,
        class: SubdeviceClass,
        command_mode: bool,
    },
}

impl ValidationError {
    /// Index of the offending entry, if the error names one.
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::EmptyChanlist => None,
            Self::InvalidChannel { index, .. }
            | Self::InvalidRange { index, .. }
            | Self::InvalidFlags { index, .. }
            | Self::InvalidReference { index, .. }
            | Self::InvalidDirection { index, .. } => Some(*index),
        }
    }

    /// Check if this is the empty-chanlist rejection.
    pub fn is_empty_chanlist(&self) -> bool {
        matches!(self, Self::EmptyChanlist)
    }
}

/// Any error produced by this crate.
#[derive(Error, Debug)]
pub enum ChanlistError {
    /// Structural rejection
    #[error(transparent)]
    Rejected(#[from] RejectedReason),

    /// Persisted text could not be parsed
    #[error("Invalid chanlist text: {0}")]
    Parse(#[from] ParseError),

    /// Chanlist does not fit the subdevice
    #[error("Chanlist rejected: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration sources could not be merged or extracted
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Invalid configuration or parameter
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl From<figment::Error> for ChanlistError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ValidationError::InvalidChannel {
            index: 2,
            channel: 20,
            max: 16,
        };
        let message = err.to_string();
        assert!(message.contains("Entry 2"));
        assert!(message.contains("20"));
        assert!(message.contains("16"));
    }

    #[test]
    fn test_validation_index() {
        assert_eq!(ValidationError::EmptyChanlist.index(), None);
        assert!(ValidationError::EmptyChanlist.is_empty_chanlist());

        let err = ValidationError::InvalidFlags {
            index: 3,
            flags: 1 << 27,
        };
        assert_eq!(err.index(), Some(3));
        assert!(err.to_string().contains("0x08000000"));
    }

    #[test]
    fn test_parse_error_source() {
        use std::error::Error as _;

        let err = ParseError::Rejected {
            record: 1,
            reason: RejectedReason::DuplicateSpecial {
                direction: Direction::Base,
            },
        };
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("Record 1"));
    }

    #[test]
    fn test_umbrella_conversion() {
        let err: ChanlistError = RejectedReason::Empty.into();
        assert!(matches!(err, ChanlistError::Rejected(RejectedReason::Empty)));
        assert_eq!(err.to_string(), "Channel list has no I/O channels");
    }
}
