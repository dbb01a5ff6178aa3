//! Channel directions.
//!
//! A chanlist entry is either an ordinary I/O channel ([`Direction::Input`],
//! [`Direction::Output`]) or a special entry that addresses digital base
//! lines or routes a command-mode trigger.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Direction of a chanlist entry.
///
/// The discriminants are the integer codes used by the persisted text form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum Direction {
    /// Sampled channel
    #[default]
    Input = 0,
    /// Driven channel
    Output = 1,
    /// Digital base channel
    Base = 2,
    /// Command start trigger source
    StartTrigger = 3,
    /// Command scan-begin trigger source
    BeginTrigger = 4,
    /// Command convert trigger source
    ConvertTrigger = 5,
}

impl Direction {
    /// Every direction, in code order.
    pub const ALL: [Direction; 6] = [
        Self::Input,
        Self::Output,
        Self::Base,
        Self::StartTrigger,
        Self::BeginTrigger,
        Self::ConvertTrigger,
    ];

    /// Convert from the raw integer code.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Input),
            1 => Some(Self::Output),
            2 => Some(Self::Base),
            3 => Some(Self::StartTrigger),
            4 => Some(Self::BeginTrigger),
            5 => Some(Self::ConvertTrigger),
            _ => None,
        }
    }

    /// Raw integer code.
    pub fn code(self) -> u32 {
        self as u32
    }

    /// True for `Input` and `Output`.
    pub fn is_io(self) -> bool {
        matches!(self, Self::Input | Self::Output)
    }

    /// True for `Base` and the three trigger directions.
    pub fn is_special(self) -> bool {
        !self.is_io()
    }

    /// True for the three trigger directions.
    pub fn is_trigger(self) -> bool {
        matches!(
            self,
            Self::StartTrigger | Self::BeginTrigger | Self::ConvertTrigger
        )
    }

    /// Transport direction marker, `None` for special directions.
    pub fn io_code(self) -> Option<DirectionCode> {
        match self {
            Self::Input => Some(DirectionCode::Read),
            Self::Output => Some(DirectionCode::Write),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => write!(f, "input"),
            Self::Output => write!(f, "output"),
            Self::Base => write!(f, "base"),
            Self::StartTrigger => write!(f, "start trigger"),
            Self::BeginTrigger => write!(f, "begin trigger"),
            Self::ConvertTrigger => write!(f, "convert trigger"),
        }
    }
}

/// Per-channel transfer marker for transports that take a parallel
/// direction array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u32)]
pub enum DirectionCode {
    /// Sample is read from the device
    Read = 0,
    /// Sample is written to the device
    Write = 1,
}

impl DirectionCode {
    /// Raw Comedi I/O direction (`COMEDI_INPUT` / `COMEDI_OUTPUT`).
    pub fn to_raw(self) -> u32 {
        self as u32
    }

    /// Marker string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

impl fmt::Display for DirectionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
