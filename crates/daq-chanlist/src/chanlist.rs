//! Ordered channel lists with a special-entry prefix.
//!
//! A [`ChannelList`] holds `(chanspec, direction)` entries in the order a
//! command chanlist expects them:
//!
//! ```text
//! ┌──────────── specials ────────────┬──────────── I/O ─────────────┐
//! │ Base | Start/Begin/Convert trig. │ Input / Output, append order │
//! └──────────────────────────────────┴──────────────────────────────┘
//!  0                                  first_io_index()              len()
//! ```
//!
//! Special entries are either a single `Base` or up to one of each trigger
//! direction, never both. They always sit in front of the ordinary channels
//! so transport code can skip a fixed prefix. Removal is strictly from the
//! end of the sequence, which lets an interactive editor undo its last add
//! without tracking indices.
//!
//! # Example
//!
//! ```
//! use daq_chanlist::{AnalogReference, ChannelList, ChanspecFlags, Direction};
//!
//! let mut list = ChannelList::new();
//! list.add_channel(0, 0, AnalogReference::Ground, ChanspecFlags::empty(), Direction::Input)?;
//! list.add_channel(1, 0, AnalogReference::Ground, ChanspecFlags::empty(), Direction::Input)?;
//!
//! assert_eq!(list.to_vendor_channel_string("Dev1")?, "Dev1/ai0,Dev1/ai1");
//! assert_eq!(list.to_text(), "0-0-0-0-0,1-0-0-0-0");
//! # Ok::<(), daq_chanlist::RejectedReason>(())
//! ```

use std::fmt;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::chanspec::{
    AnalogReference, Chanspec, ChanspecFlags, AREF_MASK, CHANNEL_MASK, RANGE_MASK,
};
use crate::direction::{Direction, DirectionCode};
use crate::error::{ParseError, RejectedReason};

/// Which special entries are present.
///
/// Base and triggers exclude each other, so one slot covers both cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum SpecialSlot {
    #[default]
    Empty,
    Base,
    Triggers {
        start: bool,
        begin: bool,
        convert: bool,
    },
}

impl SpecialSlot {
    fn count(self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Base => 1,
            Self::Triggers {
                start,
                begin,
                convert,
            } => usize::from(start) + usize::from(begin) + usize::from(convert),
        }
    }

    fn contains(self, direction: Direction) -> bool {
        match (self, direction) {
            (Self::Base, Direction::Base) => true,
            (Self::Triggers { start, .. }, Direction::StartTrigger) => start,
            (Self::Triggers { begin, .. }, Direction::BeginTrigger) => begin,
            (Self::Triggers { convert, .. }, Direction::ConvertTrigger) => convert,
            _ => false,
        }
    }

    fn first_present(self) -> Option<Direction> {
        [
            Direction::Base,
            Direction::StartTrigger,
            Direction::BeginTrigger,
            Direction::ConvertTrigger,
        ]
        .into_iter()
        .find(|&direction| self.contains(direction))
    }

    /// Gate for every special insert.
    fn check_insert(self, direction: Direction) -> Result<(), RejectedReason> {
        if self.contains(direction) {
            return Err(RejectedReason::DuplicateSpecial { direction });
        }

        let conflicting = match self {
            Self::Base => direction.is_trigger(),
            Self::Triggers { .. } => direction == Direction::Base,
            Self::Empty => false,
        };

        match self.first_present() {
            Some(present) if conflicting => Err(RejectedReason::SpecialConflict {
                requested: direction,
                present,
            }),
            _ => Ok(()),
        }
    }

    fn insert(&mut self, direction: Direction) {
        let (mut start, mut begin, mut convert) = match *self {
            Self::Triggers {
                start,
                begin,
                convert,
            } => (start, begin, convert),
            Self::Empty | Self::Base => (false, false, false),
        };

        match direction {
            Direction::Base => {
                *self = Self::Base;
                return;
            }
            Direction::StartTrigger => start = true,
            Direction::BeginTrigger => begin = true,
            Direction::ConvertTrigger => convert = true,
            Direction::Input | Direction::Output => return,
        }

        *self = Self::Triggers {
            start,
            begin,
            convert,
        };
    }

    fn remove(&mut self, direction: Direction) {
        match *self {
            Self::Base if direction == Direction::Base => *self = Self::Empty,
            Self::Triggers {
                mut start,
                mut begin,
                mut convert,
            } => {
                match direction {
                    Direction::StartTrigger => start = false,
                    Direction::BeginTrigger => begin = false,
                    Direction::ConvertTrigger => convert = false,
                    _ => return,
                }
                *self = if start || begin || convert {
                    Self::Triggers {
                        start,
                        begin,
                        convert,
                    }
                } else {
                    Self::Empty
                };
            }
            _ => {}
        }
    }
}

/// One chanlist entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelEntry {
    /// Packed channel specification
    pub chanspec: Chanspec,
    /// Entry direction
    pub direction: Direction,
}

/// Ordered chanlist with special entries kept at the head.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelList {
    entries: Vec<ChannelEntry>,
    specials: SpecialSlot,
}

impl ChannelList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pack a chanspec and insert it.
    ///
    /// `Input`/`Output` entries are appended; special entries are placed
    /// after any existing specials. A special entry that duplicates or
    /// conflicts with one already present is rejected and the list is left
    /// unchanged.
    pub fn add_channel(
        &mut self,
        channel: u32,
        range: u32,
        aref: AnalogReference,
        flags: ChanspecFlags,
        direction: Direction,
    ) -> Result<(), RejectedReason> {
        self.push(Chanspec::pack(channel, range, aref, flags), direction)
    }

    /// Insert an already packed chanspec.
    pub fn push(&mut self, chanspec: Chanspec, direction: Direction) -> Result<(), RejectedReason> {
        let entry = ChannelEntry {
            chanspec,
            direction,
        };

        if direction.is_io() {
            self.entries.push(entry);
            debug!(
                channel = chanspec.channel(),
                %direction,
                len = self.entries.len(),
                "Appended chanlist entry"
            );
            return Ok(());
        }

        if let Err(reason) = self.specials.check_insert(direction) {
            warn!(
                channel = chanspec.channel(),
                %direction,
                %reason,
                "Rejected special chanlist entry"
            );
            return Err(reason);
        }

        let position = self.specials.count();
        self.entries.insert(position, entry);
        self.specials.insert(direction);

        debug!(
            channel = chanspec.channel(),
            %direction,
            position,
            len = self.entries.len(),
            "Inserted special chanlist entry"
        );
        Ok(())
    }

    /// Remove the last entry in sequence order.
    ///
    /// Returns the removed entry, or `None` if the list was empty.
    pub fn remove_last(&mut self) -> Option<ChannelEntry> {
        let entry = self.entries.pop()?;
        self.specials.remove(entry.direction);

        debug!(
            channel = entry.chanspec.channel(),
            direction = %entry.direction,
            len = self.entries.len(),
            "Removed chanlist entry"
        );
        Some(entry)
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.specials = SpecialSlot::Empty;
    }

    /// Number of entries, special ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the list has no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of `Input`/`Output` entries.
    pub fn io_count(&self) -> usize {
        self.entries.len() - self.specials.count()
    }

    /// Index of the first `Input`/`Output` entry.
    pub fn first_io_index(&self) -> usize {
        self.len() - self.io_count()
    }

    /// Whether a `Base` entry is present.
    pub fn has_base(&self) -> bool {
        self.specials.contains(Direction::Base)
    }

    /// Whether a start trigger entry is present.
    pub fn has_start_trigger(&self) -> bool {
        self.specials.contains(Direction::StartTrigger)
    }

    /// Whether a scan-begin trigger entry is present.
    pub fn has_begin_trigger(&self) -> bool {
        self.specials.contains(Direction::BeginTrigger)
    }

    /// Whether a convert trigger entry is present.
    pub fn has_convert_trigger(&self) -> bool {
        self.specials.contains(Direction::ConvertTrigger)
    }

    /// All entries in sequence order.
    pub fn entries(&self) -> &[ChannelEntry] {
        &self.entries
    }

    /// The special prefix.
    pub fn special_entries(&self) -> &[ChannelEntry] {
        &self.entries[..self.first_io_index()]
    }

    /// The `Input`/`Output` entries.
    pub fn io_entries(&self) -> &[ChannelEntry] {
        &self.entries[self.first_io_index()..]
    }

    /// Chanspec at `index` in the full sequence.
    pub fn chanspec_at(&self, index: usize) -> Result<Chanspec, RejectedReason> {
        self.entry_at(index).map(|entry| entry.chanspec)
    }

    /// Direction at `index` in the full sequence.
    pub fn direction_at(&self, index: usize) -> Result<Direction, RejectedReason> {
        self.entry_at(index).map(|entry| entry.direction)
    }

    /// Chanspec at `io_index` among the I/O entries.
    pub fn io_chanspec_at(&self, io_index: usize) -> Result<Chanspec, RejectedReason> {
        self.io_entry_at(io_index).map(|entry| entry.chanspec)
    }

    /// Direction at `io_index` among the I/O entries.
    pub fn io_direction_at(&self, io_index: usize) -> Result<Direction, RejectedReason> {
        self.io_entry_at(io_index).map(|entry| entry.direction)
    }

    fn entry_at(&self, index: usize) -> Result<&ChannelEntry, RejectedReason> {
        self.entries.get(index).ok_or(RejectedReason::OutOfRange {
            index,
            len: self.entries.len(),
        })
    }

    fn io_entry_at(&self, io_index: usize) -> Result<&ChannelEntry, RejectedReason> {
        let io = self.io_entries();
        io.get(io_index).ok_or(RejectedReason::OutOfRange {
            index: io_index,
            len: io.len(),
        })
    }

    /// Position of the special entry with `direction`.
    ///
    /// Always `None` for `Input`/`Output`.
    pub fn find_special(&self, direction: Direction) -> Option<usize> {
        if !direction.is_special() {
            return None;
        }
        self.special_entries()
            .iter()
            .position(|entry| entry.direction == direction)
    }

    /// Chanspec of the special entry with `direction`.
    pub fn trigger_chanspec(&self, direction: Direction) -> Option<Chanspec> {
        self.find_special(direction)
            .map(|index| self.entries[index].chanspec)
    }

    /// I/O index of the first entry on `channel`.
    pub fn find_io_channel(&self, channel: u32) -> Option<usize> {
        self.io_entries()
            .iter()
            .position(|entry| entry.chanspec.channel() == channel)
    }

    /// Split a chanspec into `(channel, range, aref, flags)`.
    pub fn unpack(chanspec: Chanspec) -> (u32, u32, AnalogReference, ChanspecFlags) {
        chanspec.unpack()
    }

    /// Channel numbers of the I/O entries.
    pub fn to_channel_numbers(&self) -> Vec<u32> {
        self.io_entries()
            .iter()
            .map(|entry| entry.chanspec.channel())
            .collect()
    }

    /// Raw chanspec words of the I/O entries, for a command chanlist.
    pub fn to_chanspecs(&self) -> Vec<u32> {
        self.io_entries()
            .iter()
            .map(|entry| entry.chanspec.raw())
            .collect()
    }

    /// Read/write marker per I/O entry.
    pub fn to_direction_codes(&self) -> Vec<DirectionCode> {
        self.io_entries()
            .iter()
            .filter_map(|entry| entry.direction.io_code())
            .collect()
    }

    /// Vendor physical channel string, e.g. `"Dev1/ai0,Dev1/ao1"`.
    pub fn to_vendor_channel_string(&self, device: &str) -> Result<String, RejectedReason> {
        if self.io_count() == 0 {
            return Err(RejectedReason::Empty);
        }

        let tokens: Vec<String> = self
            .io_entries()
            .iter()
            .map(|entry| {
                let kind = match entry.direction {
                    Direction::Output => "ao",
                    _ => "ai",
                };
                format!("{}/{}{}", device, kind, entry.chanspec.channel())
            })
            .collect();

        Ok(tokens.join(","))
    }

    /// Persisted text form of the I/O entries.
    ///
    /// One `channel-range-aref-flags-direction` record per entry, joined by
    /// commas. Special entries are not written.
    pub fn to_text(&self) -> String {
        self.io_entries()
            .iter()
            .map(|entry| {
                let (channel, range, aref, flags) = entry.chanspec.unpack();
                format!(
                    "{}-{}-{}-{}-{}",
                    channel,
                    range,
                    aref.to_raw(),
                    flags.bits(),
                    entry.direction.code()
                )
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Rebuild a list from its persisted text form.
    ///
    /// Blank input yields an empty list. Any malformed record fails the
    /// whole parse.
    pub fn from_text(text: &str) -> Result<Self, ParseError> {
        let mut list = Self::new();
        let text = text.trim();
        if text.is_empty() {
            return Ok(list);
        }

        for (record, chunk) in text.split(',').enumerate() {
            let fields: Vec<&str> = chunk.trim().split('-').collect();
            if fields.len() != 5 {
                return Err(ParseError::FieldCount {
                    record,
                    found: fields.len(),
                });
            }

            let channel = parse_field(record, "channel", fields[0], CHANNEL_MASK)?;
            let range = parse_field(record, "range", fields[1], RANGE_MASK)?;
            let aref_raw = parse_field(record, "aref", fields[2], AREF_MASK)?;
            let flag_bits = parse_field(record, "flags", fields[3], u32::MAX)?;
            let code = parse_field(record, "direction", fields[4], u32::MAX)?;

            let aref = AnalogReference::from_raw(aref_raw).ok_or(ParseError::OutOfWidth {
                record,
                field: "aref",
                value: u64::from(aref_raw),
                max: u64::from(AREF_MASK),
            })?;
            let flags = ChanspecFlags::from_bits(flag_bits).ok_or(ParseError::InvalidFlags {
                record,
                flags: flag_bits,
            })?;
            let direction = Direction::from_code(code).ok_or(ParseError::UnknownDirection {
                record,
                code: u64::from(code),
            })?;

            list.add_channel(channel, range, aref, flags, direction)
                .map_err(|reason| ParseError::Rejected { record, reason })?;
        }

        debug!(
            len = list.len(),
            io_count = list.io_count(),
            "Parsed chanlist text"
        );
        Ok(list)
    }
}

fn parse_field(
    record: usize,
    field: &'static str,
    value: &str,
    max: u32,
) -> Result<u32, ParseError> {
    let invalid = || ParseError::InvalidNumber {
        record,
        field,
        value: value.to_string(),
    };

    // Plain decimal digits only; `u64::from_str` would also take a sign
    let digits = value.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let parsed: u64 = digits.parse().map_err(|_| invalid())?;

    u32::try_from(parsed)
        .ok()
        .filter(|&v| v <= max)
        .ok_or(ParseError::OutOfWidth {
            record,
            field,
            value: parsed,
            max: u64::from(max),
        })
}

impl fmt::Display for ChannelList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl FromStr for ChannelList {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}
