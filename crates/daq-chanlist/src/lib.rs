//! Chanlist codec and capability validation for Comedi-style DAQ subdevices.
//!
//! Before a subdevice is opened for streaming, an acquisition pipeline needs
//! an ordered list of channels, each packed into a 32-bit chanspec, and a
//! guarantee that the list fits what the subdevice reports about itself.
//! This crate provides both without touching hardware.
//!
//! # Architecture
//!
//! ## Chanlist
//! - [`Chanspec`] - packed channel/range/aref/flags word
//! - [`ChannelList`] - ordered entries with a Base/trigger prefix, exports,
//!   and the persisted `channel-range-aref-flags-direction` text form
//! - [`Direction`] / [`DirectionCode`] - entry directions and transport markers
//!
//! ## Validation
//! - [`SubdeviceCapabilities`] - what a driver reports about a subdevice
//! - [`CapabilityDescriptor`] - owned snapshot, buildable from `SDF_*` flags
//! - [`CapabilityValidator`] - rejects lists that do not fit
//!
//! ## Support
//! - [`config`] - Figment-based configuration loading
//! - [`logging`] - tracing subscriber setup for binaries
//!
//! # Example
//!
//! ```
//! use daq_chanlist::{
//!     AnalogReference, CapabilityDescriptor, CapabilityValidator, ChannelList,
//!     ChanspecFlags, Direction, SubdeviceClass,
//! };
//!
//! # fn example() -> daq_chanlist::Result<()> {
//! let mut list = ChannelList::new();
//! list.add_channel(0, 0, AnalogReference::Ground, ChanspecFlags::empty(), Direction::Input)?;
//! list.add_channel(1, 0, AnalogReference::Ground, ChanspecFlags::empty(), Direction::Input)?;
//!
//! let caps = CapabilityDescriptor::new(SubdeviceClass::AnalogInput, 16, 4);
//! CapabilityValidator::validate(&list, &caps)?;
//!
//! assert_eq!(list.to_channel_numbers(), vec![0, 1]);
//! assert_eq!(list.to_vendor_channel_string("Dev1")?, "Dev1/ai0,Dev1/ai1");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod capabilities;
pub mod chanlist;
pub mod chanspec;
pub mod config;
pub mod direction;
pub mod error;
pub mod logging;
pub mod validator;

pub use capabilities::{
    ArefMask, CapabilityDescriptor, RangeTable, SubdeviceCapabilities, SubdeviceClass,
};
pub use chanlist::{ChannelEntry, ChannelList};
pub use chanspec::{AnalogReference, Chanspec, ChanspecFlags};
pub use config::ChanlistConfig;
pub use direction::{Direction, DirectionCode};
pub use error::{ChanlistError, ParseError, RejectedReason, Result, ValidationError};
pub use validator::CapabilityValidator;
