//! Chanlist validation against subdevice capabilities.
//!
//! Runs before a device is opened for streaming so that configuration
//! mistakes surface before any hardware resource is claimed. Checks stop at
//! the first failure.
//!
//! For every entry, in sequence order (special entries included):
//!
//! 1. channel number below the subdevice channel count
//! 2. range index below the channel's range count
//! 3. no flag bits the subdevice does not honour
//! 4. analog reference allowed for the subdevice class
//! 5. direction allowed for the subdevice class and command mode

use tracing::{debug, warn};

use crate::capabilities::SubdeviceCapabilities;
use crate::chanlist::ChannelList;
use crate::error::ValidationError;

/// Checks a [`ChannelList`] against a subdevice.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapabilityValidator;

impl CapabilityValidator {
    /// Validate `list` against `caps`.
    ///
    /// The list is only read. A list without I/O channels is rejected even
    /// when it carries special entries.
    pub fn validate<C>(list: &ChannelList, caps: &C) -> Result<(), ValidationError>
    where
        C: SubdeviceCapabilities + ?Sized,
    {
        let class = caps.subdevice_class();
        let command_mode = caps.supports_command_mode();

        debug!(
            %class,
            command_mode,
            entries = list.len(),
            io_count = list.io_count(),
            "Validating chanlist"
        );

        let result = Self::check(list, caps);
        match &result {
            Ok(()) => debug!(%class, "Chanlist accepted"),
            Err(err) => warn!(%class, index = ?err.index(), error = %err, "Chanlist rejected"),
        }
        result
    }

    fn check<C>(list: &ChannelList, caps: &C) -> Result<(), ValidationError>
    where
        C: SubdeviceCapabilities + ?Sized,
    {
        if list.io_count() == 0 {
            return Err(ValidationError::EmptyChanlist);
        }

        let class = caps.subdevice_class();
        let command_mode = caps.supports_command_mode();
        let max_channels = caps.max_channel_count();
        let allowed_flags = caps.supported_flags();
        let arefs = caps.supported_arefs();

        for (index, entry) in list.entries().iter().enumerate() {
            let (channel, range, aref, flags) = entry.chanspec.unpack();

            if channel >= max_channels {
                return Err(ValidationError::InvalidChannel {
                    index,
                    channel,
                    max: max_channels,
                });
            }

            let n_ranges = caps.range_count(channel);
            if range >= n_ranges {
                return Err(ValidationError::InvalidRange {
                    index,
                    range,
                    max: n_ranges,
                });
            }

            let unsupported = flags.difference(allowed_flags);
            if !unsupported.is_empty() {
                return Err(ValidationError::InvalidFlags {
                    index,
                    flags: unsupported.bits(),
                });
            }

            if !class.permits_aref(aref, arefs) {
                return Err(ValidationError::InvalidReference { index, aref, class });
            }

            if !class.permits_direction(entry.direction, command_mode) {
                return Err(ValidationError::InvalidDirection {
                    index,
                    direction: entry.direction,
                    class,
                    command_mode,
                });
            }
        }

        Ok(())
    }
}

/// Shorthand for [`CapabilityValidator::validate`].
pub fn validate<C>(list: &ChannelList, caps: &C) -> Result<(), ValidationError>
where
    C: SubdeviceCapabilities + ?Sized,
{
    CapabilityValidator::validate(list, caps)
}
