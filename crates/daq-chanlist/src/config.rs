//! Chanlist configuration using Figment
//!
//! Configuration is loaded from:
//! 1. a TOML file (base configuration)
//! 2. environment variables prefixed with `DAQ_CHANLIST_`, nested keys
//!    separated by `__` (e.g. `DAQ_CHANLIST_STREAM__DEVICE=Dev2`)
//!
//! # Example
//! ```toml
//! [application]
//! name = "AI scan"
//! log_level = "info"
//!
//! [stream]
//! device = "Dev1"
//! channels = "0-0-0-0-0,1-0-0-0-0"
//!
//! [subdevice]
//! class = "analog_input"
//! n_channels = 16
//! ranges = 4
//! arefs = "GROUND | COMMON | DIFF"
//! command = true
//! ```

use std::path::Path;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::capabilities::CapabilityDescriptor;
use crate::chanlist::ChannelList;
use crate::error::{ChanlistError, ParseError, Result};
use crate::logging::parse_log_level;

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "DAQ_CHANLIST_";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChanlistConfig {
    /// Application settings
    #[serde(default)]
    pub application: ApplicationConfig,
    /// Stream channel selection
    pub stream: StreamConfig,
    /// Capabilities of the target subdevice
    pub subdevice: CapabilityDescriptor,
}

/// Application-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name
    #[serde(default = "default_name")]
    pub name: String,
    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
        }
    }
}

/// Channel selection for one stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Device name used in vendor channel strings (e.g. "Dev1")
    pub device: String,
    /// Persisted chanlist text
    #[serde(default)]
    pub channels: String,
}

fn default_name() -> String {
    "daq-chanlist".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ChanlistConfig {
    /// Load configuration from a TOML file and environment variables
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading chanlist configuration");
        Self::extract(Figment::new().merge(Toml::file(path)))
    }

    /// Load configuration from a TOML string and environment variables
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        Self::extract(Figment::new().merge(Toml::string(toml)))
    }

    fn extract(figment: Figment) -> Result<Self> {
        Ok(figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<()> {
        parse_log_level(&self.application.log_level)?;

        if self.stream.device.trim().is_empty() {
            return Err(ChanlistError::InvalidConfig {
                message: "stream.device must not be empty".to_string(),
            });
        }

        if self.subdevice.n_channels == 0 {
            return Err(ChanlistError::InvalidConfig {
                message: "subdevice.n_channels must be greater than 0".to_string(),
            });
        }

        self.channel_list()?;
        Ok(())
    }

    /// Parse the stored chanlist text
    pub fn channel_list(&self) -> std::result::Result<ChannelList, ParseError> {
        ChannelList::from_text(&self.stream.channels)
    }

    /// Store `list` as the stream's chanlist text
    pub fn set_channel_list(&mut self, list: &ChannelList) {
        self.stream.channels = list.to_text();
    }

    /// Serialize back to TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ChanlistError::InvalidConfig {
            message: format!("Failed to serialize configuration: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{ArefMask, SubdeviceClass};
    use crate::chanspec::{AnalogReference, ChanspecFlags};
    use crate::direction::Direction;
    use std::io::Write;

    const SAMPLE: &str = r#"
        [application]
        name = "Test"
        log_level = "debug"

        [stream]
        device = "Dev1"
        channels = "0-0-0-0-0,3-1-2-0-0"

        [subdevice]
        class = "analog_input"
        n_channels = 16
        ranges = 4
        arefs = "GROUND | DIFF"
        command = true
    "#;

    #[test]
    fn test_from_toml_str() {
        let config = ChanlistConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.stream.device, "Dev1");
        assert_eq!(config.subdevice.class, SubdeviceClass::AnalogInput);
        assert_eq!(config.subdevice.arefs, ArefMask::GROUND | ArefMask::DIFF);
        assert!(config.validate().is_ok());

        let list = config.channel_list().unwrap();
        assert_eq!(list.to_channel_numbers(), vec![0, 3]);
    }

    #[test]
    fn test_defaults() {
        let config = ChanlistConfig::from_toml_str(
            r#"
            [stream]
            device = "Dev3"

            [subdevice]
            class = "digital_input"
            n_channels = 8
            "#,
        )
        .unwrap();

        assert_eq!(config.application.log_level, "info");
        assert!(config.stream.channels.is_empty());
        assert_eq!(config.subdevice.arefs, ArefMask::GROUND);
        assert!(!config.subdevice.command);
        assert!(config.channel_list().unwrap().is_empty());
    }

    #[test]
    fn test_missing_section() {
        let result = ChanlistConfig::from_toml_str("[stream]\ndevice = \"Dev1\"\n");
        assert!(matches!(result, Err(ChanlistError::Config(_))));
    }

    #[test]
    fn test_invalid_values() {
        let mut config = ChanlistConfig::from_toml_str(SAMPLE).unwrap();
        config.application.log_level = "loud".to_string();
        assert!(config.validate().is_err());

        let mut config = ChanlistConfig::from_toml_str(SAMPLE).unwrap();
        config.stream.device = " ".to_string();
        assert!(config.validate().is_err());

        let mut config = ChanlistConfig::from_toml_str(SAMPLE).unwrap();
        config.stream.channels = "0-0-0".to_string();
        assert!(matches!(config.validate(), Err(ChanlistError::Parse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = ChanlistConfig::load_from(file.path()).unwrap();
        assert_eq!(config.application.name, "Test");
        assert_eq!(config.subdevice.n_channels, 16);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = ChanlistConfig::from_toml_str(SAMPLE).unwrap();
        let mut list = ChannelList::new();
        list.add_channel(
            5,
            0,
            AnalogReference::Differential,
            ChanspecFlags::empty(),
            Direction::Input,
        )
        .unwrap();
        config.set_channel_list(&list);

        let text = config.to_toml().unwrap();
        let reloaded = ChanlistConfig::from_toml_str(&text).unwrap();
        assert_eq!(reloaded, config);
        assert_eq!(reloaded.channel_list().unwrap(), list);
    }
}
