//! The shipped sample configuration must load, validate, and fit its own
//! subdevice.

use std::path::PathBuf;

use daq_chanlist::{CapabilityValidator, ChanlistConfig, SubdeviceClass};

fn sample_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config/chanlist.toml")
}

#[test]
fn test_sample_config_is_valid() {
    let config = ChanlistConfig::load_from(sample_path()).unwrap();
    config.validate().unwrap();

    assert_eq!(config.subdevice.class, SubdeviceClass::AnalogInput);
    assert_eq!(config.stream.device, "Dev1");

    let list = config.channel_list().unwrap();
    assert_eq!(list.to_channel_numbers(), vec![0, 1, 2]);
    assert_eq!(CapabilityValidator::validate(&list, &config.subdevice), Ok(()));
    assert_eq!(
        list.to_vendor_channel_string(&config.stream.device).unwrap(),
        "Dev1/ai0,Dev1/ai1,Dev1/ai2"
    );
}

#[test]
fn test_sample_config_survives_rewrite() {
    let config = ChanlistConfig::load_from(sample_path()).unwrap();
    let rewritten = ChanlistConfig::from_toml_str(&config.to_toml().unwrap()).unwrap();
    assert_eq!(rewritten, config);
}
