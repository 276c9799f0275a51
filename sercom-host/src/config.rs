//! TOML node configuration
//!
//! A file only needs to name the role; every other key falls back to the
//! defaults for that role.
//!
//! ```toml
//! role = "sensor"
//! own_address = 0x25
//! peer_address = 0x20
//! marker_policy = "full-scan"
//!
//! [serial]
//! baudrate = 4800
//! rx_capacity = 64
//!
//! [timing]
//! scan_window_ms = 60000
//! poll_interval_ms = 200
//!
//! [time_zone]
//! use_local_time = true
//! offset_hours = 1
//! location = "Europe/Lisbon"
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use sercom_core::config::{self as core_config, NodeConfig, Role};
use sercom_hal::uart::{DataBits, Parity, StopBits};
use sercom_protocol::{Address, MarkerPolicy};

/// Errors from loading a TOML configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    /// Not valid TOML, or a key has the wrong type
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    /// Parsed, but rejected by validation
    #[error("config rejected: {0:?}")]
    Invalid(core_config::ConfigError),
    /// Time zone location longer than the stored label
    #[error("time zone location exceeds {} bytes", core_config::MAX_LOCATION_LEN)]
    LocationTooLong,
}

// The core error is no_std and has no `std::error::Error` impl to chain
impl From<core_config::ConfigError> for ConfigError {
    fn from(e: core_config::ConfigError) -> Self {
        ConfigError::Invalid(e)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    role: Role,
    own_address: Option<u8>,
    peer_address: Option<u8>,
    marker_policy: Option<MarkerPolicy>,
    #[serde(default)]
    serial: RawSerial,
    #[serde(default)]
    timing: RawTiming,
    #[serde(default)]
    time_zone: RawTimeZone,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSerial {
    tx_pin: Option<u8>,
    rx_pin: Option<u8>,
    baudrate: Option<u32>,
    rx_capacity: Option<u16>,
    data_bits: Option<DataBits>,
    parity: Option<Parity>,
    stop_bits: Option<StopBits>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTiming {
    scan_window_ms: Option<u32>,
    poll_interval_ms: Option<u32>,
    exchange_interval_ms: Option<u32>,
    tick_ms: Option<u32>,
    ack_to_data_ms: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTimeZone {
    use_local_time: Option<bool>,
    offset_hours: Option<i8>,
    location: Option<String>,
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

impl RawConfig {
    fn apply(self) -> Result<NodeConfig, ConfigError> {
        let mut config = NodeConfig::for_role(self.role);

        set(&mut config.own_address, self.own_address.map(Address));
        set(&mut config.peer_address, self.peer_address.map(Address));
        set(&mut config.marker_policy, self.marker_policy);

        let serial = &mut config.serial;
        set(&mut serial.tx_pin, self.serial.tx_pin);
        set(&mut serial.rx_pin, self.serial.rx_pin);
        set(&mut serial.baudrate, self.serial.baudrate);
        set(&mut serial.rx_capacity, self.serial.rx_capacity);
        set(&mut serial.data_bits, self.serial.data_bits);
        set(&mut serial.parity, self.serial.parity);
        set(&mut serial.stop_bits, self.serial.stop_bits);

        let timing = &mut config.timing;
        set(&mut timing.scan_window_ms, self.timing.scan_window_ms);
        set(&mut timing.poll_interval_ms, self.timing.poll_interval_ms);
        set(&mut timing.exchange_interval_ms, self.timing.exchange_interval_ms);
        set(&mut timing.tick_ms, self.timing.tick_ms);
        set(&mut timing.ack_to_data_ms, self.timing.ack_to_data_ms);

        let time_zone = &mut config.time_zone;
        set(&mut time_zone.use_local_time, self.time_zone.use_local_time);
        set(&mut time_zone.offset_hours, self.time_zone.offset_hours);
        if let Some(location) = self.time_zone.location {
            time_zone.location = heapless::String::try_from(location.as_str())
                .map_err(|_| ConfigError::LocationTooLong)?;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Parse a TOML configuration and validate it
pub fn parse_toml(text: &str) -> Result<NodeConfig, ConfigError> {
    let raw: RawConfig = toml::from_str(text)?;
    raw.apply()
}

/// Read, parse and validate a TOML configuration file
pub fn load_toml(path: impl AsRef<Path>) -> Result<NodeConfig, ConfigError> {
    let text = fs::read_to_string(path)?;
    parse_toml(&text)
}
