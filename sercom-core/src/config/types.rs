//! Configuration type definitions
//!
//! These types describe one node. The defaults reproduce the deployed
//! pair of boards: a Main at 0x20 and a Sensor at 0x25 on a 4800 baud link.

use embassy_time::Duration;
use heapless::String;

use sercom_hal::UartConfig;
use sercom_protocol::{Address, MarkerPolicy};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Maximum time zone label length
pub const MAX_LOCATION_LEN: usize = 32;

/// Largest accepted UTC offset in hours (either direction)
pub const MAX_OFFSET_HOURS: i8 = 14;

/// Which side of the exchange a node plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Role {
    /// Asks for the time and displays it
    #[default]
    Main,
    /// Owns the authoritative clock and answers requests
    Sensor,
}

impl Role {
    /// Address a node of this role uses unless configured otherwise
    pub fn default_address(&self) -> Address {
        match self {
            Role::Main => Address::MAIN,
            Role::Sensor => Address::SENSOR,
        }
    }

    /// The other role
    pub fn peer(&self) -> Role {
        match self {
            Role::Main => Role::Sensor,
            Role::Sensor => Role::Main,
        }
    }
}

/// Protocol timing, all values in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimingConfig {
    /// How long one receive scan may last
    pub scan_window_ms: u32,
    /// Sleep between two polls of the receive buffer
    pub poll_interval_ms: u32,
    /// Main: time between exchanges. Sensor: time between network refreshes
    pub exchange_interval_ms: u32,
    /// Housekeeping tick of the periodic driver
    pub tick_ms: u32,
    /// Sensor: pause between sending ACK and sending the data frame
    pub ack_to_data_ms: u32,
}

impl TimingConfig {
    /// Defaults for a Main node
    pub const fn main() -> Self {
        Self {
            scan_window_ms: 20_000,
            poll_interval_ms: 200,
            exchange_interval_ms: 30_000,
            tick_ms: 750,
            ack_to_data_ms: 1_000,
        }
    }

    /// Defaults for a Sensor node
    pub const fn sensor() -> Self {
        Self {
            scan_window_ms: 60_000,
            poll_interval_ms: 200,
            exchange_interval_ms: 120_000,
            tick_ms: 750,
            ack_to_data_ms: 1_000,
        }
    }

    /// Defaults for `role`
    pub const fn for_role(role: Role) -> Self {
        match role {
            Role::Main => Self::main(),
            Role::Sensor => Self::sensor(),
        }
    }

    pub fn scan_window(&self) -> Duration {
        Duration::from_millis(self.scan_window_ms as u64)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms as u64)
    }

    pub fn exchange_interval(&self) -> Duration {
        Duration::from_millis(self.exchange_interval_ms as u64)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms as u64)
    }

    pub fn ack_to_data(&self) -> Duration {
        Duration::from_millis(self.ack_to_data_ms as u64)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::main()
    }
}

/// Time zone applied by a Sensor when it produces a date-time payload
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimeZoneConfig {
    /// Send local time instead of UTC
    pub use_local_time: bool,
    /// Whole hours east of UTC (negative for west)
    pub offset_hours: i8,
    /// Time zone name, informational only (e.g. `Europe/Lisbon`)
    pub location: String<MAX_LOCATION_LEN>,
}

impl TimeZoneConfig {
    /// UTC, no offset
    pub fn utc() -> Self {
        let mut location = String::new();
        // "UTC" always fits
        let _ = location.push_str("UTC");
        Self {
            use_local_time: false,
            offset_hours: 0,
            location,
        }
    }

    /// Offset actually applied, in seconds
    ///
    /// Zero unless local time is enabled.
    pub fn effective_offset_secs(&self) -> i64 {
        if self.use_local_time {
            self.offset_hours as i64 * 3600
        } else {
            0
        }
    }
}

impl Default for TimeZoneConfig {
    fn default() -> Self {
        Self::utc()
    }
}

/// Complete configuration of one node
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeConfig {
    /// Role of this node
    pub role: Role,
    /// Address this node answers to
    pub own_address: Address,
    /// Address of the other station
    pub peer_address: Address,
    /// Serial line settings
    pub serial: UartConfig,
    /// Protocol timing
    pub timing: TimingConfig,
    /// How received frames are searched for STX
    pub marker_policy: MarkerPolicy,
    /// Time zone (Sensor only)
    pub time_zone: TimeZoneConfig,
}

impl NodeConfig {
    /// Defaults for `role`
    pub fn for_role(role: Role) -> Self {
        Self {
            role,
            own_address: role.default_address(),
            peer_address: role.peer().default_address(),
            serial: UartConfig::default(),
            timing: TimingConfig::for_role(role),
            marker_policy: MarkerPolicy::FullScan,
            time_zone: TimeZoneConfig::utc(),
        }
    }

    /// Default Main node (0x20, talks to 0x25)
    pub fn main() -> Self {
        Self::for_role(Role::Main)
    }

    /// Default Sensor node (0x25, answers 0x20)
    pub fn sensor() -> Self {
        Self::for_role(Role::Sensor)
    }

    /// Check the configuration for values the protocol cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.own_address == self.peer_address {
            return Err(ConfigError::SameAddress);
        }
        if self.serial.baudrate == 0 {
            return Err(ConfigError::ZeroBaudrate);
        }
        let capacity = self.serial.rx_capacity;
        if capacity < 2 || !capacity.is_power_of_two() {
            return Err(ConfigError::InvalidRxCapacity);
        }
        if self.timing.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.timing.scan_window_ms < self.timing.poll_interval_ms {
            return Err(ConfigError::WindowShorterThanPoll);
        }
        if self.time_zone.offset_hours.unsigned_abs() > MAX_OFFSET_HOURS as u8 {
            return Err(ConfigError::OffsetOutOfRange);
        }
        Ok(())
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self::main()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_defaults() {
        let main = NodeConfig::main();
        assert_eq!(main.own_address, Address(0x20));
        assert_eq!(main.peer_address, Address(0x25));
        assert_eq!(main.timing.scan_window_ms, 20_000);
        assert_eq!(main.timing.exchange_interval_ms, 30_000);

        let sensor = NodeConfig::sensor();
        assert_eq!(sensor.own_address, Address(0x25));
        assert_eq!(sensor.peer_address, Address(0x20));
        assert_eq!(sensor.timing.scan_window_ms, 60_000);
        assert_eq!(sensor.timing.exchange_interval_ms, 120_000);

        assert_eq!(main.serial.baudrate, 4800);
        assert_eq!(main.serial.rx_capacity, 64);
        assert_eq!(main.marker_policy, MarkerPolicy::FullScan);
    }

    #[test]
    fn test_defaults_validate() {
        assert_eq!(NodeConfig::main().validate(), Ok(()));
        assert_eq!(NodeConfig::sensor().validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut cfg = NodeConfig::main();
        cfg.peer_address = cfg.own_address;
        assert_eq!(cfg.validate(), Err(ConfigError::SameAddress));

        let mut cfg = NodeConfig::main();
        cfg.serial.baudrate = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroBaudrate));

        let mut cfg = NodeConfig::main();
        cfg.serial.rx_capacity = 48;
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidRxCapacity));
        cfg.serial.rx_capacity = 1;
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidRxCapacity));

        let mut cfg = NodeConfig::main();
        cfg.timing.poll_interval_ms = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroPollInterval));

        let mut cfg = NodeConfig::main();
        cfg.timing.scan_window_ms = 100;
        assert_eq!(cfg.validate(), Err(ConfigError::WindowShorterThanPoll));

        let mut cfg = NodeConfig::sensor();
        cfg.time_zone.offset_hours = -15;
        assert_eq!(cfg.validate(), Err(ConfigError::OffsetOutOfRange));
    }

    #[test]
    fn test_effective_offset() {
        let mut tz = TimeZoneConfig::utc();
        tz.offset_hours = 2;
        assert_eq!(tz.effective_offset_secs(), 0);
        tz.use_local_time = true;
        assert_eq!(tz.effective_offset_secs(), 7200);
        tz.offset_hours = -4;
        assert_eq!(tz.effective_offset_secs(), -14_400);
    }

    #[test]
    fn test_timing_durations() {
        let timing = TimingConfig::main();
        assert_eq!(timing.scan_window(), Duration::from_secs(20));
        assert_eq!(timing.poll_interval(), Duration::from_millis(200));
        assert_eq!(timing.ack_to_data(), Duration::from_secs(1));
    }
}
