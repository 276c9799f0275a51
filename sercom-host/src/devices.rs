//! Software stand-ins for the board peripherals

use std::time::{SystemTime, UNIX_EPOCH};

use embassy_time::Instant;

use sercom_core::traits::{ClockDisplay, DisplayError, NetworkTime, Rtc, RtcError, WallClock};
use sercom_hal::Monotonic;
use sercom_protocol::DateTime;

/// Real-time clock kept in software
///
/// Holds the last value it was set to and counts forward on a
/// monotonic clock.
#[derive(Debug, Clone)]
pub struct SoftRtc<C> {
    clock: C,
    base_unix: u64,
    set_at: Instant,
}

impl<C: Monotonic> SoftRtc<C> {
    /// Start counting from `unix` seconds
    pub fn new(clock: C, unix: u64) -> Self {
        let set_at = clock.now();
        Self {
            clock,
            base_unix: unix,
            set_at,
        }
    }

    /// Current reading as a calendar value
    ///
    /// `None` once the reading runs past year 9999.
    pub fn date_time(&self) -> Option<DateTime> {
        DateTime::from_unix(self.unix_time())
    }
}

impl<C: Monotonic> WallClock for SoftRtc<C> {
    fn unix_time(&self) -> u64 {
        self.base_unix
            .saturating_add((self.clock.now() - self.set_at).as_secs())
    }
}

impl<C: Monotonic> Rtc for SoftRtc<C> {
    fn set_clock(&mut self, datetime: DateTime) -> Result<(), RtcError> {
        self.base_unix = datetime.to_unix().ok_or(RtcError::InvalidValue)?;
        self.set_at = self.clock.now();
        Ok(())
    }
}

/// Network time taken from the host's system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemNetworkTime;

impl NetworkTime for SystemNetworkTime {
    fn fetch_unix_time(&mut self) -> Option<u64> {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()
            .map(|elapsed| elapsed.as_secs())
    }
}

/// Clock face that remembers what it was asked to show
#[derive(Debug, Clone, Default)]
pub struct MemoryDisplay {
    pub updates: Vec<(u8, u8)>,
}

impl MemoryDisplay {
    /// Last hour and minute shown
    pub fn shown(&self) -> Option<(u8, u8)> {
        self.updates.last().copied()
    }
}

impl ClockDisplay for MemoryDisplay {
    fn update_display(&mut self, hour: u8, minute: u8) -> Result<(), DisplayError> {
        self.updates.push((hour, minute));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::SimClock;
    use embassy_futures::block_on;
    use embedded_hal_async::delay::DelayNs;

    #[test]
    fn test_soft_rtc_counts_forward() {
        let clock = SimClock::new();
        let mut delay = clock.delay();
        let rtc = SoftRtc::new(clock.clone(), 1_665_018_900);

        block_on(delay.delay_ms(61_500));

        assert_eq!(rtc.unix_time(), 1_665_018_961);
        assert_eq!(
            rtc.date_time().unwrap().format().as_str(),
            "2022-10-06 01:16:01"
        );
    }

    #[test]
    fn test_soft_rtc_set() {
        let clock = SimClock::new();
        let mut rtc = SoftRtc::new(clock, 0);
        let dt = DateTime::parse("2024-02-29 12:00:00").unwrap();

        rtc.set_clock(dt).unwrap();

        assert_eq!(rtc.date_time(), Some(dt));
    }

    #[test]
    fn test_soft_rtc_rejects_pre_epoch() {
        let clock = SimClock::new();
        let mut rtc = SoftRtc::new(clock, 42);
        let dt = DateTime::parse("1969-12-31 23:59:59").unwrap();

        assert_eq!(rtc.set_clock(dt), Err(RtcError::InvalidValue));
        assert_eq!(rtc.unix_time(), 42);
    }

    #[test]
    fn test_soft_rtc_past_year_9999() {
        let clock = SimClock::new();
        let rtc = SoftRtc::new(clock, u64::MAX);
        assert_eq!(rtc.unix_time(), u64::MAX);
        assert_eq!(rtc.date_time(), None);
    }

    #[test]
    fn test_system_network_time_is_recent() {
        // Any host running these tests is past 2020
        let now = SystemNetworkTime.fetch_unix_time().unwrap();
        assert!(now > 1_577_836_800);
    }

    #[test]
    fn test_memory_display() {
        let mut display = MemoryDisplay::default();
        assert_eq!(display.shown(), None);
        display.update_display(1, 15).unwrap();
        display.update_display(1, 16).unwrap();
        assert_eq!(display.shown(), Some((1, 16)));
        assert_eq!(display.updates.len(), 2);
    }
}
