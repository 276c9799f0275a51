//! Time sources used by a Sensor

/// Wall clock reading the board's real-time clock
pub trait WallClock {
    /// Seconds since the unix epoch, UTC
    fn unix_time(&self) -> u64;
}

impl<T: WallClock + ?Sized> WallClock for &T {
    fn unix_time(&self) -> u64 {
        (**self).unix_time()
    }
}

/// Network time service (NTP or similar)
pub trait NetworkTime {
    /// Current UTC time in unix seconds, or `None` when unreachable
    fn fetch_unix_time(&mut self) -> Option<u64>;
}

/// Network time source for boards without connectivity
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNetwork;

impl NetworkTime for NoNetwork {
    fn fetch_unix_time(&mut self) -> Option<u64> {
        None
    }
}
