//! Monotonic clock abstraction
//!
//! Receive deadlines are computed once from this clock at the start of a
//! scan. Instants and durations are plain `embassy_time` values; only
//! [`EmbassyClock`] needs a time driver.

use embassy_time::Instant;

/// A clock that never goes backwards
pub trait Monotonic {
    /// Current instant
    fn now(&self) -> Instant;
}

impl<T: Monotonic + ?Sized> Monotonic for &T {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Clock backed by the embassy time driver
#[cfg(feature = "embassy")]
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

#[cfg(feature = "embassy")]
impl Monotonic for EmbassyClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
