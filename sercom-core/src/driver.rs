//! Periodic scheduling helpers for the node loops
//!
//! Both loops are driven by the node's monotonic clock rather than a
//! ticker task: every pass asks each [`Periodic`] whether it is due.

use embassy_time::{Duration, Instant};

/// Uptime is logged on this grid
pub const UPTIME_LOG_INTERVAL: Duration = Duration::from_secs(10);

/// Fires on a fixed grid of instants
///
/// Missed slots are skipped, not replayed.
#[derive(Debug, Clone, Copy)]
pub struct Periodic {
    interval: Duration,
    next: Instant,
}

impl Periodic {
    /// First due immediately
    pub fn starting_now(now: Instant, interval: Duration) -> Self {
        Self {
            interval,
            next: now,
        }
    }

    /// First due one interval from now
    pub fn starting_after(now: Instant, interval: Duration) -> Self {
        Self {
            interval,
            next: now + interval,
        }
    }

    /// Next due instant
    pub fn next_due(&self) -> Instant {
        self.next
    }

    /// Returns true if due, and moves to the next slot after `now`
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        if self.interval == Duration::from_ticks(0) {
            self.next = now;
            return true;
        }
        while self.next <= now {
            self.next += self.interval;
        }
        true
    }
}

/// Logs elapsed time since start on a 10 s grid
#[derive(Debug, Clone, Copy)]
pub struct Uptime {
    start: Instant,
    grid: Periodic,
    logged: Option<u64>,
}

impl Uptime {
    pub fn new(start: Instant) -> Self {
        Self {
            start,
            grid: Periodic::starting_after(start, UPTIME_LOG_INTERVAL),
            logged: None,
        }
    }

    /// Seconds in the most recent log line
    pub fn last_logged(&self) -> Option<u64> {
        self.logged
    }

    /// Log if a grid slot passed; returns the logged seconds
    pub fn tick(&mut self, now: Instant) -> Option<u64> {
        if !self.grid.poll(now) {
            return None;
        }
        let secs = (now - self.start).as_secs();
        info!("uptime {} s", secs);
        self.logged = Some(secs);
        Some(secs)
    }
}
