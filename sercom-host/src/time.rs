//! Clocks and delays for running nodes on a desktop
//!
//! [`StdClock`] and [`StdDelay`] follow the wall clock. [`SimClock`] keeps
//! virtual time that only moves when every participant is asleep, so two
//! nodes joined on one thread can run minutes of protocol in milliseconds
//! and always in the same order.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration as StdDuration;

use embassy_time::Instant;
use embedded_hal_async::delay::DelayNs;

use sercom_hal::Monotonic;

/// Monotonic clock backed by `std::time::Instant`
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    origin: std::time::Instant,
}

impl StdClock {
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Monotonic for StdClock {
    fn now(&self) -> Instant {
        Instant::from_micros(self.origin.elapsed().as_micros() as u64)
    }
}

/// Delay that sleeps the thread in small steps, yielding between them
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

const STD_DELAY_STEP: StdDuration = StdDuration::from_millis(1);

impl DelayNs for StdDelay {
    async fn delay_ns(&mut self, ns: u32) {
        let until = std::time::Instant::now() + StdDuration::from_nanos(ns as u64);
        while std::time::Instant::now() < until {
            std::thread::sleep(STD_DELAY_STEP.min(until - std::time::Instant::now()));
            embassy_futures::yield_now().await;
        }
    }
}

#[derive(Debug, Default)]
struct SimState {
    now_us: u64,
    participants: usize,
    sleepers: Vec<u64>,
}

impl SimState {
    fn wake_earliest_if_all_asleep(&mut self) {
        if self.sleepers.len() < self.participants {
            return;
        }
        if let Some(&earliest) = self.sleepers.iter().min() {
            self.now_us = self.now_us.max(earliest);
        }
    }
}

/// Shared virtual clock
///
/// Cloning gives another handle to the same time.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    state: Rc<RefCell<SimState>>,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a delay taking part in the simulation
    ///
    /// Time only advances once every live delay is sleeping, so each
    /// cooperating task must own one and drop it when it finishes.
    pub fn delay(&self) -> SimDelay {
        self.state.borrow_mut().participants += 1;
        SimDelay {
            state: Rc::clone(&self.state),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.state.borrow().now_us / 1_000
    }
}

impl Monotonic for SimClock {
    fn now(&self) -> Instant {
        Instant::from_micros(self.state.borrow().now_us)
    }
}

/// Delay on a [`SimClock`]
#[derive(Debug)]
pub struct SimDelay {
    state: Rc<RefCell<SimState>>,
}

impl SimDelay {
    async fn sleep_us(&mut self, us: u64) {
        let wake_at = {
            let mut state = self.state.borrow_mut();
            let wake_at = state.now_us + us;
            state.sleepers.push(wake_at);
            wake_at
        };

        loop {
            {
                let mut state = self.state.borrow_mut();
                state.wake_earliest_if_all_asleep();
                if state.now_us >= wake_at {
                    if let Some(pos) = state.sleepers.iter().position(|&t| t == wake_at) {
                        state.sleepers.swap_remove(pos);
                    }
                    return;
                }
            }
            embassy_futures::yield_now().await;
        }
    }
}

impl DelayNs for SimDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.sleep_us((ns as u64).div_ceil(1_000)).await;
    }

    async fn delay_us(&mut self, us: u32) {
        self.sleep_us(us as u64).await;
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.sleep_us(ms as u64 * 1_000).await;
    }
}

impl Drop for SimDelay {
    fn drop(&mut self) {
        let mut state = self.state.borrow_mut();
        state.participants = state.participants.saturating_sub(1);
    }
}
