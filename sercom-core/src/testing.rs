//! Test doubles shared by the unit tests

use core::cell::Cell;
use core::convert::Infallible;
use std::collections::VecDeque;
use std::vec::Vec;

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Instant;
use embedded_hal_async::delay::DelayNs;

use sercom_hal::{Monotonic, UartRx, UartTx};
use sercom_protocol::DateTime;

use crate::link::Link;
use crate::traits::{ClockDisplay, DisplayError, NetworkTime, Rtc, RtcError, WallClock};

/// Simulated time, advanced only by [`FakeDelay`]
///
/// Can raise a cancel signal once a given time is reached.
pub struct TestTime {
    micros: Cell<u64>,
    cancel_at_ms: Cell<Option<u64>>,
    cancel: Signal<NoopRawMutex, ()>,
}

impl TestTime {
    pub fn new() -> Self {
        Self {
            micros: Cell::new(0),
            cancel_at_ms: Cell::new(None),
            cancel: Signal::new(),
        }
    }

    /// Signal cancellation once time reaches `ms`
    pub fn cancel_at(&self, ms: u64) {
        self.cancel_at_ms.set(Some(ms));
    }

    pub fn cancel_signal(&self) -> &Signal<NoopRawMutex, ()> {
        &self.cancel
    }

    pub fn now_ms(&self) -> u64 {
        self.micros.get() / 1_000
    }

    pub fn advance_us(&self, us: u64) {
        self.micros.set(self.micros.get() + us);
        if let Some(at) = self.cancel_at_ms.get() {
            if self.now_ms() >= at {
                self.cancel.signal(());
            }
        }
    }

    pub fn link<'a>(
        &'a self,
        serial: ScriptedSerial<'a>,
    ) -> Link<ScriptedSerial<'a>, FakeClock<'a>, FakeDelay<'a>> {
        Link::new(serial, FakeClock(self), FakeDelay(self))
    }
}

pub struct FakeClock<'a>(pub &'a TestTime);

impl Monotonic for FakeClock<'_> {
    fn now(&self) -> Instant {
        Instant::from_micros(self.0.micros.get())
    }
}

pub struct FakeDelay<'a>(pub &'a TestTime);

impl DelayNs for FakeDelay<'_> {
    async fn delay_ns(&mut self, ns: u32) {
        self.0.advance_us(ns as u64 / 1_000);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.0.advance_us(ms as u64 * 1_000);
    }
}

/// Serial port replaying chunks that become readable at given instants
pub struct ScriptedSerial<'a> {
    time: &'a TestTime,
    script: VecDeque<(u64, Vec<u8>)>,
    rx: VecDeque<u8>,
    written: Vec<(u64, Vec<u8>)>,
    clears: usize,
    fail_writes: bool,
}

impl<'a> ScriptedSerial<'a> {
    pub fn new(time: &'a TestTime) -> Self {
        Self {
            time,
            script: VecDeque::new(),
            rx: VecDeque::new(),
            written: Vec::new(),
            clears: 0,
            fail_writes: false,
        }
    }

    /// Make `bytes` readable from `at_ms` on
    pub fn with_chunk(mut self, at_ms: u64, bytes: &[u8]) -> Self {
        self.script.push_back((at_ms, bytes.to_vec()));
        self
    }

    /// Accept nothing on write
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Bytes written so far, one entry per write call
    pub fn written(&self) -> Vec<Vec<u8>> {
        self.written.iter().map(|(_, bytes)| bytes.clone()).collect()
    }

    /// Write times in milliseconds
    pub fn write_times(&self) -> Vec<u64> {
        self.written.iter().map(|(at, _)| *at).collect()
    }

    pub fn clears(&self) -> usize {
        self.clears
    }

    fn deliver(&mut self) {
        let now = self.time.now_ms();
        while let Some((at, _)) = self.script.front() {
            if *at > now {
                break;
            }
            if let Some((_, bytes)) = self.script.pop_front() {
                self.rx.extend(bytes);
            }
        }
    }
}

impl UartTx for ScriptedSerial<'_> {
    type Error = Infallible;

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        if self.fail_writes {
            return Ok(0);
        }
        self.written.push((self.time.now_ms(), data.to_vec()));
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl UartRx for ScriptedSerial<'_> {
    type Error = Infallible;

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.deliver();
        let n = buf.len().min(self.rx.len());
        for (slot, byte) in buf.iter_mut().zip(self.rx.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn clear_input(&mut self) -> Result<(), Self::Error> {
        self.deliver();
        self.rx.clear();
        self.clears += 1;
        Ok(())
    }
}

pub fn never_cancelled() -> Signal<NoopRawMutex, ()> {
    Signal::new()
}

/// RTC that counts forward on test time and remembers every value it
/// was set to
pub struct RecordingRtc<'a> {
    time: &'a TestTime,
    base_unix: u64,
    set_at_ms: u64,
    pub sets: Vec<DateTime>,
}

impl<'a> RecordingRtc<'a> {
    pub fn new(time: &'a TestTime) -> Self {
        Self {
            time,
            base_unix: 0,
            set_at_ms: time.now_ms(),
            sets: Vec::new(),
        }
    }
}

impl WallClock for RecordingRtc<'_> {
    fn unix_time(&self) -> u64 {
        self.base_unix + (self.time.now_ms() - self.set_at_ms) / 1_000
    }
}

impl Rtc for RecordingRtc<'_> {
    fn set_clock(&mut self, datetime: DateTime) -> Result<(), RtcError> {
        self.base_unix = datetime.to_unix().ok_or(RtcError::InvalidValue)?;
        self.set_at_ms = self.time.now_ms();
        self.sets.push(datetime);
        Ok(())
    }
}

/// Display that remembers every update
#[derive(Default)]
pub struct RecordingDisplay {
    pub updates: Vec<(u8, u8)>,
}

impl ClockDisplay for RecordingDisplay {
    fn update_display(&mut self, hour: u8, minute: u8) -> Result<(), DisplayError> {
        self.updates.push((hour, minute));
        Ok(())
    }
}

/// Wall clock stuck at a fixed unix time
pub struct FixedWallClock(pub u64);

impl WallClock for FixedWallClock {
    fn unix_time(&self) -> u64 {
        self.0
    }
}

/// Board clock that can be read and set
#[derive(Default)]
pub struct SettableClock {
    pub unix: u64,
    pub sets: Vec<DateTime>,
}

impl WallClock for SettableClock {
    fn unix_time(&self) -> u64 {
        self.unix
    }
}

impl Rtc for SettableClock {
    fn set_clock(&mut self, datetime: DateTime) -> Result<(), RtcError> {
        self.unix = datetime.to_unix().ok_or(RtcError::InvalidValue)?;
        self.sets.push(datetime);
        Ok(())
    }
}

/// Network time source answering with a fixed value and counting calls
#[derive(Default)]
pub struct CountingNetwork {
    pub answer: Option<u64>,
    pub calls: usize,
}

impl NetworkTime for CountingNetwork {
    fn fetch_unix_time(&mut self) -> Option<u64> {
        self.calls += 1;
        self.answer
    }
}
