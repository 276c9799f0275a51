//! Serial link bundle
//!
//! A [`Link`] groups what a node needs to talk to its peer: the UART, a
//! monotonic clock for deadlines and an async delay for polling sleeps.
//! Every sleep also ticks the node's uptime log, so it keeps its grid while
//! a scan is waiting for the peer.

use embassy_time::{Duration, Instant};
use embedded_hal_async::delay::DelayNs;

use sercom_hal::{Monotonic, Uart};

use crate::driver::Uptime;
use crate::error::Error;

/// UART, clock and delay of one node
pub struct Link<U, C, D> {
    uart: U,
    clock: C,
    delay: D,
    uptime: Uptime,
}

impl<U, C, D> Link<U, C, D>
where
    U: Uart,
    C: Monotonic,
    D: DelayNs,
{
    pub fn new(uart: U, clock: C, delay: D) -> Self {
        let uptime = Uptime::new(clock.now());
        Self {
            uart,
            clock,
            delay,
            uptime,
        }
    }

    pub fn uart(&self) -> &U {
        &self.uart
    }

    pub fn uart_mut(&mut self) -> &mut U {
        &mut self.uart
    }

    pub fn uptime(&self) -> &Uptime {
        &self.uptime
    }

    pub fn into_parts(self) -> (U, C, D) {
        (self.uart, self.clock, self.delay)
    }

    /// Current instant of the node clock
    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Write `bytes` to the peer
    ///
    /// Fails with [`Error::SendFailed`] if the UART reports an error or
    /// accepts nothing. A short write is logged and returned as is.
    pub fn send(&mut self, bytes: &[u8]) -> Result<usize, Error> {
        let written = match self.uart.write(bytes) {
            Ok(0) | Err(_) => {
                warn!("send of {} bytes failed", bytes.len());
                return Err(Error::SendFailed);
            }
            Ok(n) => n,
        };
        if written < bytes.len() {
            warn!("short write: {} of {} bytes", written, bytes.len());
        }
        if self.uart.flush().is_err() {
            warn!("flush failed");
        }
        trace!("sent {} bytes", written);
        Ok(written)
    }

    /// Read whatever the UART holds into `buf`
    ///
    /// Receive errors count as an empty read.
    pub fn read_available(&mut self, buf: &mut [u8]) -> usize {
        match self.uart.read_available(buf) {
            Ok(n) => n,
            Err(_) => {
                warn!("uart read failed");
                0
            }
        }
    }

    /// Drop pending input
    pub fn clear_input(&mut self) {
        if self.uart.clear_input().is_err() {
            warn!("clearing uart input failed");
        }
    }

    /// Sleep for `duration`
    pub async fn sleep(&mut self, duration: Duration) {
        let ms = duration.as_millis().min(u32::MAX as u64) as u32;
        self.delay.delay_ms(ms).await;
        self.uptime.tick(self.clock.now());
    }
}
