//! Adapter from `embedded-io` peripherals to the Sercom UART traits
//!
//! Most HAL serial drivers implement `embedded_io::{Read, ReadReady, Write}`.
//! [`IoUart`] turns such a driver into a non-blocking [`UartRx`] by only
//! reading when `read_ready()` reports buffered data.

use embedded_io::{Read, ReadReady, Write};

use crate::uart::{UartRx, UartTx};

/// Scratch size used while draining the receive buffer
const DRAIN_CHUNK: usize = 16;

/// `embedded-io` serial port wrapped as a Sercom UART
#[derive(Debug)]
pub struct IoUart<T> {
    inner: T,
}

impl<T> IoUart<T> {
    /// Wrap an `embedded-io` serial port
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Get access to the wrapped port
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Consume the adapter and return the wrapped port
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Write> UartTx for IoUart<T> {
    type Error = T::Error;

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        let mut sent = 0;
        while sent < data.len() {
            match self.inner.write(&data[sent..])? {
                0 => break,
                n => sent += n,
            }
        }
        Ok(sent)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.inner.flush()
    }
}

impl<T: Read + ReadReady> UartRx for IoUart<T> {
    type Error = T::Error;

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() || !self.inner.read_ready()? {
            return Ok(0);
        }
        self.inner.read(buf)
    }

    fn clear_input(&mut self) -> Result<(), Self::Error> {
        let mut scratch = [0u8; DRAIN_CHUNK];
        while self.inner.read_ready()? {
            if self.inner.read(&mut scratch)? == 0 {
                break;
            }
        }
        Ok(())
    }
}
