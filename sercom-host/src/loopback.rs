//! In-memory serial link between two ports
//!
//! Bytes written on one port become readable on the other after the time
//! the wire would need to carry them at the configured baud rate. Each
//! port has a receive FIFO of `rx_capacity` bytes; bytes arriving while it
//! is full are lost, like on a UART without flow control.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use sercom_hal::{Monotonic, UartConfig, UartRx, UartTx};

#[derive(Debug, Default)]
struct Wire {
    /// Bytes on the wire with their arrival time in microseconds
    in_flight: VecDeque<(u64, u8)>,
    /// When the transmitter finishes the bytes already queued
    busy_until_us: u64,
}

#[derive(Debug, Default)]
struct Endpoint {
    rx: VecDeque<u8>,
    sent: Vec<Vec<u8>>,
    overruns: usize,
    connected: bool,
}

/// One end of a loopback link
#[derive(Debug)]
pub struct LoopbackPort<C> {
    config: UartConfig,
    clock: C,
    outgoing: Rc<RefCell<Wire>>,
    incoming: Rc<RefCell<Wire>>,
    endpoint: Endpoint,
}

/// Create two connected ports sharing `clock`
pub fn loopback_pair<C: Monotonic + Clone>(
    config: UartConfig,
    clock: C,
) -> (LoopbackPort<C>, LoopbackPort<C>) {
    let a_to_b = Rc::new(RefCell::new(Wire::default()));
    let b_to_a = Rc::new(RefCell::new(Wire::default()));
    let a = LoopbackPort::new(config, clock.clone(), Rc::clone(&a_to_b), Rc::clone(&b_to_a));
    let b = LoopbackPort::new(config, clock, b_to_a, a_to_b);
    (a, b)
}

impl<C: Monotonic> LoopbackPort<C> {
    fn new(
        config: UartConfig,
        clock: C,
        outgoing: Rc<RefCell<Wire>>,
        incoming: Rc<RefCell<Wire>>,
    ) -> Self {
        Self {
            config,
            clock,
            outgoing,
            incoming,
            endpoint: Endpoint {
                connected: true,
                ..Default::default()
            },
        }
    }

    /// Stop transmitting: writes accept nothing until reconnected
    pub fn disconnect(&mut self) {
        self.endpoint.connected = false;
    }

    pub fn reconnect(&mut self) {
        self.endpoint.connected = true;
    }

    /// Bytes lost to a full receive FIFO
    pub fn overruns(&self) -> usize {
        self.endpoint.overruns
    }

    /// Every accepted write, in order
    pub fn sent(&self) -> &[Vec<u8>] {
        &self.endpoint.sent
    }

    /// Bytes waiting in the receive FIFO
    pub fn pending(&mut self) -> usize {
        self.deliver();
        self.endpoint.rx.len()
    }

    fn now_us(&self) -> u64 {
        self.clock.now().as_micros()
    }

    fn deliver(&mut self) {
        let now = self.now_us();
        let capacity = self.config.rx_capacity as usize;
        let mut wire = self.incoming.borrow_mut();
        while let Some(&(arrival, byte)) = wire.in_flight.front() {
            if arrival > now {
                break;
            }
            wire.in_flight.pop_front();
            if self.endpoint.rx.len() < capacity {
                self.endpoint.rx.push_back(byte);
            } else {
                self.endpoint.overruns += 1;
            }
        }
    }
}

impl<C: Monotonic> UartTx for LoopbackPort<C> {
    type Error = Infallible;

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        if !self.endpoint.connected {
            return Ok(0);
        }
        let now = self.now_us();
        let mut wire = self.outgoing.borrow_mut();
        let start = wire.busy_until_us.max(now);
        for (i, &byte) in data.iter().enumerate() {
            let arrival = start + self.config.transmit_time_us(i + 1);
            wire.in_flight.push_back((arrival, byte));
        }
        wire.busy_until_us = start + self.config.transmit_time_us(data.len());
        self.endpoint.sent.push(data.to_vec());
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<C: Monotonic> UartRx for LoopbackPort<C> {
    type Error = Infallible;

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.deliver();
        let n = buf.len().min(self.endpoint.rx.len());
        for (slot, byte) in buf.iter_mut().zip(self.endpoint.rx.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn clear_input(&mut self) -> Result<(), Self::Error> {
        self.deliver();
        self.endpoint.rx.clear();
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
    fn test_bytes_arrive_after_wire_time() {
        let clock = SimClock::new();
        let mut delay = clock.delay();
        let (mut a, mut b) = loopback_pair(UartConfig::default(), clock.clone());
        let mut buf = [0u8; 8];

        assert_eq!(a.write(&[0x25, 100]), Ok(2));
        assert_eq!(b.read_available(&mut buf), Ok(0));

        // One byte takes 2083 us at 4800 baud 8N1
        block_on(delay.delay_us(2_100));
        assert_eq!(b.read_available(&mut buf), Ok(1));
        assert_eq!(buf[0], 0x25);

        block_on(delay.delay_us(2_100));
        assert_eq!(b.read_available(&mut buf), Ok(1));
        assert_eq!(buf[0], 100);
    }

    #[test]
    fn test_both_directions() {
        let clock = SimClock::new();
        let mut delay = clock.delay();
        let (mut a, mut b) = loopback_pair(UartConfig::default(), clock.clone());
        let mut buf = [0u8; 8];

        a.write(b"hi").unwrap();
        b.write(b"yo").unwrap();
        block_on(delay.delay_ms(10));

        assert_eq!(a.read_available(&mut buf), Ok(2));
        assert_eq!(&buf[..2], b"yo");
        assert_eq!(b.read_available(&mut buf), Ok(2));
        assert_eq!(&buf[..2], b"hi");
    }

    #[test]
    fn test_fifo_overrun_drops_bytes() {
        let clock = SimClock::new();
        let mut delay = clock.delay();
        let mut config = UartConfig::default();
        config.rx_capacity = 4;
        let (mut a, mut b) = loopback_pair(config, clock.clone());

        a.write(&[1, 2, 3, 4, 5, 6]).unwrap();
        block_on(delay.delay_ms(50));

        assert_eq!(b.pending(), 4);
        assert_eq!(b.overruns(), 2);
        let mut buf = [0u8; 8];
        assert_eq!(b.read_available(&mut buf), Ok(4));
        assert_eq!(&buf[..4], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_clear_input_keeps_bytes_still_in_flight() {
        let clock = SimClock::new();
        let mut delay = clock.delay();
        let (mut a, mut b) = loopback_pair(UartConfig::default(), clock.clone());

        a.write(&[1, 2, 3]).unwrap();
        block_on(delay.delay_us(4_200));
        b.clear_input().unwrap();
        block_on(delay.delay_ms(10));

        let mut buf = [0u8; 8];
        assert_eq!(b.read_available(&mut buf), Ok(1));
        assert_eq!(buf[0], 3);
    }

    #[test]
    fn test_disconnected_port_sends_nothing() {
        let clock = SimClock::new();
        let (mut a, _b) = loopback_pair(UartConfig::default(), clock);
        a.disconnect();
        assert_eq!(a.write(&[1]), Ok(0));
        assert!(a.sent().is_empty());
        a.reconnect();
        assert_eq!(a.write(&[1]), Ok(1));
        assert_eq!(a.sent(), [vec![1]]);
    }
}
