//! UART serial communication abstractions
//!
//! Sercom reads the link by polling: a read never waits for data, it
//! returns whatever the receive buffer holds (possibly nothing). Writes
//! report how many bytes went out, which is the only transmit confirmation
//! the protocol gets.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Baud rate used by every known Sercom deployment
pub const DEFAULT_BAUDRATE: u32 = 4800;

/// Default receive buffer capacity (must be a power of two)
pub const DEFAULT_RX_CAPACITY: u16 = 64;

/// UART transmitter
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Write data to the UART
    ///
    /// Blocks until the data has been handed to the peripheral and returns
    /// the number of bytes accepted. Zero means nothing was sent.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// UART receiver
pub trait UartRx {
    /// Error type for receive operations
    type Error;

    /// Read whatever is currently buffered, up to `buf.len()` bytes
    ///
    /// Never blocks. Returns `Ok(0)` when nothing is available.
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Drop every byte currently held in the receive buffer
    fn clear_input(&mut self) -> Result<(), Self::Error>;
}

/// Combined UART interface
///
/// For UARTs that provide both TX and RX on a single peripheral.
pub trait Uart: UartTx + UartRx {}

// Blanket implementation
impl<T: UartTx + UartRx> Uart for T {}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UartConfig {
    /// TX pin number on the board
    pub tx_pin: u8,
    /// RX pin number on the board
    pub rx_pin: u8,
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Receive buffer capacity in bytes (power of two)
    pub rx_capacity: u16,
    /// Number of data bits per frame
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            tx_pin: 0,
            rx_pin: 1,
            baudrate: DEFAULT_BAUDRATE,
            rx_capacity: DEFAULT_RX_CAPACITY,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

impl UartConfig {
    /// Create a config for the given pins with the default line settings
    pub const fn with_pins(tx_pin: u8, rx_pin: u8) -> Self {
        Self {
            tx_pin,
            rx_pin,
            baudrate: DEFAULT_BAUDRATE,
            rx_capacity: DEFAULT_RX_CAPACITY,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }

    /// Time needed to shift `bytes` bytes out at the configured baud rate
    ///
    /// Counts start and stop bits plus parity. Returned in microseconds.
    pub fn transmit_time_us(&self, bytes: usize) -> u64 {
        let data = match self.data_bits {
            DataBits::Seven => 7,
            DataBits::Eight => 8,
            DataBits::Nine => 9,
        };
        let parity = match self.parity {
            Parity::None => 0,
            Parity::Even | Parity::Odd => 1,
        };
        let stop = match self.stop_bits {
            StopBits::One => 1,
            StopBits::Two => 2,
        };
        let bits_per_byte = 1 + data + parity + stop;
        if self.baudrate == 0 {
            return 0;
        }
        (bytes as u64 * bits_per_byte * 1_000_000) / self.baudrate as u64
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DataBits {
    Seven,
    Eight,
    Nine,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum StopBits {
    One,
    Two,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_line_settings() {
        let config = UartConfig::default();
        assert_eq!(config.baudrate, 4800);
        assert_eq!(config.rx_capacity, 64);
        assert!(config.rx_capacity.is_power_of_two());
        assert_eq!(config.data_bits, DataBits::Eight);
    }

    #[test]
    fn test_with_pins() {
        let config = UartConfig::with_pins(8, 9);
        assert_eq!(config.tx_pin, 8);
        assert_eq!(config.rx_pin, 9);
        assert_eq!(config.baudrate, DEFAULT_BAUDRATE);
    }

    #[test]
    fn test_transmit_time() {
        // 8N1 at 4800 baud: 10 bits per byte, ~2.08 ms per byte
        let config = UartConfig::default();
        assert_eq!(config.transmit_time_us(0), 0);
        assert_eq!(config.transmit_time_us(2), 4166);
        assert_eq!(config.transmit_time_us(22), 45833);
    }
}
