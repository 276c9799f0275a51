//! Configuration types
//!
//! Board-agnostic node configuration, stored as postcard binary data.

pub mod types;

pub use types::*;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Own and peer address are the same
    SameAddress,
    /// Baud rate of zero
    ZeroBaudrate,
    /// Receive capacity not a power of two, or too small for a message
    InvalidRxCapacity,
    /// Poll interval of zero
    ZeroPollInterval,
    /// Scan window shorter than one poll interval
    WindowShorterThanPoll,
    /// Time zone offset beyond ±14 hours
    OffsetOutOfRange,
    /// Serialization failed (buffer too small)
    Serialize,
    /// Deserialization failed
    Deserialize,
}

/// Serialize `config` into `buffer`
///
/// Returns the number of bytes used.
#[cfg(feature = "serde")]
pub fn store(config: &NodeConfig, buffer: &mut [u8]) -> Result<usize, ConfigError> {
    postcard::to_slice(config, buffer)
        .map(|used| used.len())
        .map_err(|_| ConfigError::Serialize)
}

/// Deserialize and validate a stored configuration
#[cfg(feature = "serde")]
pub fn load(bytes: &[u8]) -> Result<NodeConfig, ConfigError> {
    let config: NodeConfig = postcard::from_bytes(bytes).map_err(|_| ConfigError::Deserialize)?;
    config.validate()?;
    Ok(config)
}
