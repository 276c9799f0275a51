//! Two-byte control messages
//!
//! - Main → Sensor: request `[DEST, CODE]`
//! - Sensor → Main: acknowledge `[DEST, ACK]`, DEST being the requester

use crate::codes::{Address, RequestCode, ACK};
use crate::frame::FrameError;

/// Size of a request or acknowledge message on the wire
pub const MESSAGE_SIZE: usize = 2;

/// Request sent by the Main station
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RequestMessage {
    /// Station the request is for
    pub dest: Address,
    /// What is being asked for
    pub code: RequestCode,
}

impl RequestMessage {
    /// Parse a request from exactly two received bytes
    ///
    /// The code may be [`RequestCode::Unknown`]; the receiver decides what
    /// to do with it.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [dest, code] => Some(Self {
                dest: Address(*dest),
                code: RequestCode::from_byte(*code),
            }),
            _ => None,
        }
    }

    /// Encode for transmission
    pub fn encode(&self) -> Result<[u8; MESSAGE_SIZE], FrameError> {
        encode_request(self.dest, self.code)
    }
}

/// Acknowledge sent by the Sensor station
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AckMessage {
    /// Station that sent the acknowledged request
    pub dest: Address,
}

impl AckMessage {
    /// Parse an acknowledge from exactly two received bytes
    ///
    /// Returns `None` unless the second byte is ACK.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [dest, ACK] => Some(Self {
                dest: Address(*dest),
            }),
            _ => None,
        }
    }

    /// Encode for transmission
    pub fn encode(&self) -> [u8; MESSAGE_SIZE] {
        encode_ack(self.dest)
    }
}

/// Build a request for `code` addressed to `dest`
///
/// Codes outside the catalog are refused so they never reach the wire.
pub fn encode_request(dest: Address, code: RequestCode) -> Result<[u8; MESSAGE_SIZE], FrameError> {
    if !code.is_known() {
        return Err(FrameError::UnknownRequestCode);
    }
    Ok([dest.to_byte(), code.to_byte()])
}

/// Build an acknowledge addressed to `dest`
pub fn encode_ack(dest: Address) -> [u8; MESSAGE_SIZE] {
    [dest.to_byte(), ACK]
}

/// Decode a 2-byte request; unknown codes are kept as `Unknown`
pub fn parse_request(bytes: &[u8]) -> Option<RequestMessage> {
    RequestMessage::parse(bytes)
}

/// Decode a 2-byte acknowledge
pub fn parse_ack(bytes: &[u8]) -> Option<AckMessage> {
    AckMessage::parse(bytes)
}
