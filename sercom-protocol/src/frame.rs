//! Frame encoding and decoding for data responses.
//!
//! Frame format:
//! - DEST (1 byte): address of the station the payload is for
//! - LENGTH (1 byte): payload length (0-255)
//! - STX (1 byte): 0x02 start-of-text marker
//! - PAYLOAD (LENGTH bytes): ASCII text
//!
//! There is no checksum. A receiver finds the frame by looking for the STX
//! byte, so a payload that happens to contain 0x02 (or a length byte of 2)
//! cannot be located unambiguously and is rejected rather than guessed at.

use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::codes::{Address, STX};

/// Maximum payload size in bytes (the length prefix is one byte)
pub const MAX_PAYLOAD_SIZE: usize = u8::MAX as usize;

/// DEST + LENGTH + STX
pub const FRAME_HEADER_SIZE: usize = 3;

/// Maximum complete frame size
pub const MAX_FRAME_SIZE: usize = FRAME_HEADER_SIZE + MAX_PAYLOAD_SIZE;

/// Position of the STX byte in an undamaged frame
pub const STX_INDEX: usize = 2;

/// Errors that can occur during frame parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload longer than a one-byte length prefix can describe
    PayloadTooLong,
    /// Request code outside the catalog; must not be transmitted
    UnknownRequestCode,
    /// No STX byte in the buffer (keep polling)
    NoMarker,
    /// More than one STX byte in the buffer
    AmbiguousMarker,
    /// Fewer payload bytes after STX than the length prefix declares
    TruncatedPayload,
    /// Buffer shorter than the caller's minimum frame length
    Incomplete,
    /// STX found where no DEST/LENGTH header can precede it
    MissingHeader,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// How the receiver locates the STX marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum MarkerPolicy {
    /// Search the whole buffer; exactly one STX must be present
    #[default]
    FullScan,
    /// Expect the first STX at [`STX_INDEX`] and ignore any later ones
    ///
    /// Cheaper, but wrong as soon as the transport drops a header byte.
    FixedIndex,
}

/// A parsed or constructed frame
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    /// Destination station
    pub dest: Address,
    /// Payload data
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Frame {
    /// Create a new frame with the given destination and payload
    pub fn new(dest: Address, payload: &[u8]) -> Result<Self, FrameError> {
        let mut payload_vec = Vec::new();
        payload_vec
            .extend_from_slice(payload)
            .map_err(|_| FrameError::PayloadTooLong)?;

        Ok(Self {
            dest,
            payload: payload_vec,
        })
    }

    /// Value of the LENGTH byte for this frame
    pub fn declared_len(&self) -> u8 {
        // Vec capacity bounds the length to u8::MAX
        self.payload.len() as u8
    }

    /// Payload as text, if it is valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.payload).ok()
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let frame_len = FRAME_HEADER_SIZE + self.payload.len();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        buffer[0] = self.dest.to_byte();
        buffer[1] = self.declared_len();
        buffer[STX_INDEX] = STX;
        buffer[FRAME_HEADER_SIZE..frame_len].copy_from_slice(&self.payload);

        Ok(frame_len)
    }

    /// Encode this frame into a heapless Vec
    pub fn encode_to_vec(&self) -> Vec<u8, MAX_FRAME_SIZE> {
        let mut vec = Vec::new();
        // Header plus a bounded payload always fits MAX_FRAME_SIZE
        let _ = vec.extend_from_slice(&[self.dest.to_byte(), self.declared_len(), STX]);
        let _ = vec.extend_from_slice(&self.payload);
        vec
    }
}

/// Build the wire bytes for a text payload addressed to `dest`
pub fn encode_frame(dest: Address, payload: &str) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
    Frame::new(dest, payload.as_bytes()).map(|frame| frame.encode_to_vec())
}

/// Number of STX bytes in `buffer`
pub fn marker_count(buffer: &[u8]) -> usize {
    buffer.iter().filter(|&&b| b == STX).count()
}

/// Find the index of the STX marker according to `policy`
pub fn locate_marker(buffer: &[u8], policy: MarkerPolicy) -> Result<usize, FrameError> {
    let first = buffer
        .iter()
        .position(|&b| b == STX)
        .ok_or(FrameError::NoMarker)?;

    match policy {
        MarkerPolicy::FullScan => {
            if marker_count(&buffer[first + 1..]) > 0 {
                return Err(FrameError::AmbiguousMarker);
            }
            Ok(first)
        }
        MarkerPolicy::FixedIndex => {
            if first == STX_INDEX {
                Ok(first)
            } else {
                Err(FrameError::NoMarker)
            }
        }
    }
}

/// Decode a frame whose STX sits at `stx_index`
///
/// DEST is taken from the first buffer byte and LENGTH from the byte just
/// before STX. Bytes after the declared payload are ignored.
pub fn decode_at(buffer: &[u8], stx_index: usize) -> Result<Frame, FrameError> {
    if stx_index < STX_INDEX || stx_index >= buffer.len() {
        return Err(FrameError::MissingHeader);
    }

    let declared = buffer[stx_index - 1] as usize;
    let start = stx_index + 1;
    let payload = buffer
        .get(start..start + declared)
        .ok_or(FrameError::TruncatedPayload)?;

    Frame::new(Address(buffer[0]), payload)
}

/// Decode a frame from a receive buffer using a full marker scan
pub fn try_decode_frame(buffer: &[u8], expected_min_len: usize) -> Result<Frame, FrameError> {
    try_decode_frame_with(buffer, expected_min_len, MarkerPolicy::FullScan)
}

/// Decode a frame from a receive buffer with an explicit marker policy
pub fn try_decode_frame_with(
    buffer: &[u8],
    expected_min_len: usize,
    policy: MarkerPolicy,
) -> Result<Frame, FrameError> {
    if buffer.len() < expected_min_len {
        return Err(FrameError::Incomplete);
    }
    let stx_index = locate_marker(buffer, policy)?;
    decode_at(buffer, stx_index)
}
