//! Sercom Wire Protocol
//!
//! This crate defines the bytes exchanged between the two Sercom stations
//! over a half-duplex serial link: the Main station, which asks for the
//! time and shows it, and the Sensor station, which owns a trustworthy
//! clock and answers.
//!
//! # Protocol Overview
//!
//! A single exchange is three messages:
//! ```text
//! Main   → Sensor   ┌──────┬──────┐
//!                   │ DEST │ CODE │                      request
//!                   └──────┴──────┘
//! Sensor → Main     ┌──────┬──────┐
//!                   │ DEST │ ACK  │                      acknowledge
//!                   └──────┴──────┘
//! Sensor → Main     ┌──────┬────────┬─────┬─────────────┐
//!                   │ DEST │ LENGTH │ STX │ PAYLOAD     │  data frame
//!                   │ 1B   │ 1B     │ 1B  │ 0–255B      │
//!                   └──────┴────────┴─────┴─────────────┘
//! ```
//!
//! There is no checksum and no escaping. Receivers locate the data frame
//! by its STX byte and validate the payload text separately.

#![no_std]
#![deny(unsafe_code)]

pub mod codes;
pub mod datetime;
pub mod frame;
pub mod messages;

pub use codes::{Address, ControlByte, RequestCode, ACK, NAK, STX};
pub use datetime::{validate_datetime_shape, DateTime, DATETIME_LEN, MAX_YEAR};
pub use frame::{
    decode_at, encode_frame, locate_marker, marker_count, try_decode_frame,
    try_decode_frame_with, Frame, FrameError, MarkerPolicy, FRAME_HEADER_SIZE, MAX_FRAME_SIZE,
    MAX_PAYLOAD_SIZE, STX_INDEX,
};
pub use messages::{
    encode_ack, encode_request, parse_ack, parse_request, AckMessage, RequestMessage, MESSAGE_SIZE,
};
