//! Board-agnostic node logic for Sercom stations
//!
//! This crate contains everything a station does that does not depend on
//! a specific board:
//!
//! - Node configuration and its postcard persistence
//! - The receive scanner that turns polled bytes into messages
//! - Main and Sensor state machines and their periodic loops
//! - Collaborator traits (RTC, clock display, wall clock, network time)
//! - Sensor payload producers and the Main clock face
//!
//! Nodes are plain `async fn`s. Their only await points are the delay
//! sleeps between polls, so any single-threaded executor can drive them.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

// Must come first so the logging macros are visible to other modules
mod fmt;

pub mod clock_face;
pub mod config;
pub mod driver;
pub mod error;
pub mod link;
pub mod producers;
pub mod roles;
pub mod scanner;
pub mod session;
pub mod traits;

#[cfg(test)]
mod testing;

pub use error::Error;
pub use link::Link;
pub use roles::{MainNode, SensorNode};
pub use scanner::{ReceiveScanner, ScanOutcome, ScanPhase, ScanTarget};
pub use session::Session;
