//! Sercom Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits a Sercom node needs
//! from its board: a serial port and a monotonic clock. Chip-specific code
//! (or the `sercom-host` platform crate) implements them so the protocol
//! and node logic stay board-agnostic.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Node logic (sercom-core)               │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  sercom-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  sercom-host  │       │ board UART +  │
//! │  (std)        │       │ embassy-time  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial communication
//! - [`clock::Monotonic`] - Deadline clock
//!
//! Sleeping is not abstracted here: nodes take any
//! `embedded_hal_async::delay::DelayNs`.

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod io;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use clock::Monotonic;
pub use io::IoUart;
pub use uart::{Uart, UartConfig, UartRx, UartTx};

#[cfg(feature = "embassy")]
pub use clock::EmbassyClock;
