//! Collaborator traits
//!
//! These traits define the interface between the node logic and the
//! board peripherals it only reports to or reads from.

pub mod display;
pub mod rtc;
pub mod time_source;

pub use display::{ClockDisplay, DisplayError};
pub use rtc::{Rtc, RtcError};
pub use time_source::{NetworkTime, NoNetwork, WallClock};
