//! The two station roles

pub mod main;
pub mod sensor;

pub use main::MainNode;
pub use sensor::SensorNode;
