//! Desktop platform for Sercom nodes
//!
//! Implements the `sercom-hal` traits and the node collaborators on a
//! normal operating system:
//!
//! - [`time`] - wall-clock and simulated monotonic clocks and delays
//! - [`loopback`] - two serial ports wired to each other in memory
//! - [`devices`] - software RTC, system network time, recording display
//! - [`config`] - TOML node configuration
//!
//! With [`time::SimClock`] a Main and a Sensor can be joined on one
//! thread and run deterministically:
//!
//! ```ignore
//! let clock = SimClock::new();
//! let (main_port, sensor_port) = loopback_pair(UartConfig::default(), clock.clone());
//! let main_link = Link::new(main_port, clock.clone(), clock.delay());
//! let sensor_link = Link::new(sensor_port, clock.clone(), clock.delay());
//! ```

pub mod config;
pub mod devices;
pub mod loopback;
pub mod time;

pub use config::{load_toml, parse_toml, ConfigError};
pub use devices::{MemoryDisplay, SoftRtc, SystemNetworkTime};
pub use loopback::{loopback_pair, LoopbackPort};
pub use time::{SimClock, SimDelay, StdClock, StdDelay};
