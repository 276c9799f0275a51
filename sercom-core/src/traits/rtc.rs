//! Real-time clock sink

use sercom_protocol::DateTime;

/// Errors from the real-time clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RtcError {
    /// The clock rejected the value
    InvalidValue,
    /// Bus or peripheral failure
    Hardware,
}

/// Settable real-time clock
///
/// Main sets it once per validated date-time payload. A Sensor sets it
/// after each network time refresh.
pub trait Rtc {
    /// Set the clock
    fn set_clock(&mut self, datetime: DateTime) -> Result<(), RtcError>;
}

impl<T: Rtc + ?Sized> Rtc for &mut T {
    fn set_clock(&mut self, datetime: DateTime) -> Result<(), RtcError> {
        (**self).set_clock(datetime)
    }
}
