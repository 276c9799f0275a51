//! Clock face display trait

/// Errors that can occur while drawing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Display did not respond
    Timeout,
    /// Bus or peripheral failure
    Hardware,
}

/// Hour and minute display
///
/// Only called when the hour or the minute changed; see
/// [`ClockFace`](crate::clock_face::ClockFace).
pub trait ClockDisplay {
    /// Show `hour:minute`
    fn update_display(&mut self, hour: u8, minute: u8) -> Result<(), DisplayError>;
}

impl<T: ClockDisplay + ?Sized> ClockDisplay for &mut T {
    fn update_display(&mut self, hour: u8, minute: u8) -> Result<(), DisplayError> {
        (**self).update_display(hour, minute)
    }
}
