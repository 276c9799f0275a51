//! Edge-triggered clock face
//!
//! Main receives the time every exchange but the display only shows hours
//! and minutes, so it is redrawn only when one of them changes.

use sercom_protocol::DateTime;

use crate::traits::{ClockDisplay, DisplayError};

/// Tracks what the display currently shows
#[derive(Debug, Default)]
pub struct ClockFace {
    shown: Option<(u8, u8)>,
}

impl ClockFace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hour and minute on the display, if anything was drawn yet
    pub fn shown(&self) -> Option<(u8, u8)> {
        self.shown
    }

    /// Redraw if `datetime` shows a different hour or minute
    ///
    /// Returns whether the display was updated. A failed update is retried
    /// on the next call.
    pub fn update<D: ClockDisplay>(
        &mut self,
        display: &mut D,
        datetime: &DateTime,
    ) -> Result<bool, DisplayError> {
        let next = (datetime.hour, datetime.minute);
        if self.shown == Some(next) {
            return Ok(false);
        }
        display.update_display(next.0, next.1)?;
        self.shown = Some(next);
        Ok(true)
    }
}
