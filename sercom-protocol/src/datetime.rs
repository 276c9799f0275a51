//! Date-time payload text
//!
//! The Sensor sends the time as `YYYY-MM-DD HH:MM:SS` (19 ASCII bytes).
//! Receivers first run the cheap [`validate_datetime_shape`] check, which
//! only looks at separator positions, and only then parse the fields.

use core::fmt::{self, Write};

use chrono::{DateTime as UtcDateTime, Datelike, NaiveDate, NaiveDateTime, Timelike, Utc};
use heapless::String;

/// Length of `YYYY-MM-DD HH:MM:SS`
pub const DATETIME_LEN: usize = 19;

/// Shortest string the shape check accepts
pub const DATETIME_MIN_LEN: usize = 16;

/// Last year that fits the four-digit year field
pub const MAX_YEAR: u16 = 9999;

const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Loose structural check for a date-time payload
///
/// Accepts any string of at least 16 characters with `':'` at the 3rd and
/// 6th position from the end and `'-'` at the 12th and 15th. Calendar
/// values are not checked: `"9999-99-99 99:99:99"` passes.
pub fn validate_datetime_shape(s: &str) -> bool {
    let bytes = s.as_bytes();
    let len = bytes.len();
    if len < DATETIME_MIN_LEN {
        return false;
    }
    let from_end = |offset: usize| bytes[len - offset];
    from_end(3) == b':' && from_end(6) == b':' && from_end(12) == b'-' && from_end(15) == b'-'
}

/// Calendar date and time (UTC unless stated otherwise)
///
/// Values built by [`DateTime::parse`] and [`DateTime::from_unix`] always
/// lie between year 0 and [`MAX_YEAR`], so they render in exactly
/// [`DATETIME_LEN`] bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTime {
    /// Parse `YYYY-MM-DD HH:MM:SS`
    ///
    /// Unlike the shape check this requires exact length, digits in every
    /// field and values that form a real calendar date.
    pub fn parse(s: &str) -> Option<Self> {
        if s.len() != DATETIME_LEN || !validate_datetime_shape(s) {
            return None;
        }
        let all_digits = s
            .bytes()
            .enumerate()
            .all(|(i, b)| matches!(i, 4 | 7 | 10 | 13 | 16) || b.is_ascii_digit());
        if !all_digits {
            return None;
        }
        NaiveDateTime::parse_from_str(s, FORMAT)
            .ok()
            .and_then(Self::from_naive)
    }

    /// Check that all fields are within calendar range
    pub fn is_valid(&self) -> bool {
        self.year <= MAX_YEAR && self.to_naive().is_some()
    }

    /// Build from seconds since 1970-01-01 00:00:00
    ///
    /// `None` past 9999-12-31 23:59:59, which has no four-digit year.
    pub fn from_unix(secs: u64) -> Option<Self> {
        let secs = i64::try_from(secs).ok()?;
        UtcDateTime::<Utc>::from_timestamp(secs, 0)
            .map(|dt| dt.naive_utc())
            .and_then(Self::from_naive)
    }

    /// Seconds since the unix epoch
    ///
    /// `None` for invalid dates and dates before 1970.
    pub fn to_unix(&self) -> Option<u64> {
        if !self.is_valid() {
            return None;
        }
        u64::try_from(self.to_naive()?.and_utc().timestamp()).ok()
    }

    /// The same instant as a chrono value
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year.into(), self.month.into(), self.day.into())?.and_hms_opt(
            self.hour.into(),
            self.minute.into(),
            self.second.into(),
        )
    }

    /// Convert a chrono value, dropping any fraction of a second
    ///
    /// `None` outside years 0 to 9999 and for leap seconds.
    pub fn from_naive(ndt: NaiveDateTime) -> Option<Self> {
        if ndt.nanosecond() >= 1_000_000_000 {
            return None;
        }
        let year = u16::try_from(ndt.year()).ok().filter(|&y| y <= MAX_YEAR)?;
        Some(Self {
            year,
            month: ndt.month() as u8,
            day: ndt.day() as u8,
            hour: ndt.hour() as u8,
            minute: ndt.minute() as u8,
            second: ndt.second() as u8,
        })
    }

    /// Render as `YYYY-MM-DD HH:MM:SS`
    pub fn format(&self) -> String<DATETIME_LEN> {
        let mut out = String::new();
        // Cannot overflow for years up to MAX_YEAR
        let _ = write!(out, "{}", self);
        out
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}
