//! Sensor payload producers
//!
//! Turn a request code into the text sent back to Main. Only date-time
//! and unix time have producers; weather is accepted but answered with
//! nothing.

use core::fmt::Write;

use heapless::String;

use sercom_protocol::{DateTime, RequestCode, MAX_PAYLOAD_SIZE};

use crate::config::TimeZoneConfig;
use crate::traits::WallClock;

/// Payload text
pub type Payload = String<MAX_PAYLOAD_SIZE>;

/// Shift a UTC unix time by the configured zone offset
///
/// Results before the epoch are clamped to the epoch.
pub fn local_unix_time(utc: u64, tz: &TimeZoneConfig) -> u64 {
    let shifted = utc as i128 + tz.effective_offset_secs() as i128;
    shifted.clamp(0, u64::MAX as i128) as u64
}

/// `YYYY-MM-DD HH:MM:SS` in the configured zone
///
/// `None` when the local time is past year 9999 and has no such text.
pub fn date_time_payload(utc: u64, tz: &TimeZoneConfig) -> Option<Payload> {
    let Some(datetime) = DateTime::from_unix(local_unix_time(utc, tz)) else {
        warn!("clock reading {} out of date-time range", utc);
        return None;
    };
    let mut payload = Payload::new();
    // 19 characters always fit
    let _ = payload.push_str(&datetime.format());
    Some(payload)
}

/// Decimal seconds since the unix epoch (always UTC)
pub fn unix_time_payload(utc: u64) -> Payload {
    let mut payload = Payload::new();
    // At most 20 digits
    let _ = write!(payload, "{}", utc);
    payload
}

/// Produce the answer to `code`
///
/// Returns `None` for codes without a producer and for a date-time the
/// payload cannot express.
pub fn produce<W: WallClock>(code: RequestCode, clock: &W, tz: &TimeZoneConfig) -> Option<Payload> {
    match code {
        RequestCode::DateTime => date_time_payload(clock.unix_time(), tz),
        RequestCode::UnixTime => Some(unix_time_payload(clock.unix_time())),
        RequestCode::Weather | RequestCode::Unknown(_) => None,
    }
}
