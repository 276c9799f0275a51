//! Node error type

use sercom_protocol::FrameError;

/// Errors surfaced by one exchange
///
/// Every variant except [`Error::Cancelled`] is recoverable: the periodic
/// driver logs it and tries again on the next cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The transport accepted no bytes (or failed) while sending a request
    SendFailed,
    /// The receive window elapsed without a usable message
    Timeout,
    /// Shutdown was requested
    Cancelled,
    /// A date-time payload did not have the expected shape
    ShapeValidationFailed,
    /// Request code outside the catalog
    UnknownRequestCode,
    /// Encoding or decoding failed
    Frame(FrameError),
}

impl From<FrameError> for Error {
    fn from(e: FrameError) -> Self {
        match e {
            FrameError::UnknownRequestCode => Error::UnknownRequestCode,
            other => Error::Frame(other),
        }
    }
}

impl Error {
    /// Returns true if the caller should stop instead of retrying
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}
