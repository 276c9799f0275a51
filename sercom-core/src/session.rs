//! Per-node exchange state
//!
//! A [`Session`] is owned by the node object. Scan flags are reset at the
//! start of every scan; the decoded payload survives until the next
//! successful decode replaces it.

use heapless::String;

use sercom_protocol::{RequestCode, MAX_PAYLOAD_SIZE};

/// Exchange bookkeeping for one node
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Session {
    /// Last request this node transmitted (Main)
    pub last_request_sent: Option<RequestCode>,
    /// Last request this node accepted (Sensor)
    pub last_request_received: Option<RequestCode>,
    /// An ACK arrived during the current scan
    pub ack_received: bool,
    /// Index of the STX byte in the last decoded buffer
    pub stx_index: Option<usize>,
    /// Most recent payload text
    pub current_payload: String<MAX_PAYLOAD_SIZE>,
    /// The real-time clock has been set from a trusted source
    pub rtc_synced: bool,
}

impl Session {
    /// Fresh session with nothing received yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the flags that only hold for one scan
    pub fn begin_scan(&mut self) {
        self.ack_received = false;
        self.stx_index = None;
    }

    /// True once a marker has been located in the current scan
    pub fn stx_located(&self) -> bool {
        self.stx_index.is_some()
    }

    /// Replace the stored payload
    ///
    /// Bytes that are not valid UTF-8 are not stored and `false` is returned.
    pub fn store_payload(&mut self, payload: &[u8]) -> bool {
        let Ok(text) = core::str::from_utf8(payload) else {
            return false;
        };
        self.current_payload.clear();
        // Payloads are bounded by MAX_PAYLOAD_SIZE, same as the string
        self.current_payload.push_str(text).is_ok()
    }
}
