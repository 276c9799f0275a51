//! Receive scanner
//!
//! Polls the link until a usable message arrives, the receive window runs
//! out, or shutdown is requested. One scan walks through these phases:
//!
//! ```text
//!   Idle ──► Polling ──► AckPending ──► FramePending ──► Done
//!               ▲            │
//!               └────────────┘  (two bytes that were not an ACK)
//! ```
//!
//! Bytes accumulate across polls while a frame is still arriving. A frame
//! that stops growing for one poll interval is dropped, as is anything the
//! frame codec rejects outright, so a garbled transmission never blocks
//! the next one.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Duration;
use embedded_hal_async::delay::DelayNs;
use heapless::Vec;

use sercom_hal::{Monotonic, Uart};
use sercom_protocol::{
    decode_at, locate_marker, validate_datetime_shape, Address, AckMessage, Frame, FrameError,
    MarkerPolicy, RequestCode, RequestMessage, FRAME_HEADER_SIZE, MESSAGE_SIZE,
};

use crate::config::NodeConfig;
use crate::link::Link;
use crate::session::Session;

/// Number of phases kept in the scan trace
pub const TRACE_LEN: usize = 8;

/// Scanner phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanPhase {
    /// Not scanning
    Idle,
    /// Waiting for any bytes
    Polling,
    /// Two bytes arrived that may be an acknowledge
    AckPending,
    /// Acknowledge seen, waiting for the data frame
    FramePending,
    /// A usable message was received
    Done,
}

/// What a scan is waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanTarget {
    /// A two-byte request addressed to `own` (Sensor)
    Request { own: Address },
    /// ACK and data frame answering `request` (Main)
    Response { own: Address, request: RequestCode },
}

/// Result of one scan
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanOutcome {
    /// A catalog request addressed to this node
    Request(RequestMessage),
    /// A data frame addressed to this node
    Frame(Frame),
    /// The receive window elapsed
    Timeout,
    /// Shutdown was requested
    Cancelled,
}

/// Polling receiver with a fixed-size buffer
pub struct ReceiveScanner<const N: usize> {
    buffer: Vec<u8, N>,
    phase: ScanPhase,
    trace: Vec<ScanPhase, TRACE_LEN>,
    policy: MarkerPolicy,
    read_limit: usize,
    window: Duration,
    poll_interval: Duration,
}

impl<const N: usize> ReceiveScanner<N> {
    /// Create a scanner using the window, poll interval, marker policy and
    /// receive capacity of `config`
    pub fn new(config: &NodeConfig) -> Self {
        Self {
            buffer: Vec::new(),
            phase: ScanPhase::Idle,
            trace: Vec::new(),
            policy: config.marker_policy,
            read_limit: (config.serial.rx_capacity as usize).min(N),
            window: config.timing.scan_window(),
            poll_interval: config.timing.poll_interval(),
        }
    }

    /// Current phase
    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    /// Phases visited by the last scan, oldest first
    ///
    /// Only the most recent [`TRACE_LEN`] entries are kept.
    pub fn trace(&self) -> &[ScanPhase] {
        &self.trace
    }

    /// Receive window of one scan
    pub fn window(&self) -> Duration {
        self.window
    }

    fn enter(&mut self, phase: ScanPhase) {
        if self.phase == phase {
            return;
        }
        self.phase = phase;
        if self.trace.is_full() {
            self.trace.remove(0);
        }
        // Room was made above
        let _ = self.trace.push(phase);
    }

    /// Run one scan
    pub async fn scan<U, C, D, M>(
        &mut self,
        link: &mut Link<U, C, D>,
        session: &mut Session,
        target: ScanTarget,
        cancel: &Signal<M, ()>,
    ) -> ScanOutcome
    where
        U: Uart,
        C: Monotonic,
        D: DelayNs,
        M: RawMutex,
    {
        self.buffer.clear();
        self.trace.clear();
        self.phase = ScanPhase::Idle;
        session.begin_scan();

        let deadline = link.now() + self.window;
        self.enter(ScanPhase::Polling);

        let outcome = loop {
            if cancel.signaled() {
                info!("scan cancelled");
                break ScanOutcome::Cancelled;
            }
            if link.now() > deadline {
                debug!("scan timed out in {:?}", self.phase);
                break ScanOutcome::Timeout;
            }

            if let Some(outcome) = self.poll_once(link, session, target) {
                break outcome;
            }

            link.sleep(self.poll_interval).await;
        };

        if matches!(outcome, ScanOutcome::Request(_) | ScanOutcome::Frame(_)) {
            self.enter(ScanPhase::Done);
        } else {
            self.phase = ScanPhase::Idle;
        }
        outcome
    }

    fn poll_once<U, C, D>(
        &mut self,
        link: &mut Link<U, C, D>,
        session: &mut Session,
        target: ScanTarget,
    ) -> Option<ScanOutcome>
    where
        U: Uart,
        C: Monotonic,
        D: DelayNs,
    {
        let room = match target {
            ScanTarget::Request { .. } => MESSAGE_SIZE.saturating_sub(self.buffer.len()),
            ScanTarget::Response { .. } => (N - self.buffer.len()).min(self.read_limit),
        };
        if room == 0 {
            warn!("receive buffer full, dropping {} bytes", self.buffer.len());
            self.buffer.clear();
            return None;
        }

        let mut chunk = [0u8; N];
        let n = link.read_available(&mut chunk[..room]);
        if n == 0 {
            if !self.buffer.is_empty() {
                debug!("dropping {} stale bytes", self.buffer.len());
                self.buffer.clear();
            }
            return None;
        }

        let fresh = self.buffer.is_empty();
        // room never exceeds the free capacity
        let _ = self.buffer.extend_from_slice(&chunk[..n]);

        match target {
            ScanTarget::Request { own } => self.check_request(own),
            ScanTarget::Response { own, request } => {
                if fresh && n == MESSAGE_SIZE && !session.ack_received {
                    self.check_ack(link, session);
                    None
                } else {
                    self.check_frame(session, own, request)
                }
            }
        }
    }

    fn check_request(&mut self, own: Address) -> Option<ScanOutcome> {
        if self.buffer.len() < MESSAGE_SIZE {
            return None;
        }
        let msg = RequestMessage::parse(&self.buffer);
        self.buffer.clear();

        match msg {
            Some(msg) if msg.dest != own => {
                debug!("request for {:#x} ignored", msg.dest.to_byte());
                None
            }
            Some(msg) if !msg.code.is_known() => {
                warn!("unknown request code {}", msg.code.to_byte());
                None
            }
            Some(msg) => {
                info!("request received: {}", msg.code.name());
                Some(ScanOutcome::Request(msg))
            }
            None => None,
        }
    }

    fn check_ack<U, C, D>(&mut self, link: &mut Link<U, C, D>, session: &mut Session)
    where
        U: Uart,
        C: Monotonic,
        D: DelayNs,
    {
        self.enter(ScanPhase::AckPending);
        if AckMessage::parse(&self.buffer).is_some() {
            info!("ACK received");
            session.ack_received = true;
            self.enter(ScanPhase::FramePending);
        } else {
            debug!("two bytes without ACK: {:?}", self.buffer.as_slice());
            self.enter(ScanPhase::Polling);
        }
        self.buffer.clear();
        link.clear_input();
    }

    fn check_frame(
        &mut self,
        session: &mut Session,
        own: Address,
        request: RequestCode,
    ) -> Option<ScanOutcome> {
        match self.decode(session) {
            Ok(frame) => {
                self.buffer.clear();
                self.accept_frame(frame, own, request)
            }
            Err(FrameError::Incomplete | FrameError::TruncatedPayload) => {
                trace!("partial frame, {} bytes so far", self.buffer.len());
                None
            }
            Err(e) => {
                debug!("discarding {} bytes: {:?}", self.buffer.len(), e);
                self.buffer.clear();
                None
            }
        }
    }

    fn decode(&self, session: &mut Session) -> Result<Frame, FrameError> {
        if self.buffer.len() < FRAME_HEADER_SIZE {
            return Err(FrameError::Incomplete);
        }
        let stx_index = locate_marker(&self.buffer, self.policy)?;
        session.stx_index = Some(stx_index);
        decode_at(&self.buffer, stx_index)
    }

    fn accept_frame(
        &mut self,
        frame: Frame,
        own: Address,
        request: RequestCode,
    ) -> Option<ScanOutcome> {
        if frame.dest != own {
            warn!("frame for {:#x} ignored", frame.dest.to_byte());
            return None;
        }
        if frame.payload.len() != frame.declared_len() as usize {
            return None;
        }
        if request == RequestCode::DateTime {
            let shaped = frame.as_str().is_some_and(validate_datetime_shape);
            if !shaped {
                warn!("date-time payload failed shape check");
                return None;
            }
        }
        Some(ScanOutcome::Frame(frame))
    }
}
