//! Sensor station
//!
//! Waits for requests from Main, acknowledges them and answers with a data
//! frame. The board clock is refreshed from network time on the first
//! date-time request, and again on the first one after each exchange
//! interval has passed.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use embedded_hal_async::delay::DelayNs;

use sercom_hal::{Monotonic, Uart};
use sercom_protocol::{encode_ack, encode_frame, DateTime, RequestCode, MAX_FRAME_SIZE};

use crate::config::NodeConfig;
use crate::driver::Periodic;
use crate::error::Error;
use crate::link::Link;
use crate::producers::produce;
use crate::scanner::{ReceiveScanner, ScanOutcome, ScanTarget};
use crate::session::Session;
use crate::traits::{NetworkTime, Rtc, WallClock};

/// Sensor node: request responder and time source
pub struct SensorNode<U, C, D, K, T> {
    config: NodeConfig,
    link: Link<U, C, D>,
    clock: K,
    network: T,
    session: Session,
    scanner: ReceiveScanner<MAX_FRAME_SIZE>,
    resync: Periodic,
}

impl<U, C, D, K, T> SensorNode<U, C, D, K, T>
where
    U: Uart,
    C: Monotonic,
    D: DelayNs,
    K: WallClock + Rtc,
    T: NetworkTime,
{
    pub fn new(config: NodeConfig, link: Link<U, C, D>, clock: K, network: T) -> Self {
        let scanner = ReceiveScanner::new(&config);
        let resync = Periodic::starting_after(link.now(), config.timing.exchange_interval());
        Self {
            config,
            link,
            clock,
            network,
            session: Session::new(),
            scanner,
            resync,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn scanner(&self) -> &ReceiveScanner<MAX_FRAME_SIZE> {
        &self.scanner
    }

    pub fn link(&self) -> &Link<U, C, D> {
        &self.link
    }

    pub fn clock(&self) -> &K {
        &self.clock
    }

    pub fn network(&self) -> &T {
        &self.network
    }

    /// Set the board clock from network time
    ///
    /// Returns true if the clock was set.
    pub fn refresh_time(&mut self) -> bool {
        let Some(utc) = self.network.fetch_unix_time() else {
            debug!("network time unavailable");
            return false;
        };
        let Some(datetime) = DateTime::from_unix(utc) else {
            warn!("network time {} out of range", utc);
            return false;
        };
        match self.clock.set_clock(datetime) {
            Ok(()) => {
                self.session.rtc_synced = true;
                info!("clock synced from network: {}", utc);
                true
            }
            Err(e) => {
                warn!("clock update failed: {:?}", e);
                false
            }
        }
    }

    /// Wait for one request and answer it
    ///
    /// Returns the request served. Weather requests are acknowledged but
    /// get no data frame.
    pub async fn serve_one<M: RawMutex>(
        &mut self,
        cancel: &Signal<M, ()>,
    ) -> Result<RequestCode, Error> {
        let target = ScanTarget::Request {
            own: self.config.own_address,
        };
        let request = match self
            .scanner
            .scan(&mut self.link, &mut self.session, target, cancel)
            .await
        {
            ScanOutcome::Request(request) => request,
            ScanOutcome::Cancelled => return Err(Error::Cancelled),
            ScanOutcome::Timeout | ScanOutcome::Frame(_) => return Err(Error::Timeout),
        };
        let code = request.code;
        self.session.last_request_received = Some(code);
        if self.resync.poll(self.link.now()) {
            debug!("network refresh re-armed");
            self.session.rtc_synced = false;
        }

        if self.link.send(&encode_ack(self.config.peer_address)).is_err() {
            warn!("ACK for {} not sent", code.name());
        }
        self.link.clear_input();
        self.link.sleep(self.config.timing.ack_to_data()).await;

        if code == RequestCode::DateTime && !self.session.rtc_synced {
            self.refresh_time();
        }

        let Some(payload) = produce(code, &self.clock, &self.config.time_zone) else {
            info!("no payload for {}", code.name());
            return Ok(code);
        };
        let frame = encode_frame(self.config.peer_address, &payload)?;
        self.link.send(&frame)?;
        info!("sent {}: {}", code.name(), payload.as_str());
        Ok(code)
    }

    /// Serve requests until cancelled
    ///
    /// Uptime is logged from the link's sleeps, so it stays on its grid
    /// while a scan window is open.
    pub async fn run<M: RawMutex>(&mut self, cancel: &Signal<M, ()>) {
        info!("sensor node {:#x} started", self.config.own_address.to_byte());

        loop {
            if cancel.signaled() {
                break;
            }

            match self.serve_one(cancel).await {
                Ok(_) => {}
                Err(Error::Cancelled) => break,
                Err(Error::Timeout) => debug!("no request this window"),
                Err(e) => warn!("serving request failed: {:?}", e),
            }
        }
        info!("sensor node stopped");
    }
}
