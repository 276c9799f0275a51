//! Main station
//!
//! Asks the Sensor for the date and time, keeps the real-time clock in
//! step with the answer and shows hours and minutes on the clock face.
//! Between exchanges the clock face follows the RTC, so the display keeps
//! running when the Sensor stops answering.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use embedded_hal_async::delay::DelayNs;

use sercom_hal::{Monotonic, Uart};
use sercom_protocol::{encode_request, DateTime, RequestCode, MAX_FRAME_SIZE};

use crate::clock_face::ClockFace;
use crate::config::NodeConfig;
use crate::driver::Periodic;
use crate::error::Error;
use crate::link::Link;
use crate::scanner::{ReceiveScanner, ScanOutcome, ScanTarget};
use crate::session::Session;
use crate::traits::{ClockDisplay, Rtc, WallClock};

/// Main node: request initiator
pub struct MainNode<U, C, D, R, V> {
    config: NodeConfig,
    link: Link<U, C, D>,
    rtc: R,
    display: V,
    session: Session,
    scanner: ReceiveScanner<MAX_FRAME_SIZE>,
    clock_face: ClockFace,
}

impl<U, C, D, R, V> MainNode<U, C, D, R, V>
where
    U: Uart,
    C: Monotonic,
    D: DelayNs,
    R: Rtc + WallClock,
    V: ClockDisplay,
{
    pub fn new(config: NodeConfig, link: Link<U, C, D>, rtc: R, display: V) -> Self {
        let scanner = ReceiveScanner::new(&config);
        Self {
            config,
            link,
            rtc,
            display,
            session: Session::new(),
            scanner,
            clock_face: ClockFace::new(),
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

    pub fn rtc(&self) -> &R {
        &self.rtc
    }

    pub fn display(&self) -> &V {
        &self.display
    }

    /// Run one request / acknowledge / data exchange
    ///
    /// The received payload is kept in the session. For a date-time
    /// request it is also written to the RTC and the clock face.
    pub async fn exchange<M: RawMutex>(
        &mut self,
        code: RequestCode,
        cancel: &Signal<M, ()>,
    ) -> Result<(), Error> {
        let request = encode_request(self.config.peer_address, code)?;
        self.link.send(&request)?;
        self.session.last_request_sent = Some(code);
        info!("request {} sent to {:#x}", code.name(), self.config.peer_address.to_byte());

        let target = ScanTarget::Response {
            own: self.config.own_address,
            request: code,
        };
        let frame = match self
            .scanner
            .scan(&mut self.link, &mut self.session, target, cancel)
            .await
        {
            ScanOutcome::Frame(frame) => frame,
            ScanOutcome::Cancelled => return Err(Error::Cancelled),
            ScanOutcome::Timeout | ScanOutcome::Request(_) => {
                info!("no answer to {}", code.name());
                return Err(Error::Timeout);
            }
        };

        if !self.session.store_payload(&frame.payload) {
            warn!("payload is not text");
            return Err(Error::ShapeValidationFailed);
        }
        info!("payload received: {}", self.session.current_payload.as_str());

        if code == RequestCode::DateTime {
            let Some(datetime) = DateTime::parse(&self.session.current_payload) else {
                warn!("payload is not a valid date-time");
                return Err(Error::ShapeValidationFailed);
            };
            self.apply_date_time(&datetime);
        }
        Ok(())
    }

    fn apply_date_time(&mut self, datetime: &DateTime) {
        match self.rtc.set_clock(*datetime) {
            Ok(()) => {
                self.session.rtc_synced = true;
                debug!("RTC set");
            }
            Err(e) => warn!("RTC update failed: {:?}", e),
        }
        self.show(datetime);
    }

    /// Redraw the clock face from the RTC
    ///
    /// Nothing is drawn until the RTC has been set once, so an unset board
    /// clock never reaches the display.
    fn show_rtc_time(&mut self) {
        if !self.session.rtc_synced {
            return;
        }
        match DateTime::from_unix(self.rtc.unix_time()) {
            Some(datetime) => self.show(&datetime),
            None => warn!("RTC reading out of range"),
        }
    }

    fn show(&mut self, datetime: &DateTime) {
        match self.clock_face.update(&mut self.display, datetime) {
            Ok(true) => debug!("display {}:{}", datetime.hour, datetime.minute),
            Ok(false) => {}
            Err(e) => warn!("display update failed: {:?}", e),
        }
    }

    /// Exchange date-time on the configured interval until cancelled
    ///
    /// Failed exchanges are logged and retried on the next interval. On
    /// every tick in between, the clock face is redrawn from the RTC when
    /// its hour or minute changed.
    pub async fn run<M: RawMutex>(&mut self, cancel: &Signal<M, ()>) {
        let start = self.link.now();
        let mut exchanges = Periodic::starting_now(start, self.config.timing.exchange_interval());
        info!("main node {:#x} started", self.config.own_address.to_byte());

        loop {
            if cancel.signaled() {
                break;
            }
            if exchanges.poll(self.link.now()) {
                match self.exchange(RequestCode::DateTime, cancel).await {
                    Ok(()) => {}
                    Err(Error::Cancelled) => break,
                    Err(e) => warn!("exchange failed: {:?}", e),
                }
                continue;
            }

            self.show_rtc_time();
            self.link.sleep(self.config.timing.tick()).await;
        }
        info!("main node stopped");
    }
}
