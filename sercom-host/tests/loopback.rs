//! Main and Sensor talking over an in-memory serial link

use embassy_futures::block_on;
use embassy_futures::join::join;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::signal::Signal;
use embedded_hal_async::delay::DelayNs;

use sercom_core::config::NodeConfig;
use sercom_core::traits::NetworkTime;
use sercom_core::{Error, Link, MainNode, ScanPhase, SensorNode};
use sercom_hal::{UartConfig, UartRx, UartTx};
use sercom_host::{loopback_pair, MemoryDisplay, SimClock, SoftRtc};
use sercom_protocol::{DateTime, RequestCode, STX};

const UNIX: u64 = 1_665_018_900;
const DT: &str = "2022-10-06 01:15:00";

struct FixedNetwork(u64);

impl NetworkTime for FixedNetwork {
    fn fetch_unix_time(&mut self) -> Option<u64> {
        Some(self.0)
    }
}

#[test]
fn test_date_time_exchange_end_to_end() {
    let clock = SimClock::new();
    let (main_port, sensor_port) = loopback_pair(UartConfig::default(), clock.clone());
    let cancel = Signal::<NoopRawMutex, ()>::new();
    let cancel = &cancel;

    let mut main = MainNode::new(
        NodeConfig::main(),
        Link::new(main_port, clock.clone(), clock.delay()),
        SoftRtc::new(clock.clone(), 0),
        MemoryDisplay::default(),
    );
    let mut sensor = SensorNode::new(
        NodeConfig::sensor(),
        Link::new(sensor_port, clock.clone(), clock.delay()),
        SoftRtc::new(clock.clone(), 0),
        FixedNetwork(UNIX),
    );

    let (main_side, sensor_sent) = block_on(join(
        async move {
            let result = main.exchange(RequestCode::DateTime, cancel).await;
            cancel.signal(());
            let session = main.session().clone();
            let trace = main.scanner().trace().to_vec();
            let sent = main.link().uart().sent().to_vec();
            let rtc = main.rtc().date_time();
            let display = main.display().updates.clone();
            (result, session, trace, sent, rtc, display)
        },
        async move {
            sensor.run(cancel).await;
            sensor.link().uart().sent().to_vec()
        },
    ));
    let (result, session, trace, main_sent, rtc, display) = main_side;

    assert_eq!(result, Ok(()));
    assert_eq!(main_sent, [vec![0x25, 100]]);

    let mut frame = vec![0x20, 19, STX];
    frame.extend_from_slice(DT.as_bytes());
    assert_eq!(sensor_sent, [vec![0x20, 0x06], frame]);

    assert_eq!(session.current_payload.as_str(), DT);
    assert!(session.ack_received);
    assert!(session.rtc_synced);
    assert_eq!(
        trace,
        [
            ScanPhase::Polling,
            ScanPhase::AckPending,
            ScanPhase::FramePending,
            ScanPhase::Done
        ]
    );
    assert_eq!(rtc, DateTime::parse(DT));
    assert_eq!(display, [(1, 15)]);
}

#[test]
fn test_unix_time_exchange_end_to_end() {
    let clock = SimClock::new();
    let (main_port, sensor_port) = loopback_pair(UartConfig::default(), clock.clone());
    let cancel = Signal::<NoopRawMutex, ()>::new();
    let cancel = &cancel;

    let mut main = MainNode::new(
        NodeConfig::main(),
        Link::new(main_port, clock.clone(), clock.delay()),
        SoftRtc::new(clock.clone(), 0),
        MemoryDisplay::default(),
    );
    let mut sensor = SensorNode::new(
        NodeConfig::sensor(),
        Link::new(sensor_port, clock.clone(), clock.delay()),
        SoftRtc::new(clock.clone(), UNIX),
        FixedNetwork(0),
    );

    let (payload, served) = block_on(join(
        async move {
            main.exchange(RequestCode::UnixTime, cancel).await.unwrap();
            cancel.signal(());
            main.session().current_payload.clone()
        },
        async move {
            let served = sensor.serve_one(cancel).await;
            drop(sensor);
            served
        },
    ));

    assert_eq!(served, Ok(RequestCode::UnixTime));
    // About 1.2 s passed on the Sensor's clock before it answered
    assert_eq!(payload.as_str(), "1665018901");
}

#[test]
fn test_unknown_code_gets_no_ack() {
    let clock = SimClock::new();
    let (mut peer, sensor_port) = loopback_pair(UartConfig::default(), clock.clone());
    let cancel = Signal::<NoopRawMutex, ()>::new();
    let cancel = &cancel;

    let mut sensor = SensorNode::new(
        NodeConfig::sensor(),
        Link::new(sensor_port, clock.clone(), clock.delay()),
        SoftRtc::new(clock.clone(), UNIX),
        FixedNetwork(UNIX),
    );
    let mut supervisor = clock.delay();

    assert_eq!(peer.write(&[0x25, 250]), Ok(2));

    let (trace, sensor_sent) = block_on(join(
        async move {
            sensor.run(cancel).await;
            (
                sensor.scanner().trace().to_vec(),
                sensor.link().uart().sent().to_vec(),
            )
        },
        async move {
            supervisor.delay_ms(3_000).await;
            cancel.signal(());
            drop(supervisor);
        },
    ))
    .0;

    assert!(sensor_sent.is_empty());
    assert_eq!(trace, [ScanPhase::Polling]);
    let mut buf = [0u8; 8];
    assert_eq!(peer.read_available(&mut buf), Ok(0));
}

#[test]
fn test_silent_peer_times_out_within_one_poll() {
    let clock = SimClock::new();
    let (main_port, _silent) = loopback_pair(UartConfig::default(), clock.clone());
    let cancel = Signal::<NoopRawMutex, ()>::new();

    let mut main = MainNode::new(
        NodeConfig::main(),
        Link::new(main_port, clock.clone(), clock.delay()),
        SoftRtc::new(clock.clone(), UNIX),
        MemoryDisplay::default(),
    );

    let result = block_on(main.exchange(RequestCode::DateTime, &cancel));

    assert_eq!(result, Err(Error::Timeout));
    let elapsed = clock.now_ms();
    assert!((20_000..=20_200).contains(&elapsed), "timed out at {} ms", elapsed);
    assert!(main.session().current_payload.is_empty());
    assert!(main.display().updates.is_empty());
}
