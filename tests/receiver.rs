//! Integration tests against a scripted mock receiver.
//!
//! Each test binds a listener on an ephemeral localhost port, connects a
//! client to it, and plays the device side of the conversation by hand:
//! asserting the bytes the client writes and pushing status lines back.

use pioneer_vsx::{
    ConnectionStatus, EventReceiver, VsxClient, VsxError, VsxEvent, Zone, DEFAULT_INPUT_NAMES,
};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

const TEST_TIMEOUT: Duration = Duration::from_secs(2);

/// Bind a mock device, connect a client to it, and return both ends.
async fn connect_pair() -> (VsxClient, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (client, accepted) = tokio::join!(VsxClient::connect("127.0.0.1", port), async {
        listener.accept().await.unwrap()
    });
    (client.unwrap(), accepted.0)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

/// Read from the device side until the collected bytes contain `needle`.
async fn read_until_contains(device: &mut TcpStream, received: &mut Vec<u8>, needle: &[u8]) {
    while !contains(received, needle) {
        let mut buf = [0u8; 256];
        let n = timeout(TEST_TIMEOUT, device.read(&mut buf))
            .await
            .unwrap_or_else(|_| panic!("timed out waiting for {:?}", String::from_utf8_lossy(needle)))
            .unwrap();
        assert!(n > 0, "device connection closed early");
        received.extend_from_slice(&buf[..n]);
    }
}

/// Receive events until one satisfies the predicate, skipping the rest
/// (the `connect` event interleaves freely with dispatch under test).
async fn next_matching<F>(events: &mut EventReceiver, pred: F) -> VsxEvent
where
    F: Fn(&VsxEvent) -> bool,
{
    loop {
        let event = timeout(TEST_TIMEOUT, events.recv())
            .await
            .expect("timed out waiting for event")
            .unwrap();
        if pred(&event) {
            return event;
        }
    }
}

fn not_connect(event: &VsxEvent) -> bool {
    !matches!(event, VsxEvent::Connect)
}

#[tokio::test]
async fn wake_byte_then_staggered_status_queries() {
    let (client, mut device) = connect_pair().await;

    let mut received = Vec::new();
    read_until_contains(&mut device, &mut received, b"\r").await;
    assert_eq!(received[0], b'\r', "wake byte must come first");

    // The burst begins after the settle delay, one query per stagger tick,
    // in submission order.
    read_until_contains(&mut device, &mut received, b"?BP\r").await;
    let text = String::from_utf8_lossy(&received).into_owned();
    let p = text.find("?P\r").unwrap();
    let ap = text.find("?AP\r").unwrap();
    let bp = text.find("?BP\r").unwrap();
    assert!(p < ap && ap < bp, "queries out of order: {:?}", text);

    drop(client);
}

#[tokio::test]
async fn connect_event_signals_readiness() {
    let (client, _device) = connect_pair().await;
    let mut events = client.subscribe();
    let event = timeout(TEST_TIMEOUT, events.recv()).await.unwrap().unwrap();
    assert!(matches!(event, VsxEvent::Connect));
    assert_eq!(client.status(), ConnectionStatus::Connected);
}

#[tokio::test]
async fn change_input_writes_select_then_query() {
    let (client, mut device) = connect_pair().await;

    client.change_input(20u8).unwrap();

    let mut received = Vec::new();
    read_until_contains(&mut device, &mut received, b"?F\r").await;
    assert!(
        contains(&received, b"20FN\r?F\r"),
        "expected select immediately followed by query, got {:?}",
        String::from_utf8_lossy(&received)
    );
    drop(client);
}

#[tokio::test]
async fn input_arguments_are_normalized_or_rejected() {
    let (client, mut device) = connect_pair().await;

    client.change_input("5").unwrap();
    let mut received = Vec::new();
    read_until_contains(&mut device, &mut received, b"05FN\r").await;

    client.change_zone_input(4u8).unwrap();
    read_until_contains(&mut device, &mut received, b"04ZS\r").await;

    assert!(matches!(
        client.change_input("abc"),
        Err(VsxError::InvalidInputId(_))
    ));
    assert!(matches!(
        client.change_input("123"),
        Err(VsxError::InvalidInputId(_))
    ));
    assert!(matches!(
        client.mute(true, Zone::Zone4),
        Err(VsxError::UnsupportedZone { .. })
    ));
}

#[tokio::test]
async fn one_chunk_with_two_lines_dispatches_in_order() {
    let (client, mut device) = connect_pair().await;
    let mut events = client.subscribe();

    device.write_all(b"PWR0\r\nVOL161\r\n").await.unwrap();

    let first = next_matching(&mut events, not_connect).await;
    match first {
        VsxEvent::Power { on, zone } => {
            assert!(on);
            assert_eq!(zone, Zone::Main);
        }
        other => panic!("expected power event first, got {:?}", other),
    }

    let second = next_matching(&mut events, not_connect).await;
    match second {
        VsxEvent::Volume { db, zone } => {
            assert_eq!(db, 0.0);
            assert_eq!(zone, Zone::Main);
        }
        other => panic!("expected volume event second, got {:?}", other),
    }
}

#[tokio::test]
async fn secondary_zone_volume_uses_its_own_scale() {
    let (client, mut device) = connect_pair().await;
    let mut events = client.subscribe();

    device.write_all(b"ZV81\r\nPWR1\r\n").await.unwrap();

    let event = next_matching(&mut events, not_connect).await;
    match event {
        VsxEvent::Volume { db, zone } => {
            assert_eq!(db, 0.0);
            assert_eq!(zone, Zone::Zone2);
        }
        other => panic!("expected zone 2 volume event, got {:?}", other),
    }

    let event = next_matching(&mut events, not_connect).await;
    assert!(matches!(
        event,
        VsxEvent::Power {
            on: false,
            zone: Zone::Main
        }
    ));
}

#[tokio::test]
async fn set_mode_report_triggers_display_query_not_state() {
    let (client, mut device) = connect_pair().await;
    let mut events = client.subscribe();

    device.write_all(b"SR0101\r\n").await.unwrap();

    let event = next_matching(&mut events, not_connect).await;
    match event {
        VsxEvent::ListeningModeSet { mode } => assert_eq!(mode, "0101"),
        other => panic!("expected set-mode event, got {:?}", other),
    }

    // The follow-up display query is written immediately, well before the
    // initial burst would reach its own ?L.
    let mut received = Vec::new();
    read_until_contains(&mut device, &mut received, b"?L\r").await;

    // Only the LM line carries authoritative state.
    device.write_all(b"LM0401\r\n").await.unwrap();
    let event = next_matching(&mut events, |e| {
        matches!(e, VsxEvent::ListeningModeDisplay { .. })
    })
    .await;
    match event {
        VsxEvent::ListeningModeDisplay { mode } => assert_eq!(mode, "0401"),
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn name_report_updates_table_and_refreshes_selected_input() {
    let (client, mut device) = connect_pair().await;
    let mut events = client.subscribe();

    // Main zone selects input 01; default table names it CD.
    device.write_all(b"FN01\r\n").await.unwrap();
    let event = next_matching(&mut events, not_connect).await;
    match event {
        VsxEvent::Input { id, name, zone } => {
            assert_eq!(id, "01");
            assert_eq!(name.as_deref(), Some("CD"));
            assert_eq!(zone, Zone::Main);
        }
        other => panic!("expected input event, got {:?}", other),
    }
    assert_eq!(client.selected_input(Zone::Main).as_deref(), Some("01"));

    // Device reports a custom name for the selected input.
    device.write_all(b"RGB01Tuner\r\n").await.unwrap();
    let event = next_matching(&mut events, not_connect).await;
    match event {
        VsxEvent::InputName { id, name } => {
            assert_eq!(id, "01");
            assert_eq!(name, "Tuner");
        }
        other => panic!("expected input-name event, got {:?}", other),
    }
    // The selected input is re-emitted with the refreshed name.
    let event = next_matching(&mut events, not_connect).await;
    match event {
        VsxEvent::Input { id, name, zone } => {
            assert_eq!(id, "01");
            assert_eq!(name.as_deref(), Some("Tuner"));
            assert_eq!(zone, Zone::Main);
        }
        other => panic!("expected refreshed input event, got {:?}", other),
    }
    assert_eq!(client.input_name("01").as_deref(), Some("Tuner"));

    // An identical report still emits the event; the stored value stands.
    device.write_all(b"RGB01Tuner\r\n").await.unwrap();
    let event = next_matching(&mut events, not_connect).await;
    assert!(matches!(event, VsxEvent::InputName { .. }));
    assert_eq!(client.input_name("01").as_deref(), Some("Tuner"));
}

#[tokio::test]
async fn unclassified_lines_are_ignored_not_fatal() {
    let (client, mut device) = connect_pair().await;
    let mut events = client.subscribe();

    device
        .write_all(b"FL020ABCDEF\r\nE04\r\n\r\nPWR0\r\n")
        .await
        .unwrap();

    // Only the power line produces an event; the session stays healthy.
    let event = next_matching(&mut events, not_connect).await;
    assert!(matches!(event, VsxEvent::Power { on: true, .. }));
    assert_eq!(client.status(), ConnectionStatus::Connected);
}

#[tokio::test]
async fn peer_close_ends_the_session() {
    let (client, device) = connect_pair().await;
    let mut events = client.subscribe();

    drop(device);

    let event = next_matching(&mut events, not_connect).await;
    assert!(matches!(event, VsxEvent::End));
    assert_eq!(client.status(), ConnectionStatus::Ended);

    // The session is terminal: commands fail locally, nothing reconnects.
    assert!(matches!(
        client.power(true, Zone::Main),
        Err(VsxError::ConnectionClosed)
    ));
}

#[tokio::test]
async fn connect_refused_is_returned_to_the_caller() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let result = VsxClient::connect("127.0.0.1", port).await;
    assert!(matches!(result, Err(VsxError::Io(_))));
}

#[tokio::test]
async fn query_burst_spans_one_tick_per_command() {
    let (client, _device) = connect_pair().await;
    let commands = 16 + DEFAULT_INPUT_NAMES.len() as u32;
    let expected = Duration::from_millis(100) * (commands + 1);
    assert_eq!(client.query(), expected);
}

#[tokio::test]
async fn events_serialize_for_bridge_republishing() {
    let (client, mut device) = connect_pair().await;
    let mut events = client.subscribe();

    device.write_all(b"MUT0\r\n").await.unwrap();
    let event = next_matching(&mut events, not_connect).await;
    assert_eq!(
        serde_json::to_string(&event).unwrap(),
        r#"{"event":"mute","on":true,"zone":"main"}"#
    );
}
