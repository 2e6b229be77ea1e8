// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use smartdesk_link::Connector;
use smartdesk_telemetry::LightSensor;
use smartdesk_test_utils::{
    assert_no_element_emitted, assert_stream_ended, test_channel, unwrap_stream, MockConnector,
    MockLightSensor,
};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

#[tokio::test]
async fn test_assert_no_element_emitted() {
    let (_tx, mut stream) = test_channel::<i32>();

    assert_no_element_emitted(&mut stream, 100).await;
}

#[tokio::test]
#[should_panic = "Timeout: No item received within 100 ms"]
async fn test_unwrap_stream_timeout() {
    let (_tx, mut stream) = test_channel::<i32>();

    unwrap_stream(&mut stream, 100).await;
}

#[tokio::test]
#[should_panic = "Expected element but stream ended"]
async fn test_unwrap_stream_empty() {
    let (tx, mut stream) = test_channel::<i32>();
    drop(tx);

    unwrap_stream(&mut stream, 500).await;
}

#[tokio::test]
async fn test_assert_stream_ended_success() {
    let (tx, mut stream) = test_channel::<i32>();
    tx.send(1).expect("receiver alive");
    drop(tx);

    assert_eq!(unwrap_stream(&mut stream, 500).await, 1);
    assert_stream_ended(&mut stream, 500).await;
}

#[tokio::test]
async fn test_mock_connector_refuses_unknown_addresses() {
    let (connector, _peers) = MockConnector::new();
    let addr = SocketAddr::from(([10, 0, 0, 1], 3333));

    let result = connector.connect(addr).await;

    assert!(result.is_err());
    assert_eq!(connector.attempts().len(), 1);
    assert_eq!(connector.attempts()[0].0, addr);
}

#[tokio::test]
async fn test_mock_connector_pipes_lines_both_ways() -> anyhow::Result<()> {
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

    let (connector, mut peers) = MockConnector::new();
    let addr = SocketAddr::from(([10, 0, 0, 2], 3333));
    connector.set_reachable(addr, true);

    let io = connector.connect(addr).await?;
    let mut peer = peers.accept(100).await;
    let mut io = BufReader::new(io);
    peer.send_line("from device").await?;
    io.get_mut().write_all(b"from link\n").await?;

    let mut line = String::new();
    io.read_line(&mut line).await?;
    assert_eq!(line, "from device\n");
    assert_eq!(peer.read_line().await?, Some("from link".to_owned()));
    assert_eq!(peer.addr(), addr);
    Ok(())
}

#[test]
fn test_mock_light_sensor_delivers_to_registered_listener() {
    let sensor = MockLightSensor::new();
    let total = Arc::new(AtomicU32::new(0));

    assert!(!sensor.emit(1.0));
    let sink = Arc::clone(&total);
    assert!(sensor.register(Box::new(move |lux| {
        sink.fetch_add(lux as u32, Ordering::SeqCst);
    })));
    assert!(sensor.emit(5.0));
    assert!(sensor.emit(7.0));
    sensor.unregister();
    assert!(!sensor.emit(100.0));

    assert_eq!(total.load(Ordering::SeqCst), 12);
    assert_eq!(sensor.registrations(), 1);
    assert_eq!(sensor.unregistrations(), 1);
}
