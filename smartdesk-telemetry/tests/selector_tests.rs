// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use futures::{FutureExt, StreamExt};
use smartdesk_core::{ConnectionState, Reading, Source};
use smartdesk_telemetry::{
    FallbackSelector, LocalReadings, LocalSensorSource, SourceMode, TelemetryEvent,
};
use smartdesk_test_utils::MockLightSensor;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const HEALTHY: &str = r#"{"lux":120.0,"status":"ok","sensor":"BH1750"}"#;
const SENSOR_OFF: &str = r#"{"lux":0.0,"status":"error","sensor":"BH1750_OFF"}"#;

fn selector() -> (FallbackSelector, Arc<MockLightSensor>, Arc<LocalSensorSource>) {
    let sensor = Arc::new(MockLightSensor::new());
    let (local, _readings) = LocalSensorSource::new(sensor.clone());
    let local = Arc::new(local);
    let mut selector = FallbackSelector::new(local.clone());
    selector.on_connection_change(ConnectionState::Connected);
    (selector, sensor, local)
}

fn next_queued(readings: &mut LocalReadings) -> Reading {
    readings
        .next()
        .now_or_never()
        .flatten()
        .expect("reading queued by the sensor listener")
}

#[test]
fn test_healthy_remote_line_passes_through() {
    // Arrange
    let (mut selector, sensor, _local) = selector();

    // Act
    let reading = selector.on_remote_line(HEALTHY);

    // Assert
    let reading = reading.expect("remote reading forwarded");
    assert_eq!(reading.intensity(), 120.0);
    assert_eq!(reading.source(), Source::Remote);
    assert_eq!(selector.mode(), SourceMode::UsingRemote);
    assert_eq!(sensor.registrations(), 0);
}

#[test]
fn test_marker_twice_starts_local_exactly_once() {
    // Arrange
    let (mut selector, sensor, local) = selector();

    // Act
    let first = selector.on_remote_line(SENSOR_OFF);
    let second = selector.on_remote_line(SENSOR_OFF);

    // Assert
    assert!(first.is_none());
    assert!(second.is_none());
    assert_eq!(selector.mode(), SourceMode::UsingLocal);
    assert!(local.is_running());
    assert_eq!(sensor.registrations(), 1);
}

#[test]
fn test_local_readings_are_authoritative_in_local_mode() {
    let (mut selector, _sensor, _local) = selector();

    assert!(selector.on_local_reading(Reading::local(75.0)).is_none());

    selector.on_remote_line(SENSOR_OFF);
    let local_reading = Reading::local(75.0);

    assert_eq!(selector.on_local_reading(local_reading), Some(local_reading));
}

#[test]
fn test_reading_queued_before_restart_is_discarded() {
    // Arrange
    let sensor = Arc::new(MockLightSensor::new());
    let (local, mut readings) = LocalSensorSource::new(sensor.clone());
    let local = Arc::new(local);
    let mut selector = FallbackSelector::new(local.clone());
    selector.on_connection_change(ConnectionState::Connected);
    selector.on_remote_line(SENSOR_OFF);
    assert!(sensor.emit(12.0));
    selector.on_remote_line(HEALTHY);
    thread::sleep(Duration::from_millis(2));

    // Act
    selector.on_remote_line(SENSOR_OFF);
    assert!(sensor.emit(48.0));
    let stale = next_queued(&mut readings);
    let fresh = next_queued(&mut readings);

    // Assert
    assert!(local.is_running());
    assert_eq!(sensor.registrations(), 2);
    assert!(selector.on_local_reading(stale).is_none());
    assert_eq!(selector.on_local_reading(fresh).map(|r| r.intensity()), Some(48.0));
}

#[test]
fn test_healthy_message_returns_to_remote_and_stops_local() {
    // Arrange
    let (mut selector, sensor, local) = selector();
    selector.on_remote_line(SENSOR_OFF);

    // Act
    let reading = selector.on_remote_line(HEALTHY);

    // Assert
    assert_eq!(reading.map(|r| r.intensity()), Some(120.0));
    assert_eq!(selector.mode(), SourceMode::UsingRemote);
    assert!(!local.is_running());
    assert_eq!(sensor.unregistrations(), 1);
    assert!(selector.on_local_reading(Reading::local(10.0)).is_none());
}

#[test]
fn test_local_preferred_while_disconnected() {
    // Arrange
    let (mut selector, _sensor, local) = selector();
    selector.on_connection_change(ConnectionState::Disconnected);

    // Act
    let before_start = selector.on_local_reading(Reading::local(33.0));
    assert!(local.start());
    let after_start = selector.on_local_reading(Reading::local(33.0));

    // Assert
    assert!(before_start.is_none());
    assert_eq!(after_start.map(|r| r.intensity()), Some(33.0));
    assert_eq!(selector.mode(), SourceMode::UsingRemote);
}

#[test]
fn test_scanning_counts_as_disconnected() {
    let (mut selector, _sensor, local) = selector();
    local.start();

    selector.on_connection_change(ConnectionState::Scanning);

    assert!(selector.on_local_reading(Reading::local(1.0)).is_some());

    selector.on_connection_change(ConnectionState::Connected);

    assert!(selector.on_local_reading(Reading::local(1.0)).is_none());
}

#[test]
fn test_malformed_line_changes_nothing() {
    let (mut selector, sensor, _local) = selector();
    selector.on_remote_line(SENSOR_OFF);

    let reading = selector.on_remote_line("{\"lux\":");

    assert!(reading.is_none());
    assert_eq!(selector.mode(), SourceMode::UsingLocal);
    assert_eq!(sensor.registrations(), 1);
    assert_eq!(selector.decoder().malformed_count(), 1);
}

#[test]
fn test_on_event_dispatches_every_variant() {
    let (mut selector, _sensor, local) = selector();

    let remote = selector.on_event(TelemetryEvent::RemoteLine(HEALTHY.to_owned()));
    let connection = selector.on_event(ConnectionState::Disconnected.into());
    local.start();
    let local = selector.on_event(Reading::local(5.0).into());

    assert!(remote.is_some());
    assert!(connection.is_none());
    assert_eq!(selector.connection(), ConnectionState::Disconnected);
    assert_eq!(local.map(|r| r.source()), Some(Source::Local));
}

#[test]
fn test_shutdown_stops_the_local_source() {
    let (mut selector, sensor, local) = selector();
    selector.on_remote_line(SENSOR_OFF);

    selector.shutdown();

    assert!(!local.is_running());
    assert!(!sensor.is_registered());
}

#[test]
fn test_source_mode_display() {
    assert_eq!(SourceMode::UsingRemote.to_string(), "USING_REMOTE");
    assert_eq!(SourceMode::UsingLocal.to_string(), "USING_LOCAL");
}
