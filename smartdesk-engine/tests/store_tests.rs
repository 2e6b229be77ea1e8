// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use smartdesk_engine::{
    JsonFileThresholdStore, MemoryThresholdStore, ThresholdStore, ThresholdWriter, Thresholds,
};
use smartdesk_test_utils::FailingThresholdStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;

fn scratch_file(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("smartdesk-store-{}-{name}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("scratch dir");
    dir.join("thresholds.json")
}

#[test]
fn test_memory_store_defaults_then_round_trips() -> anyhow::Result<()> {
    let store = MemoryThresholdStore::new();
    assert_eq!(store.load_thresholds(), Thresholds::default());

    store.save_thresholds(Thresholds::new(80.0, 120.0))?;

    assert_eq!(store.load_thresholds(), Thresholds::new(80.0, 120.0));
    assert_eq!(store.save_count(), 1);
    Ok(())
}

#[test]
fn test_json_store_missing_file_yields_defaults() {
    let path = scratch_file("missing");
    let _ = std::fs::remove_file(&path);
    let store = JsonFileThresholdStore::new(&path);

    assert_eq!(store.load_thresholds(), Thresholds::default());
}

#[test]
fn test_json_store_persists_between_instances() -> anyhow::Result<()> {
    // Arrange
    let path = scratch_file("persist");
    let writer = JsonFileThresholdStore::new(&path);

    // Act
    writer.save_thresholds(Thresholds::new(20.0, 100.0))?;
    let reader = JsonFileThresholdStore::new(&path);

    // Assert
    assert_eq!(reader.load_thresholds(), Thresholds::new(20.0, 100.0));
    let document: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert_eq!(document["low"], 20.0);
    assert_eq!(document["high"], 100.0);
    Ok(())
}

#[test]
fn test_json_store_corrupt_file_yields_defaults() -> anyhow::Result<()> {
    let path = scratch_file("corrupt");
    std::fs::write(&path, "{\"low\": oops")?;
    let store = JsonFileThresholdStore::new(&path);

    assert_eq!(store.load_thresholds(), Thresholds::default());
    Ok(())
}

#[test]
fn test_json_store_normalizes_out_of_range_values() -> anyhow::Result<()> {
    let path = scratch_file("range");
    std::fs::write(&path, r#"{"low":395.0,"high":20.0}"#)?;
    let store = JsonFileThresholdStore::new(&path);

    let loaded = store.load_thresholds();

    assert_eq!((loaded.low(), loaded.high()), (390.0, 400.0));
    Ok(())
}

#[tokio::test]
async fn test_writer_persists_latest_value_and_flushes_on_stop() {
    // Arrange
    let store = Arc::new(MemoryThresholdStore::new());
    let (tx, rx) = mpsc::unbounded_channel();
    let mut writer = ThresholdWriter::start(store.clone(), rx);

    // Act
    tx.send(Thresholds::new(10.0, 50.0)).expect("writer alive");
    tx.send(Thresholds::new(15.0, 60.0)).expect("writer alive");
    tx.send(Thresholds::new(25.0, 70.0)).expect("writer alive");
    writer.stop().await;

    // Assert
    assert_eq!(store.stored(), Some(Thresholds::new(25.0, 70.0)));
    assert!(store.save_count() >= 1);
    assert!(!writer.is_running());
}

#[tokio::test]
async fn test_writer_survives_store_failures() {
    let store = Arc::new(FailingThresholdStore::new());
    let (tx, rx) = mpsc::unbounded_channel();
    let mut writer = ThresholdWriter::start(store.clone(), rx);

    tx.send(Thresholds::new(10.0, 50.0)).expect("writer alive");
    sleep(Duration::from_millis(50)).await;
    tx.send(Thresholds::new(12.0, 50.0)).expect("writer alive");
    writer.stop().await;

    assert_eq!(store.attempts(), 2);
}

#[tokio::test]
async fn test_writer_stop_is_idempotent() {
    let store = Arc::new(MemoryThresholdStore::new());
    let (_tx, rx) = mpsc::unbounded_channel();
    let mut writer = ThresholdWriter::start(store.clone(), rx);

    writer.stop().await;
    writer.stop().await;

    assert_eq!(store.save_count(), 0);
}
