// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use smartdesk_core::SmartdeskError;
use smartdesk_link::LinkConfig;
use std::net::SocketAddr;
use std::time::Duration;

#[test]
fn test_default_config_values() {
    let config = LinkConfig::default();

    assert_eq!(config.prefixes, vec!["192.168.43", "192.168.4"]);
    assert_eq!(config.port, 3333);
    assert_eq!(config.attempt_timeout(), Duration::from_millis(500));
    assert_eq!(config.initial_backoff_ms, 1_000);
    assert_eq!(config.max_backoff_ms, 30_000);
    assert_eq!(config.max_line_length, 1_024);
}

#[test]
fn test_candidates_scan_prefixes_outer_hosts_inner() -> anyhow::Result<()> {
    // Arrange
    let config = LinkConfig::default();

    // Act
    let candidates: Vec<SocketAddr> = config.candidates().collect();

    // Assert
    assert_eq!(candidates.len(), 2 * 254);
    assert_eq!(candidates[0], "192.168.43.1:3333".parse::<SocketAddr>()?);
    assert_eq!(candidates[1], "192.168.43.2:3333".parse::<SocketAddr>()?);
    assert_eq!(candidates[253], "192.168.43.254:3333".parse::<SocketAddr>()?);
    assert_eq!(candidates[254], "192.168.4.1:3333".parse::<SocketAddr>()?);
    assert_eq!(candidates[507], "192.168.4.254:3333".parse::<SocketAddr>()?);
    Ok(())
}

#[test]
fn test_malformed_prefixes_are_skipped() -> anyhow::Result<()> {
    let config = LinkConfig {
        prefixes: vec![
            "10.0".into(),
            "10.0.0.0".into(),
            "10.0.300".into(),
            "not.an.ip".into(),
            " 10.1.2 ".into(),
        ],
        first_host: 5,
        last_host: 6,
        ..LinkConfig::default()
    };

    let candidates: Vec<SocketAddr> = config.candidates().collect();

    assert_eq!(
        candidates,
        vec![
            "10.1.2.5:3333".parse::<SocketAddr>()?,
            "10.1.2.6:3333".parse::<SocketAddr>()?,
        ]
    );
    Ok(())
}

#[test]
fn test_empty_host_range_yields_no_candidates() {
    let config = LinkConfig {
        first_host: 10,
        last_host: 9,
        ..LinkConfig::default()
    };

    assert_eq!(config.candidates().count(), 0);
}

#[test]
fn test_from_json_fills_missing_fields_with_defaults() -> anyhow::Result<()> {
    let config = LinkConfig::from_json(r#"{"port":4000,"max_backoff_ms":5000}"#)?;

    assert_eq!(config.port, 4000);
    assert_eq!(config.max_backoff_ms, 5_000);
    assert_eq!(config.prefixes, LinkConfig::default().prefixes);
    assert_eq!(config.attempt_timeout_ms, 500);
    Ok(())
}

#[test]
fn test_from_json_rejects_wrong_types() {
    let result = LinkConfig::from_json(r#"{"port":"three"}"#);

    assert!(matches!(result, Err(SmartdeskError::Decode { .. })));
}
