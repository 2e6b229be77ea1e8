// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use smartdesk_link::{Backoff, LinkConfig};
use std::time::Duration;

#[test]
fn test_backoff_doubles_until_capped() {
    // Arrange
    let mut backoff = Backoff::new(Duration::from_secs(1), Duration::from_secs(30));

    // Act
    let delays: Vec<u64> = (0..8).map(|_| backoff.next_delay().as_secs()).collect();

    // Assert
    assert_eq!(delays, vec![1, 2, 4, 8, 16, 30, 30, 30]);
}

#[test]
fn test_backoff_reset_returns_to_initial() {
    let mut backoff = Backoff::new(Duration::from_secs(1), Duration::from_secs(30));
    backoff.next_delay();
    backoff.next_delay();
    backoff.next_delay();

    backoff.reset();

    assert_eq!(backoff.current(), Duration::from_secs(1));
    assert_eq!(backoff.next_delay(), Duration::from_secs(1));
    assert_eq!(backoff.next_delay(), Duration::from_secs(2));
}

#[test]
fn test_initial_above_max_is_clamped() {
    let mut backoff = Backoff::new(Duration::from_secs(60), Duration::from_secs(30));

    assert_eq!(backoff.next_delay(), Duration::from_secs(30));
    assert_eq!(backoff.next_delay(), Duration::from_secs(30));
}

#[test]
fn test_config_backoff_uses_configured_bounds() {
    let config = LinkConfig {
        initial_backoff_ms: 250,
        max_backoff_ms: 1_000,
        ..LinkConfig::default()
    };

    let mut backoff = config.backoff();

    let delays: Vec<u128> = (0..4).map(|_| backoff.next_delay().as_millis()).collect();
    assert_eq!(delays, vec![250, 500, 1_000, 1_000]);
}
