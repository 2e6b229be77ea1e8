// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::Backoff;
use serde::{Deserialize, Serialize};
use smartdesk_core::Result;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tracing::warn;

const DEFAULT_PORT: u16 = 3333;
const DEFAULT_ATTEMPT_TIMEOUT_MS: u64 = 500;
const DEFAULT_INITIAL_BACKOFF_MS: u64 = 1_000;
const DEFAULT_MAX_BACKOFF_MS: u64 = 30_000;
const DEFAULT_MAX_LINE_LENGTH: usize = 1_024;

/// Discovery and reconnection parameters of a [`Link`](crate::Link).
///
/// Every field has a default, so a JSON document only needs the fields it
/// overrides:
///
/// ```
/// use smartdesk_link::LinkConfig;
///
/// let config = LinkConfig::from_json(r#"{"prefixes":["10.0.0"],"port":4000}"#).unwrap();
/// assert_eq!(config.port, 4000);
/// assert_eq!(config.attempt_timeout_ms, 500);
/// assert_eq!(config.candidates().count(), 254);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// First three octets of each network to scan, in scan order.
    pub prefixes: Vec<String>,
    /// Lowest host suffix tried in every prefix.
    pub first_host: u8,
    /// Highest host suffix tried in every prefix.
    pub last_host: u8,
    pub port: u16,
    /// Upper bound of a single connection attempt.
    pub attempt_timeout_ms: u64,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    /// Longest inbound line accepted, in bytes; longer lines are dropped.
    pub max_line_length: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            // Phone hotspot first, then the device's own soft-AP network.
            prefixes: vec!["192.168.43".into(), "192.168.4".into()],
            first_host: 1,
            last_host: 254,
            port: DEFAULT_PORT,
            attempt_timeout_ms: DEFAULT_ATTEMPT_TIMEOUT_MS,
            initial_backoff_ms: DEFAULT_INITIAL_BACKOFF_MS,
            max_backoff_ms: DEFAULT_MAX_BACKOFF_MS,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

impl LinkConfig {
    /// Parse a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns a decode error if the document is not valid JSON or a field has the wrong type.
    pub fn from_json(document: &str) -> Result<Self> {
        Ok(serde_json::from_str(document)?)
    }

    #[must_use]
    pub const fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    #[must_use]
    pub fn backoff(&self) -> Backoff {
        Backoff::new(
            Duration::from_millis(self.initial_backoff_ms),
            Duration::from_millis(self.max_backoff_ms),
        )
    }

    /// Every address one discovery pass tries, in order: prefixes outer,
    /// host suffixes inner. Prefixes that are not three dotted octets are
    /// skipped with a warning.
    pub fn candidates(&self) -> impl Iterator<Item = SocketAddr> + '_ {
        let port = self.port;
        let hosts = self.first_host..=self.last_host;
        self.prefixes
            .iter()
            .filter_map(|prefix| match parse_prefix(prefix) {
                Some(octets) => Some(octets),
                None => {
                    warn!(prefix = %prefix, "ignoring malformed network prefix");
                    None
                }
            })
            .flat_map(move |[a, b, c]| {
                hosts
                    .clone()
                    .map(move |host| SocketAddr::from((Ipv4Addr::new(a, b, c, host), port)))
            })
    }
}

fn parse_prefix(prefix: &str) -> Option<[u8; 3]> {
    let mut octets = prefix.trim().split('.').map(str::parse::<u8>);
    let parsed = [octets.next()?.ok()?, octets.next()?.ok()?, octets.next()?.ok()?];
    match octets.next() {
        None => Some(parsed),
        Some(_) => None,
    }
}
