// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use serde::{Deserialize, Serialize};
use smartdesk_core::Result;
use smartdesk_link::LinkConfig;

/// Top-level settings of a [`Monitor`](crate::Monitor).
///
/// ```
/// use smartdesk::MonitorConfig;
///
/// let config = MonitorConfig::from_json(r#"{"link":{"port":4444}}"#).unwrap();
/// assert_eq!(config.link.port, 4444);
/// assert!(config.auto_connect);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub link: LinkConfig,
    /// Start discovery as soon as the monitor starts. When off, the monitor
    /// starts on the local sensor and waits for `toggle_connection`.
    pub auto_connect: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            link: LinkConfig::default(),
            auto_connect: true,
        }
    }
}

impl MonitorConfig {
    /// # Errors
    ///
    /// Returns a decode error if the document is not valid JSON or a field has the wrong type.
    pub fn from_json(document: &str) -> Result<Self> {
        Ok(serde_json::from_str(document)?)
    }
}
