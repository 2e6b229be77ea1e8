// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Line-oriented JSON payloads exchanged with the peer.
//!
//! Inbound lines carry a [`SensorMessage`]; outbound lines carry a
//! [`ControlMessage`]. Each message occupies exactly one line.

use crate::Result;
use serde::{Deserialize, Serialize};

/// Telemetry payload sent by the peer, e.g.
/// `{"lux":231.7,"status":"ok","sensor":"BH1750"}`.
///
/// Every field falls back to its default when absent (`0.0`, `""`, `""`);
/// unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorMessage {
    pub lux: f32,
    pub status: String,
    pub sensor: String,
}

impl SensorMessage {
    /// Parse one inbound line.
    ///
    /// # Errors
    ///
    /// Returns a decode error if the line is not a JSON object of the expected shape.
    pub fn from_line(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line.trim())?)
    }
}

/// Command sent to the peer.
///
/// # Examples
///
/// ```
/// use smartdesk_core::ControlMessage;
///
/// let line = ControlMessage::Timer { timer: 30 }.to_line().unwrap();
/// assert_eq!(line, r#"{"timer":30}"#);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ControlMessage {
    /// Start the peer's countdown timer, in seconds.
    Timer { timer: u32 },
}

impl ControlMessage {
    /// Encode as a single JSON line without the trailing newline.
    ///
    /// # Errors
    ///
    /// Returns a decode error if serialization fails.
    pub fn to_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
