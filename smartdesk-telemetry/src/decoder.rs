// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use smartdesk_core::{Reading, SensorMessage};
use tracing::debug;

/// Substring of the `sensor` field by which the peer reports that its own
/// light sensor is missing or failed. Matched case-insensitively.
pub const FALLBACK_MARKER: &str = "BH1750_OFF";

/// Whether a sensor identifier reports the remote hardware sensor as unavailable.
///
/// ```
/// use smartdesk_telemetry::is_fallback_marker;
///
/// assert!(is_fallback_marker("BH1750_OFF"));
/// assert!(is_fallback_marker("esp32/bh1750_off"));
/// assert!(!is_fallback_marker("BH1750"));
/// ```
#[must_use]
pub fn is_fallback_marker(sensor: &str) -> bool {
    sensor.to_ascii_uppercase().contains(FALLBACK_MARKER)
}

/// One successfully decoded telemetry line.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    /// The peer's intensity, tagged [`Source::Remote`](smartdesk_core::Source::Remote).
    pub reading: Reading,
    /// The peer reported its own sensor as offline.
    pub remote_sensor_unavailable: bool,
    pub message: SensorMessage,
}

/// Line decoder with drop accounting.
///
/// Malformed lines never produce an error: they are logged at debug level,
/// counted and skipped.
#[derive(Debug, Default)]
pub struct TelemetryDecoder {
    decoded: u64,
    malformed: u64,
}

impl TelemetryDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(&mut self, line: &str) -> Option<Decoded> {
        match SensorMessage::from_line(line) {
            Ok(message) => {
                self.decoded += 1;
                Some(Decoded {
                    reading: Reading::remote(message.lux),
                    remote_sensor_unavailable: is_fallback_marker(&message.sensor),
                    message,
                })
            }
            Err(e) => {
                self.malformed += 1;
                debug!(line, error = %e, dropped = self.malformed, "dropping malformed telemetry line");
                None
            }
        }
    }

    #[must_use]
    pub const fn decoded_count(&self) -> u64 {
        self.decoded
    }

    #[must_use]
    pub const fn malformed_count(&self) -> u64 {
        self.malformed
    }
}
