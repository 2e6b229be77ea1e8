// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::decoder::TelemetryDecoder;
use crate::event::TelemetryEvent;
use crate::local::LocalSensorSource;
use smartdesk_core::{ConnectionState, Reading};
use std::fmt;
use std::sync::Arc;
use tracing::{info, trace};

/// Which producer is authoritative for dashboard updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceMode {
    #[default]
    UsingRemote,
    UsingLocal,
}

impl fmt::Display for SourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UsingRemote => f.write_str("USING_REMOTE"),
            Self::UsingLocal => f.write_str("USING_LOCAL"),
        }
    }
}

/// Arbitrates between the remote telemetry stream and the local sensor.
///
/// - A remote message whose sensor field carries the fallback marker switches
///   to [`SourceMode::UsingLocal`] and starts the local source once.
/// - The next healthy remote message switches back and stops the local source.
/// - While the link is not connected, local readings are accepted whenever the
///   local source is running.
///
/// The selector is owned by a single task; it is fed one [`TelemetryEvent`] at
/// a time and returns the reading, if any, that may update the dashboard.
pub struct FallbackSelector {
    mode: SourceMode,
    connection: ConnectionState,
    decoder: TelemetryDecoder,
    local: Arc<LocalSensorSource>,
}

impl FallbackSelector {
    #[must_use]
    pub fn new(local: Arc<LocalSensorSource>) -> Self {
        Self {
            mode: SourceMode::UsingRemote,
            connection: ConnectionState::Disconnected,
            decoder: TelemetryDecoder::new(),
            local,
        }
    }

    #[must_use]
    pub const fn mode(&self) -> SourceMode {
        self.mode
    }

    #[must_use]
    pub const fn connection(&self) -> ConnectionState {
        self.connection
    }

    #[must_use]
    pub const fn decoder(&self) -> &TelemetryDecoder {
        &self.decoder
    }

    pub fn on_event(&mut self, event: TelemetryEvent) -> Option<Reading> {
        match event {
            TelemetryEvent::RemoteLine(line) => self.on_remote_line(&line),
            TelemetryEvent::LocalReading(reading) => self.on_local_reading(reading),
            TelemetryEvent::Connection(state) => {
                self.on_connection_change(state);
                None
            }
        }
    }

    pub fn on_remote_line(&mut self, line: &str) -> Option<Reading> {
        let decoded = self.decoder.decode(line)?;

        if decoded.remote_sensor_unavailable {
            if self.mode == SourceMode::UsingRemote {
                info!(sensor = %decoded.message.sensor, "peer sensor offline, switching to local");
                self.mode = SourceMode::UsingLocal;
                self.local.start();
            }
            return None;
        }

        if self.mode == SourceMode::UsingLocal {
            info!("peer sensor healthy, switching back to remote");
            self.mode = SourceMode::UsingRemote;
        }
        // Also releases a source started by a user-initiated disconnect.
        self.local.stop();

        Some(decoded.reading)
    }

    pub fn on_local_reading(&mut self, reading: Reading) -> Option<Reading> {
        if !self.local.accepts(&reading) {
            trace!("discarding reading captured before the local source started");
            return None;
        }

        if self.mode == SourceMode::UsingLocal || !self.connection.is_connected() {
            Some(reading)
        } else {
            trace!(intensity = reading.intensity(), "remote is authoritative, ignoring local reading");
            None
        }
    }

    pub fn on_connection_change(&mut self, state: ConnectionState) {
        self.connection = state;
    }

    pub fn shutdown(&self) {
        self.local.stop();
    }
}
