// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use smartdesk_core::{ConnectionState, Reading};

/// Everything the selector reacts to, whichever producer delivered it.
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryEvent {
    /// A raw line from the peer, not yet decoded.
    RemoteLine(String),
    /// A sample from the on-device light sensor.
    LocalReading(Reading),
    /// The link changed state.
    Connection(ConnectionState),
}

impl From<ConnectionState> for TelemetryEvent {
    fn from(state: ConnectionState) -> Self {
        Self::Connection(state)
    }
}

impl From<Reading> for TelemetryEvent {
    fn from(reading: Reading) -> Self {
        Self::LocalReading(reading)
    }
}
