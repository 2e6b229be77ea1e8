// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! Turns raw telemetry into authoritative readings.
//!
//! - [`TelemetryDecoder`] parses inbound lines and flags a peer whose own light
//!   sensor is offline.
//! - [`LocalSensorSource`] bridges the callback-driven on-device
//!   [`LightSensor`] into a channel of [`Reading`](smartdesk_core::Reading)s.
//! - [`FallbackSelector`] decides, event by event, whether the remote stream or
//!   the local sensor may update the dashboard.
//!
//! Both producers are reduced to [`TelemetryEvent`]s so the selector handles
//! them identically, whatever mechanism delivered them.
pub mod decoder;
pub mod event;
pub mod local;
pub mod selector;

pub use self::decoder::{is_fallback_marker, Decoded, TelemetryDecoder, FALLBACK_MARKER};
pub use self::event::TelemetryEvent;
pub use self::local::{LightSensor, LocalReadings, LocalSensorSource, LuxListener};
pub use self::selector::{FallbackSelector, SourceMode};
