// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! # smartdesk
//!
//! Client for a desk light that streams its ambient light readings over a
//! local network.
//!
//! The [`Monitor`] finds the device by scanning the phone-hotspot and
//! soft-AP networks, keeps the connection alive with exponential backoff,
//! switches to the on-device light sensor whenever the desk reports its own
//! sensor offline, and keeps a dashboard state with a rolling history and a
//! threshold alert.
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use smartdesk::prelude::*;
//! use std::sync::Arc;
//!
//! # struct NoSensor;
//! # impl LightSensor for NoSensor {
//! #     fn is_available(&self) -> bool { false }
//! #     fn register(&self, _listener: LuxListener) -> bool { false }
//! #     fn unregister(&self) {}
//! # }
//! # #[tokio::main]
//! # async fn main() -> smartdesk::Result<()> {
//! let store = Arc::new(JsonFileThresholdStore::new("thresholds.json"));
//! let mut monitor = Monitor::tcp(MonitorConfig::default(), Arc::new(NoSensor), store);
//!
//! let mut states = monitor.subscribe()?;
//! while let Some(state) = states.next().await {
//!     if state.is_alert() {
//!         println!("light out of band: {} lux", state.current());
//!     }
//! }
//!
//! monitor.stop().await;
//! # Ok(())
//! # }
//! ```
pub mod config;
pub mod monitor;
pub mod pipeline;

pub use self::config::MonitorConfig;
pub use self::monitor::Monitor;
pub use self::pipeline::TelemetryEvents;

pub use smartdesk_core::{
    ConnectionState, ControlMessage, Reading, Result, SensorMessage, SmartdeskError, Source,
};
pub use smartdesk_engine::{
    AlertEngine, DashboardState, JsonFileThresholdStore, MemoryThresholdStore, Preset,
    ThresholdStore, Thresholds,
};
pub use smartdesk_link::{Connector, Link, LinkConfig, TcpConnector};
pub use smartdesk_telemetry::{FallbackSelector, LightSensor, LocalSensorSource, LuxListener, SourceMode};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{Monitor, MonitorConfig};
    pub use smartdesk_core::{ConnectionState, Reading, Source};
    pub use smartdesk_engine::{
        DashboardState, JsonFileThresholdStore, MemoryThresholdStore, Preset, ThresholdStore,
        Thresholds,
    };
    pub use smartdesk_link::LinkConfig;
    pub use smartdesk_telemetry::{LightSensor, LuxListener};
}
