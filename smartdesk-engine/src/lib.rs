// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! Alerting and history engine for the smartdesk dashboard.
//!
//! [`AlertEngine`] owns the one mutable [`DashboardState`]: the current
//! intensity, the `(low, high)` [`Thresholds`], the manual override, the
//! connection flag and a rolling history of the last
//! [`HISTORY_CAPACITY`] intensities. Threshold changes are handed to a
//! [`ThresholdWriter`] which persists them through a [`ThresholdStore`]
//! without ever blocking the engine.
pub mod engine;
pub mod state;
pub mod store;
pub mod thresholds;
pub mod writer;

pub use self::engine::AlertEngine;
pub use self::state::{DashboardState, HISTORY_CAPACITY};
pub use self::store::{JsonFileThresholdStore, MemoryThresholdStore, ThresholdStore};
pub use self::thresholds::{
    Preset, Thresholds, DEFAULT_HIGH, DEFAULT_LOW, THRESHOLD_CEILING, THRESHOLD_GAP,
};
pub use self::writer::ThresholdWriter;
