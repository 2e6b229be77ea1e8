// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::thresholds::{Thresholds, THRESHOLD_CEILING};
use smartdesk_core::{Reading, Source};
use std::collections::VecDeque;

/// Number of intensities kept in the rolling history.
pub const HISTORY_CAPACITY: usize = 50;

/// One immutable snapshot of everything the dashboard shows.
///
/// Snapshots are only produced by [`AlertEngine`](crate::AlertEngine); every
/// snapshot satisfies `alert == manual || current < low || current > high`.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    current: f32,
    source: Option<Source>,
    thresholds: Thresholds,
    manual: bool,
    alert: bool,
    connected: bool,
    history: VecDeque<f32>,
}

impl DashboardState {
    pub(crate) fn new(thresholds: Thresholds) -> Self {
        let mut state = Self {
            current: 0.0,
            source: None,
            thresholds,
            manual: false,
            alert: false,
            connected: false,
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
        };
        state.recompute_alert();
        state
    }

    #[must_use]
    pub const fn current(&self) -> f32 {
        self.current
    }

    /// Producer of the last applied reading; `None` before the first one.
    #[must_use]
    pub const fn source(&self) -> Option<Source> {
        self.source
    }

    #[must_use]
    pub const fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    #[must_use]
    pub const fn is_manual(&self) -> bool {
        self.manual
    }

    #[must_use]
    pub const fn is_alert(&self) -> bool {
        self.alert
    }

    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.connected
    }

    /// Oldest first.
    #[must_use]
    pub const fn history(&self) -> &VecDeque<f32> {
        &self.history
    }

    /// Current intensity on the gauge scale, in `[0, 1]`.
    #[must_use]
    pub fn gauge_fraction(&self) -> f32 {
        (self.current / THRESHOLD_CEILING).clamp(0.0, 1.0)
    }

    pub(crate) fn apply_reading(&mut self, reading: &Reading) {
        self.current = reading.intensity();
        self.source = Some(reading.source());
        if self.history.len() == HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(self.current);
        self.recompute_alert();
    }

    pub(crate) fn set_thresholds(&mut self, thresholds: Thresholds) {
        self.thresholds = thresholds;
        self.recompute_alert();
    }

    pub(crate) fn toggle_manual(&mut self) {
        self.manual = !self.manual;
        self.recompute_alert();
    }

    /// Returns whether the flag changed.
    pub(crate) fn set_connected(&mut self, connected: bool) -> bool {
        if self.connected == connected {
            return false;
        }
        self.connected = connected;
        self.recompute_alert();
        true
    }

    fn recompute_alert(&mut self) {
        self.alert = self.manual || !self.thresholds.contains(self.current);
    }
}
