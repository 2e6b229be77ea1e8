// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::state::DashboardState;
use crate::thresholds::{Preset, Thresholds};
use parking_lot::Mutex;
use smartdesk_core::{ConnectionState, Reading, Result, StateSubject, SubjectBoxStream};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, trace};

struct Inner {
    state: Mutex<DashboardState>,
    subject: StateSubject<DashboardState>,
    persist: Option<mpsc::UnboundedSender<Thresholds>>,
}

/// Single owner of the dashboard state.
///
/// Every mutation takes the state lock, applies the change, recomputes the
/// alert flag and publishes the resulting snapshot before releasing the lock,
/// so subscribers observe snapshots in exactly the order mutations were
/// linearized. Cheap to clone; clones share the same state.
///
/// ```
/// use smartdesk_core::Reading;
/// use smartdesk_engine::{AlertEngine, Thresholds};
///
/// let engine = AlertEngine::new(Thresholds::new(50.0, 200.0));
/// assert!(!engine.apply_reading(&Reading::remote(120.0)).is_alert());
/// assert!(engine.apply_reading(&Reading::remote(250.0)).is_alert());
/// ```
#[derive(Clone)]
pub struct AlertEngine {
    inner: Arc<Inner>,
}

impl AlertEngine {
    /// An engine whose threshold changes are not persisted.
    #[must_use]
    pub fn new(thresholds: Thresholds) -> Self {
        Self::build(thresholds, None)
    }

    /// An engine that queues every threshold change on `persist`.
    ///
    /// The queue is unbounded, so a slow store never delays state delivery.
    #[must_use]
    pub fn with_persistence(thresholds: Thresholds, persist: mpsc::UnboundedSender<Thresholds>) -> Self {
        Self::build(thresholds, Some(persist))
    }

    fn build(thresholds: Thresholds, persist: Option<mpsc::UnboundedSender<Thresholds>>) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(DashboardState::new(thresholds.normalized())),
                subject: StateSubject::new(),
                persist,
            }),
        }
    }

    pub fn apply_reading(&self, reading: &Reading) -> DashboardState {
        self.mutate(|state| {
            state.apply_reading(reading);
            true
        })
    }

    pub fn set_low_threshold(&self, low: f32) -> DashboardState {
        self.update_thresholds(|t| t.with_low(low))
    }

    pub fn set_high_threshold(&self, high: f32) -> DashboardState {
        self.update_thresholds(|t| t.with_high(high))
    }

    pub fn apply_preset(&self, preset: Preset) -> DashboardState {
        debug!(%preset, "applying threshold preset");
        self.update_thresholds(|_| preset.thresholds())
    }

    pub fn toggle_manual_override(&self) -> DashboardState {
        self.mutate(|state| {
            state.toggle_manual();
            true
        })
    }

    /// Records the transport state. Only `Connected` counts as connected; a
    /// snapshot is published only when that flag flips.
    pub fn set_connection(&self, connection: ConnectionState) -> DashboardState {
        self.mutate(|state| state.set_connected(connection.is_connected()))
    }

    #[must_use]
    pub fn snapshot(&self) -> DashboardState {
        self.inner.state.lock().clone()
    }

    /// Every snapshot published after this call, in mutation order.
    ///
    /// # Errors
    ///
    /// Returns [`SmartdeskError::Closed`](smartdesk_core::SmartdeskError::Closed)
    /// once the engine has been closed.
    pub fn subscribe(&self) -> Result<SubjectBoxStream<DashboardState>> {
        Ok(self.inner.subject.subscribe()?)
    }

    #[must_use]
    pub fn current_intensity(&self) -> f32 {
        self.inner.state.lock().current()
    }

    #[must_use]
    pub fn thresholds(&self) -> Thresholds {
        self.inner.state.lock().thresholds()
    }

    #[must_use]
    pub fn is_alert(&self) -> bool {
        self.inner.state.lock().is_alert()
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.state.lock().is_connected()
    }

    #[must_use]
    pub fn history(&self) -> VecDeque<f32> {
        self.inner.state.lock().history().clone()
    }

    /// Ends every subscription. Mutations still apply afterwards but are no
    /// longer published.
    pub fn close(&self) {
        self.inner.subject.close();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.subject.is_closed()
    }

    fn update_thresholds(&self, f: impl FnOnce(Thresholds) -> Thresholds) -> DashboardState {
        self.mutate(|state| {
            let thresholds = f(state.thresholds());
            state.set_thresholds(thresholds);
            if let Some(persist) = &self.inner.persist {
                if persist.send(thresholds).is_err() {
                    debug!(%thresholds, "threshold writer gone, change not persisted");
                }
            }
            true
        })
    }

    fn mutate(&self, f: impl FnOnce(&mut DashboardState) -> bool) -> DashboardState {
        let mut state = self.inner.state.lock();
        let publish = f(&mut state);
        let snapshot = state.clone();
        if publish && self.inner.subject.next(snapshot.clone()).is_err() {
            trace!("engine closed, snapshot not published");
        }
        snapshot
    }
}
