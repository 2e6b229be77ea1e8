// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::store::ThresholdStore;
use crate::thresholds::Thresholds;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Background task draining threshold changes into a [`ThresholdStore`].
///
/// Bursts (a dragged slider) are coalesced: only the newest band queued at
/// the time of a write is saved. Stopping flushes whatever is still queued.
pub struct ThresholdWriter {
    cancel_token: CancellationToken,
    task_handle: Option<JoinHandle<()>>,
}

impl ThresholdWriter {
    /// Spawns the writer on the current tokio runtime.
    #[must_use]
    pub fn start(store: Arc<dyn ThresholdStore>, rx: mpsc::UnboundedReceiver<Thresholds>) -> Self {
        let cancel_token = CancellationToken::new();
        let task_handle = tokio::spawn(run(store, rx, cancel_token.clone()));
        Self {
            cancel_token,
            task_handle: Some(task_handle),
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task_handle.is_some()
    }

    /// Flushes pending changes and waits for the task. Idempotent.
    pub async fn stop(&mut self) {
        self.cancel_token.cancel();
        if let Some(handle) = self.task_handle.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "threshold writer task failed");
            }
        }
    }
}

async fn run(
    store: Arc<dyn ThresholdStore>,
    mut rx: mpsc::UnboundedReceiver<Thresholds>,
    cancel_token: CancellationToken,
) {
    loop {
        tokio::select! {
            () = cancel_token.cancelled() => break,
            next = rx.recv() => match next {
                Some(thresholds) => save(&store, latest(&mut rx, thresholds)).await,
                None => return,
            },
        }
    }

    let mut pending = None;
    while let Ok(thresholds) = rx.try_recv() {
        pending = Some(thresholds);
    }
    if let Some(thresholds) = pending {
        save(&store, thresholds).await;
    }
}

fn latest(rx: &mut mpsc::UnboundedReceiver<Thresholds>, mut thresholds: Thresholds) -> Thresholds {
    while let Ok(newer) = rx.try_recv() {
        thresholds = newer;
    }
    thresholds
}

async fn save(store: &Arc<dyn ThresholdStore>, thresholds: Thresholds) {
    let store = Arc::clone(store);
    match tokio::task::spawn_blocking(move || store.save_thresholds(thresholds)).await {
        Ok(Ok(())) => debug!(%thresholds, "thresholds persisted"),
        Ok(Err(e)) => warn!(%thresholds, error = %e, "failed to persist thresholds"),
        Err(e) => warn!(error = %e, "threshold save task failed"),
    }
}
