// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use smartdesk_core::{Result, SmartdeskError};
use smartdesk_engine::{ThresholdStore, Thresholds};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A store whose writes always fail, as on a read-only preferences volume.
#[derive(Debug, Default)]
pub struct FailingThresholdStore {
    attempts: AtomicUsize,
}

impl FailingThresholdStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl ThresholdStore for FailingThresholdStore {
    fn load_thresholds(&self) -> Thresholds {
        Thresholds::default()
    }

    fn save_thresholds(&self, _thresholds: Thresholds) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(SmartdeskError::io_error(
            "saving thresholds",
            io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
        ))
    }
}
