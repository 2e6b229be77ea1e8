// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::thresholds::Thresholds;
use parking_lot::Mutex;
use smartdesk_core::{Result, SmartdeskError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Key-value preferences holding the alert band between sessions.
///
/// Implementations may block; the writer calls `save_thresholds` off the
/// async workers.
pub trait ThresholdStore: Send + Sync + 'static {
    /// The stored band, or the defaults when nothing usable is stored.
    fn load_thresholds(&self) -> Thresholds;

    /// # Errors
    ///
    /// Returns an error if the band could not be written.
    fn save_thresholds(&self, thresholds: Thresholds) -> Result<()>;
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryThresholdStore {
    stored: Mutex<Option<Thresholds>>,
    saves: Mutex<usize>,
}

impl MemoryThresholdStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_thresholds(thresholds: Thresholds) -> Self {
        Self {
            stored: Mutex::new(Some(thresholds)),
            saves: Mutex::new(0),
        }
    }

    #[must_use]
    pub fn stored(&self) -> Option<Thresholds> {
        *self.stored.lock()
    }

    /// Number of completed `save_thresholds` calls.
    #[must_use]
    pub fn save_count(&self) -> usize {
        *self.saves.lock()
    }
}

impl ThresholdStore for MemoryThresholdStore {
    fn load_thresholds(&self) -> Thresholds {
        self.stored().map(Thresholds::normalized).unwrap_or_default()
    }

    fn save_thresholds(&self, thresholds: Thresholds) -> Result<()> {
        *self.stored.lock() = Some(thresholds);
        *self.saves.lock() += 1;
        Ok(())
    }
}

/// Stores the band as a small JSON document, `{"low":50.0,"high":200.0}`.
///
/// A missing or unreadable file loads as the defaults. Saves go through a
/// sibling temporary file and a rename, so a crash never leaves a torn file.
#[derive(Debug, Clone)]
pub struct JsonFileThresholdStore {
    path: PathBuf,
}

impl JsonFileThresholdStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Thresholds> {
        let document = fs::read_to_string(&self.path)
            .map_err(|e| SmartdeskError::io_error(format!("reading {}", self.path.display()), e))?;
        let thresholds: Thresholds = serde_json::from_str(&document)?;
        Ok(thresholds.normalized())
    }
}

impl ThresholdStore for JsonFileThresholdStore {
    fn load_thresholds(&self) -> Thresholds {
        match self.read() {
            Ok(thresholds) => {
                debug!(path = %self.path.display(), %thresholds, "loaded thresholds");
                thresholds
            }
            Err(SmartdeskError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no stored thresholds, using defaults");
                Thresholds::default()
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "stored thresholds unusable, using defaults");
                Thresholds::default()
            }
        }
    }

    fn save_thresholds(&self, thresholds: Thresholds) -> Result<()> {
        let document = serde_json::to_string(&thresholds)?;
        let staging = self.path.with_extension("tmp");
        fs::write(&staging, document)
            .map_err(|e| SmartdeskError::io_error(format!("writing {}", staging.display()), e))?;
        fs::rename(&staging, &self.path)
            .map_err(|e| SmartdeskError::io_error(format!("replacing {}", self.path.display()), e))
    }
}
