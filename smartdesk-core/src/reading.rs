// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

/// Where a [`Reading`] was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Decoded from the peer's telemetry stream.
    Remote,
    /// Produced by the on-device light sensor.
    Local,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote => write!(f, "remote"),
            Self::Local => write!(f, "local"),
        }
    }
}

/// One light-intensity sample, in lux.
///
/// Readings are immutable once produced. The intensity is never negative:
/// negative and non-finite inputs are stored as `0.0`.
///
/// # Examples
///
/// ```
/// use smartdesk_core::{Reading, Source};
///
/// let reading = Reading::remote(120.5);
/// assert_eq!(reading.intensity(), 120.5);
/// assert_eq!(reading.source(), Source::Remote);
///
/// assert_eq!(Reading::local(-3.0).intensity(), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    intensity: f32,
    source: Source,
    captured_at: Instant,
}

impl Reading {
    /// Create a reading captured now.
    #[must_use]
    pub fn new(intensity: f32, source: Source) -> Self {
        Self::captured_at(intensity, source, Instant::now())
    }

    /// Create a reading with an explicit capture instant.
    #[must_use]
    pub fn captured_at(intensity: f32, source: Source, captured_at: Instant) -> Self {
        let intensity = if intensity.is_finite() && intensity > 0.0 {
            intensity
        } else {
            0.0
        };
        Self {
            intensity,
            source,
            captured_at,
        }
    }

    #[must_use]
    pub fn remote(intensity: f32) -> Self {
        Self::new(intensity, Source::Remote)
    }

    #[must_use]
    pub fn local(intensity: f32) -> Self {
        Self::new(intensity, Source::Local)
    }

    #[must_use]
    pub const fn intensity(&self) -> f32 {
        self.intensity
    }

    #[must_use]
    pub const fn source(&self) -> Source {
        self.source
    }

    #[must_use]
    pub const fn timestamp(&self) -> Instant {
        self.captured_at
    }
}
