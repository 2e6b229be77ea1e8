// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest allowed distance between the low and high thresholds.
pub const THRESHOLD_GAP: f32 = 10.0;
/// Upper bound of the threshold range; also the full scale of the gauge.
pub const THRESHOLD_CEILING: f32 = 400.0;
pub const DEFAULT_LOW: f32 = 50.0;
pub const DEFAULT_HIGH: f32 = 200.0;

/// The `(low, high)` alert band.
///
/// Every constructor and setter clamps, so a value of this type always
/// satisfies `0 <= low`, `high <= 400` and `high - low >= 10`.
///
/// ```
/// use smartdesk_engine::Thresholds;
///
/// let t = Thresholds::default().with_low(195.0);
/// assert_eq!((t.low(), t.high()), (190.0, 200.0));
///
/// let t = t.with_high(1_000.0);
/// assert_eq!(t.high(), 400.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    low: f32,
    high: f32,
}

impl Thresholds {
    /// Builds a band from arbitrary input, clamping low first.
    #[must_use]
    pub fn new(low: f32, high: f32) -> Self {
        let low = clamp(low, 0.0, THRESHOLD_CEILING - THRESHOLD_GAP);
        let high = clamp(high, low + THRESHOLD_GAP, THRESHOLD_CEILING);
        Self { low, high }
    }

    #[must_use]
    pub const fn low(&self) -> f32 {
        self.low
    }

    #[must_use]
    pub const fn high(&self) -> f32 {
        self.high
    }

    /// Moves the low threshold, clamped to `[0, high - gap]`.
    #[must_use]
    pub fn with_low(self, low: f32) -> Self {
        Self {
            low: clamp(low, 0.0, self.high - THRESHOLD_GAP),
            high: self.high,
        }
    }

    /// Moves the high threshold, clamped to `[low + gap, ceiling]`.
    #[must_use]
    pub fn with_high(self, high: f32) -> Self {
        Self {
            low: self.low,
            high: clamp(high, self.low + THRESHOLD_GAP, THRESHOLD_CEILING),
        }
    }

    /// Re-establishes the invariants on a value that bypassed the
    /// constructors, such as one deserialized from disk.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self::new(self.low, self.high)
    }

    /// Whether `intensity` lies inside the band, bounds included.
    #[must_use]
    pub fn contains(&self, intensity: f32) -> bool {
        intensity >= self.low && intensity <= self.high
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low: DEFAULT_LOW,
            high: DEFAULT_HIGH,
        }
    }
}

impl fmt::Display for Thresholds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.low, self.high)
    }
}

/// NaN falls to `lo`.
fn clamp(value: f32, lo: f32, hi: f32) -> f32 {
    value.max(lo).min(hi)
}

/// Named threshold bands offered by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Office,
    Bright,
    Dim,
}

impl Preset {
    pub const ALL: [Self; 3] = [Self::Office, Self::Bright, Self::Dim];

    #[must_use]
    pub fn thresholds(self) -> Thresholds {
        match self {
            Self::Office => Thresholds::new(50.0, 200.0),
            Self::Bright => Thresholds::new(100.0, 300.0),
            Self::Dim => Thresholds::new(20.0, 100.0),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Office => f.write_str("office"),
            Self::Bright => f.write_str("bright"),
            Self::Dim => f.write_str("dim"),
        }
    }
}
