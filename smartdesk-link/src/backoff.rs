// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::time::Duration;

/// Doubling retry interval between failed discovery cycles.
///
/// # Examples
///
/// ```
/// use smartdesk_link::Backoff;
/// use std::time::Duration;
///
/// let mut backoff = Backoff::new(Duration::from_secs(1), Duration::from_secs(30));
/// let waits: Vec<u64> = (0..7).map(|_| backoff.next_delay().as_secs()).collect();
/// assert_eq!(waits, vec![1, 2, 4, 8, 16, 30, 30]);
///
/// backoff.reset();
/// assert_eq!(backoff.next_delay(), Duration::from_secs(1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    /// `initial` is clamped to `max`.
    #[must_use]
    pub fn new(initial: Duration, max: Duration) -> Self {
        let initial = initial.min(max);
        Self {
            initial,
            max,
            current: initial,
        }
    }

    /// The delay the next call to [`next_delay`](Self::next_delay) will return.
    #[must_use]
    pub const fn current(&self) -> Duration {
        self.current
    }

    /// Returns the wait for this failure and doubles the next one, up to the cap.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.saturating_mul(2).min(self.max);
        delay
    }

    /// Back to the initial interval; called on every successful connection.
    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}
