// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use parking_lot::Mutex;
use smartdesk_core::Reading;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, info, warn};

/// Callback invoked by the platform for every lux sample.
pub type LuxListener = Box<dyn Fn(f32) + Send + Sync + 'static>;

/// Readings produced by a [`LocalSensorSource`] while it is running.
pub type LocalReadings = UnboundedReceiverStream<Reading>;

/// The on-device ambient light sensor, as exposed by the platform.
///
/// Implementations deliver samples by invoking the registered listener from
/// whatever thread the platform uses.
pub trait LightSensor: Send + Sync + 'static {
    /// Whether the hardware sensor exists on this device.
    fn is_available(&self) -> bool;

    /// Starts delivering samples to `listener`. Returns `false` if the
    /// platform refused the registration.
    fn register(&self, listener: LuxListener) -> bool;

    /// Stops delivering samples to the registered listener.
    fn unregister(&self);
}

/// Channel-backed adapter over a [`LightSensor`].
///
/// `start` and `stop` are idempotent. Samples are tagged
/// [`Source::Local`](smartdesk_core::Source::Local) and pushed into the stream
/// returned by [`LocalSensorSource::new`].
pub struct LocalSensorSource {
    sensor: Arc<dyn LightSensor>,
    tx: mpsc::UnboundedSender<Reading>,
    /// Start instant of the current registration; `None` while stopped.
    started_at: Mutex<Option<Instant>>,
}

impl LocalSensorSource {
    pub fn new(sensor: Arc<dyn LightSensor>) -> (Self, LocalReadings) {
        let (tx, rx) = mpsc::unbounded_channel();
        let source = Self {
            sensor,
            tx,
            started_at: Mutex::new(None),
        };
        (source, UnboundedReceiverStream::new(rx))
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.sensor.is_available()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.started_at.lock().is_some()
    }

    /// Whether `reading` was captured by the current registration.
    ///
    /// Readings still queued from an earlier registration are rejected, even
    /// if the source has been restarted since.
    #[must_use]
    pub fn accepts(&self, reading: &Reading) -> bool {
        self.started_at
            .lock()
            .is_some_and(|started_at| reading.timestamp() >= started_at)
    }

    /// Registers with the hardware sensor unless already running.
    ///
    /// Returns whether the source is running afterwards. A device without a
    /// light sensor is a no-op.
    pub fn start(&self) -> bool {
        let mut started_at = self.started_at.lock();
        if started_at.is_some() {
            return true;
        }

        if !self.sensor.is_available() {
            warn!("local light sensor unavailable, fallback has no data");
            return false;
        }

        let now = Instant::now();
        let tx = self.tx.clone();
        let listener: LuxListener = Box::new(move |lux| {
            // Receiver gone means the monitor is shutting down.
            let _ = tx.send(Reading::local(lux));
        });

        if !self.sensor.register(listener) {
            warn!("local light sensor rejected listener registration");
            return false;
        }

        *started_at = Some(now);
        info!("local light sensor started");
        true
    }

    pub fn stop(&self) {
        let mut started_at = self.started_at.lock();
        if started_at.is_none() {
            return;
        }

        self.sensor.unregister();
        *started_at = None;
        debug!("local light sensor stopped");
    }
}

impl Drop for LocalSensorSource {
    fn drop(&mut self) {
        self.stop();
    }
}
