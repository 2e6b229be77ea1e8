// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::config::MonitorConfig;
use crate::pipeline::{self, TelemetryEvents};
use parking_lot::Mutex;
use smartdesk_core::{ConnectionState, ControlMessage, Result, SubjectBoxStream};
use smartdesk_engine::{AlertEngine, DashboardState, Preset, ThresholdStore, ThresholdWriter};
use smartdesk_link::{Connector, Link, TcpConnector};
use smartdesk_telemetry::{FallbackSelector, LightSensor, LocalSensorSource};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// The running client: link, local sensor, selector and engine wired together.
///
/// ```text
///  Link ── lines ──┐
///  Link ── state ──┼──▶ FallbackSelector ──▶ AlertEngine ──▶ subscribers
///  LocalSensor ────┘                              │
///                                                 └──▶ ThresholdWriter ──▶ store
/// ```
///
/// Must be started inside a tokio runtime. Call [`stop`](Self::stop) before
/// dropping it; tasks still running at drop time are only cancelled, not
/// awaited.
pub struct Monitor<C: Connector = TcpConnector> {
    link: Link<C>,
    engine: AlertEngine,
    local: Arc<LocalSensorSource>,
    cancel_token: CancellationToken,
    pipeline: Option<JoinHandle<()>>,
    discovery: Mutex<Option<JoinHandle<()>>>,
    writer: ThresholdWriter,
}

impl Monitor<TcpConnector> {
    #[must_use]
    pub fn tcp(config: MonitorConfig, sensor: Arc<dyn LightSensor>, store: Arc<dyn ThresholdStore>) -> Self {
        Self::start(config, TcpConnector, sensor, store)
    }
}

impl<C: Connector> Monitor<C> {
    /// Loads the persisted thresholds and starts every task.
    #[must_use]
    pub fn start(
        config: MonitorConfig,
        connector: C,
        sensor: Arc<dyn LightSensor>,
        store: Arc<dyn ThresholdStore>,
    ) -> Self {
        let thresholds = store.load_thresholds();
        info!(%thresholds, auto_connect = config.auto_connect, "starting monitor");

        let (persist_tx, persist_rx) = mpsc::unbounded_channel();
        let engine = AlertEngine::with_persistence(thresholds, persist_tx);
        let writer = ThresholdWriter::start(store, persist_rx);

        let (link, lines) = Link::new(config.link, connector);
        let (local, readings) = LocalSensorSource::new(sensor);
        let local = Arc::new(local);

        let events = TelemetryEvents::new(lines, readings, link.watch_state());
        let cancel_token = CancellationToken::new();
        let pipeline = tokio::spawn(pipeline::run(
            FallbackSelector::new(Arc::clone(&local)),
            engine.clone(),
            events,
            cancel_token.clone(),
        ));

        let monitor = Self {
            link,
            engine,
            local,
            cancel_token,
            pipeline: Some(pipeline),
            discovery: Mutex::new(None),
            writer,
        };

        if config.auto_connect {
            monitor.spawn_discovery();
        } else {
            monitor.local.start();
        }
        monitor
    }

    #[must_use]
    pub const fn engine(&self) -> &AlertEngine {
        &self.engine
    }

    #[must_use]
    pub const fn link(&self) -> &Link<C> {
        &self.link
    }

    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.link.state()
    }

    #[must_use]
    pub fn is_local_sensor_running(&self) -> bool {
        self.local.is_running()
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    #[must_use]
    pub fn snapshot(&self) -> DashboardState {
        self.engine.snapshot()
    }

    /// # Errors
    ///
    /// Returns [`SmartdeskError::Closed`](smartdesk_core::SmartdeskError::Closed)
    /// once the monitor has been stopped.
    pub fn subscribe(&self) -> Result<SubjectBoxStream<DashboardState>> {
        self.engine.subscribe()
    }

    pub fn set_low_threshold(&self, low: f32) -> DashboardState {
        self.engine.set_low_threshold(low)
    }

    pub fn set_high_threshold(&self, high: f32) -> DashboardState {
        self.engine.set_high_threshold(high)
    }

    pub fn apply_preset(&self, preset: Preset) -> DashboardState {
        self.engine.apply_preset(preset)
    }

    pub fn toggle_manual_override(&self) -> DashboardState {
        self.engine.toggle_manual_override()
    }

    /// Asks the device to run its timer for `seconds`. Dropped when not connected.
    pub async fn send_timer(&self, seconds: u32) {
        self.link
            .send_control(&ControlMessage::Timer { timer: seconds })
            .await;
    }

    /// Disconnects and switches to the local sensor when the link is up or
    /// searching; otherwise starts discovery again.
    pub async fn toggle_connection(&self) {
        if self.is_stopped() {
            debug!("monitor stopped, ignoring connection toggle");
            return;
        }

        if self.link.is_active() {
            self.link.disconnect().await;
            self.local.start();
            info!("disconnected by user, reading the local sensor");
        } else {
            self.spawn_discovery();
        }
    }

    /// Stops discovery, the link, the local sensor and all tasks, then
    /// flushes pending threshold writes and ends every subscription.
    /// Calling it again is a no-op.
    pub async fn stop(&mut self) {
        if self.is_stopped() {
            return;
        }
        self.cancel_token.cancel();

        self.link.disconnect().await;
        let discovery = self.discovery.lock().take();
        if let Some(handle) = discovery {
            if let Err(e) = handle.await {
                warn!(error = %e, "discovery task failed");
            }
        }
        if let Some(handle) = self.pipeline.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "pipeline task failed");
            }
        }

        self.local.stop();
        self.engine.set_connection(ConnectionState::Disconnected);
        self.writer.stop().await;
        self.engine.close();
        info!("monitor stopped");
    }

    fn spawn_discovery(&self) {
        let link = self.link.clone();
        let handle = tokio::spawn(async move {
            match link.connect().await {
                Ok(peer) => debug!(%peer, "discovery finished"),
                Err(e) if e.is_cancelled() => debug!("discovery cancelled"),
                Err(e) => warn!(error = %e, "discovery failed"),
            }
        });
        // A previous discovery still scanning is cancelled by the new `connect`.
        self.discovery.lock().replace(handle);
    }
}

impl<C: Connector> Drop for Monitor<C> {
    fn drop(&mut self) {
        self.cancel_token.cancel();
        if let Some(handle) = self.discovery.lock().take() {
            handle.abort();
        }
    }
}
