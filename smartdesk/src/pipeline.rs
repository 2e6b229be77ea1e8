// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use futures::stream::{self, BoxStream, SelectAll};
use futures::{Stream, StreamExt};
use smartdesk_core::ConnectionState;
use smartdesk_engine::AlertEngine;
use smartdesk_link::InboundLines;
use smartdesk_telemetry::{FallbackSelector, LocalReadings, TelemetryEvent};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// The three producers merged into one stream of [`TelemetryEvent`]s.
///
/// Order is preserved per producer only.
pub struct TelemetryEvents {
    inner: SelectAll<BoxStream<'static, TelemetryEvent>>,
}

impl TelemetryEvents {
    pub fn new(
        lines: InboundLines,
        readings: LocalReadings,
        connection: watch::Receiver<ConnectionState>,
    ) -> Self {
        let inner = stream::select_all([
            lines.map(TelemetryEvent::RemoteLine).boxed(),
            readings.map(TelemetryEvent::LocalReading).boxed(),
            WatchStream::new(connection).map(TelemetryEvent::Connection).boxed(),
        ]);
        Self { inner }
    }
}

impl Stream for TelemetryEvents {
    type Item = TelemetryEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().inner.poll_next_unpin(cx)
    }
}

/// Feeds every event through the selector into the engine until cancelled.
pub(crate) async fn run(
    mut selector: FallbackSelector,
    engine: AlertEngine,
    mut events: TelemetryEvents,
    cancel_token: CancellationToken,
) {
    loop {
        tokio::select! {
            () = cancel_token.cancelled() => break,
            event = events.next() => match event {
                Some(TelemetryEvent::Connection(state)) => {
                    trace!(%state, "connection changed");
                    selector.on_connection_change(state);
                    engine.set_connection(state);
                }
                Some(event) => {
                    if let Some(reading) = selector.on_event(event) {
                        engine.apply_reading(&reading);
                    }
                }
                None => break,
            },
        }
    }

    selector.shutdown();
    debug!(
        mode = %selector.mode(),
        decoded = selector.decoder().decoded_count(),
        malformed = selector.decoder().malformed_count(),
        "pipeline stopped"
    );
}
