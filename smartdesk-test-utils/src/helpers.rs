// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use futures::stream::StreamExt;
use futures::Stream;
use smartdesk_core::ConnectionState;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{sleep, timeout};

pub async fn assert_no_element_emitted<S, T>(stream: &mut S, timeout_ms: u64)
where
    S: Stream<Item = T> + Unpin,
{
    tokio::select! {
        _item = stream.next() => {
            panic!("Unexpected element emitted, expected no output.");
        }
        () = sleep(Duration::from_millis(timeout_ms)) => {}
    }
}

/// Waits for the next element, panicking on timeout or end of stream.
pub async fn unwrap_stream<S, T>(stream: &mut S, timeout_ms: u64) -> T
where
    S: Stream<Item = T> + Unpin,
{
    match timeout(Duration::from_millis(timeout_ms), stream.next()).await {
        Ok(Some(item)) => item,
        Ok(None) => panic!("Expected element but stream ended"),
        Err(_) => panic!("Timeout: No item received within {timeout_ms} ms"),
    }
}

pub async fn assert_stream_ended<S, T>(stream: &mut S, timeout_ms: u64)
where
    S: Stream<Item = T> + Unpin,
{
    match timeout(Duration::from_millis(timeout_ms), stream.next()).await {
        Ok(None) => {}
        Ok(Some(_)) => panic!("Expected stream to end but it emitted an element"),
        Err(_) => panic!("Timeout: stream did not end within {timeout_ms} ms"),
    }
}

/// Waits until the watched connection state equals `expected`.
pub async fn wait_for_state(
    watch: &mut watch::Receiver<ConnectionState>,
    expected: ConnectionState,
    timeout_ms: u64,
) {
    let reached = timeout(
        Duration::from_millis(timeout_ms),
        watch.wait_for(|state| *state == expected),
    )
    .await;
    match reached {
        Ok(Ok(_)) => {}
        Ok(Err(_)) => panic!("Link dropped before reaching {expected}"),
        Err(_) => panic!("Timeout: link not {expected} within {timeout_ms} ms"),
    }
}
