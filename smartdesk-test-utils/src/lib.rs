// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Test utilities and fakes for the smartdesk workspace.
//!
//! Not meant for production code. The fakes stand in for the three things a
//! real deployment talks to:
//!
//! - [`MockConnector`] replaces the network: every connection is an in-memory
//!   duplex pipe whose far end is handed to the test as a [`MockPeer`], and
//!   every attempt is recorded with its (possibly paused) tokio instant.
//! - [`FaultyConnector`] opens connections that stay silent and whose writes
//!   fail or never complete.
//! - [`TestPeer`] is a real TCP listener on loopback for end-to-end tests.
//! - [`MockLightSensor`] replaces the platform light sensor; the test drives
//!   samples with [`MockLightSensor::emit`].
//!
//! ## Using Assertion Helpers
//!
//! ```rust
//! use smartdesk_test_utils::assert_no_element_emitted;
//! use futures::stream;
//!
//! # async fn example() {
//! let mut empty = stream::pending::<i32>();
//! assert_no_element_emitted(&mut empty, 10).await;
//! # }
//! ```

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
pub mod faulty_connector;
pub mod helpers;
pub mod light_sensor;
pub mod mock_connector;
pub mod store;
pub mod tcp_peer;

pub use faulty_connector::{FaultyConnector, FaultyStream, WriteFault};
pub use helpers::{assert_no_element_emitted, assert_stream_ended, unwrap_stream, wait_for_state};
pub use light_sensor::MockLightSensor;
pub use mock_connector::{MockConnector, MockPeer, MockPeers};
pub use store::FailingThresholdStore;
pub use tcp_peer::{PeerStream, TestPeer};

use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// Creates an unbounded channel whose receiving end is a `Stream`.
///
/// ```rust
/// use smartdesk_test_utils::test_channel;
/// use futures::StreamExt;
///
/// # async fn example() {
/// let (tx, mut stream) = test_channel();
/// tx.send(42).unwrap();
/// assert_eq!(stream.next().await, Some(42));
/// # }
/// ```
pub fn test_channel<T: Send + 'static>() -> (mpsc::UnboundedSender<T>, UnboundedReceiverStream<T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (tx, UnboundedReceiverStream::new(rx))
}
