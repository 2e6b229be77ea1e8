// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Hot, multi-subscriber subject used to publish state snapshots.
//!
//! A [`StateSubject`] hands every value it receives to all active subscribers.
//!
//! ## Characteristics
//!
//! - **Hot**: late subscribers only see values sent after they subscribed.
//! - **Lossless**: every subscriber has its own unbounded queue, so no
//!   intermediate snapshot is coalesced away.
//! - **Ordered**: `next` enqueues under the subject lock, so all subscribers
//!   observe values in the same order.
//! - **Thread-safe**: cheap to clone; all clones share the same state.
//!
//! ## Example
//!
//! ```
//! use smartdesk_core::StateSubject;
//! use futures::StreamExt;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let subject = StateSubject::<u32>::new();
//! let mut stream = subject.subscribe().unwrap();
//!
//! subject.next(1).unwrap();
//! subject.next(2).unwrap();
//! subject.close();
//!
//! assert_eq!(stream.next().await, Some(1));
//! assert_eq!(stream.next().await, Some(2));
//! assert_eq!(stream.next().await, None);
//! # }
//! ```

use crate::SubjectError;
use async_channel::Sender;
use futures::Stream;
use parking_lot::Mutex;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed stream handed out by [`StateSubject::subscribe`].
pub type SubjectBoxStream<T> = Pin<Box<dyn Stream<Item = T> + Send + Sync + 'static>>;

struct SubjectState<T> {
    closed: bool,
    senders: Vec<Sender<T>>,
}

/// A hot, unbounded subject that broadcasts values to all current subscribers.
pub struct StateSubject<T: Clone + Send + Sync + 'static> {
    state: Arc<Mutex<SubjectState<T>>>,
}

impl<T: Clone + Send + Sync + 'static> StateSubject<T> {
    /// Creates an open subject with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SubjectState {
                closed: false,
                senders: Vec::new(),
            })),
        }
    }

    /// Subscribe to values sent from now on.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError::Closed` if the subject has been closed.
    pub fn subscribe(&self) -> Result<SubjectBoxStream<T>, SubjectError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(SubjectError::Closed);
        }

        let (tx, rx) = async_channel::unbounded();
        state.senders.push(tx);
        Ok(Box::pin(rx))
    }

    /// Send a value to all active subscribers, pruning the ones that went away.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError::Closed` if the subject has been closed.
    pub fn next(&self, value: T) -> Result<(), SubjectError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(SubjectError::Closed);
        }

        state
            .senders
            .retain(|tx| tx.try_send(value.clone()).is_ok());
        Ok(())
    }

    /// Closes the subject, completing all subscriber streams.
    ///
    /// Closing is idempotent.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        state.senders.clear();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Number of subscribers still attached.
    ///
    /// Dropped subscribers are removed lazily on the next `next()` call.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.state.lock().senders.len()
    }
}

impl<T: Clone + Send + Sync + 'static> Default for StateSubject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync + 'static> Clone for StateSubject<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}
