// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Error types for the smartdesk telemetry client
//!
//! Most failures in this system are absorbed where they happen: transport errors
//! end in a reconnect, malformed payloads are dropped and counted, out-of-range
//! thresholds are clamped. [`SmartdeskError`] covers what is left over and is
//! what the few fallible public operations return.
//!
//! # Examples
//!
//! ```
//! use smartdesk_core::{Result, SmartdeskError};
//!
//! fn discover() -> Result<()> {
//!     Err(SmartdeskError::Cancelled)
//! }
//!
//! assert!(!discover().unwrap_err().is_recoverable());
//! ```

use std::io;

/// Root error type for all smartdesk operations
#[derive(Debug, thiserror::Error)]
pub enum SmartdeskError {
    /// The owner cancelled discovery or the connection before it completed.
    ///
    /// This is the only terminal condition of the link; every other transport
    /// failure is retried.
    #[error("Operation cancelled by owner")]
    Cancelled,

    /// A transport or persistence I/O operation failed
    #[error("I/O error: {context}: {source}")]
    Io {
        /// What was being attempted
        context: String,
        /// The underlying error
        #[source]
        source: io::Error,
    },

    /// A payload or configuration document could not be decoded
    #[error("Decode error: {context}")]
    Decode {
        /// Description of the malformed input
        context: String,
    },

    /// The state subject has been closed and no longer accepts subscribers
    #[error("State subject is closed")]
    Closed,
}

impl SmartdeskError {
    /// Wrap an I/O error with a description of the failed operation
    pub fn io_error(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a decode error with the given context
    pub fn decode_error(context: impl Into<String>) -> Self {
        Self::Decode {
            context: context.into(),
        }
    }

    /// Check if this is a transient error that a retry may resolve
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Check if this error was caused by an explicit cancellation
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<serde_json::Error> for SmartdeskError {
    fn from(error: serde_json::Error) -> Self {
        Self::decode_error(error.to_string())
    }
}

impl From<crate::SubjectError> for SmartdeskError {
    fn from(error: crate::SubjectError) -> Self {
        match error {
            crate::SubjectError::Closed => Self::Closed,
        }
    }
}

/// Specialized Result type for smartdesk operations
pub type Result<T> = std::result::Result<T, SmartdeskError>;
