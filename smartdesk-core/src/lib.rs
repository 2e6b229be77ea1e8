// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! Core types shared by every smartdesk crate.
//!
//! - [`Reading`] and [`Source`]: one intensity sample and where it came from
//! - [`ConnectionState`]: transport state published by the link
//! - [`SensorMessage`] / [`ControlMessage`]: the line-oriented JSON wire payloads
//! - [`StateSubject`]: hot broadcaster used to publish state snapshots
//! - [`SmartdeskError`]: the crate-wide error type
pub mod connection;
pub mod error;
pub mod message;
pub mod reading;
pub mod state_subject;
pub mod subject_error;

pub use self::connection::ConnectionState;
pub use self::error::{Result, SmartdeskError};
pub use self::message::{ControlMessage, SensorMessage};
pub use self::reading::{Reading, Source};
pub use self::state_subject::{StateSubject, SubjectBoxStream};
pub use self::subject_error::SubjectError;
