// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! Discovery and connection management for the smartdesk peer.
//!
//! The [`Link`] scans a small, fixed set of `/24` prefixes for a device
//! listening on a known port, keeps one line-oriented duplex stream open to
//! it, and heals itself: any read or write failure tears the session down and
//! reconnects after an exponential [`Backoff`]. Only [`Link::disconnect`]
//! stops it.
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use smartdesk_link::{Link, LinkConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> smartdesk_core::Result<()> {
//! let (link, mut lines) = Link::tcp(LinkConfig::default());
//!
//! let peer = link.connect().await?;
//! println!("connected to {peer}");
//!
//! while let Some(line) = lines.next().await {
//!     println!("{line}");
//! }
//! # Ok(())
//! # }
//! ```
pub mod backoff;
pub mod config;
pub mod connector;
pub mod inbound;
pub mod link;

pub use self::backoff::Backoff;
pub use self::config::LinkConfig;
pub use self::connector::{Connector, TcpConnector};
pub use self::inbound::InboundLines;
pub use self::link::Link;
