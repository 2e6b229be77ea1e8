// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use async_trait::async_trait;
use parking_lot::Mutex;
use smartdesk_link::Connector;
use std::collections::HashSet;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};
use tokio::sync::mpsc;
use tokio::time::{timeout, Instant};

const PIPE_CAPACITY: usize = 64 * 1024;

#[derive(Default)]
struct State {
    reachable: HashSet<SocketAddr>,
    hang: bool,
    attempts: Vec<(SocketAddr, Instant)>,
}

/// In-memory [`Connector`].
///
/// Addresses marked reachable answer with a duplex pipe whose far end is
/// delivered to [`MockPeers`]; every other address is refused at once, or
/// never answers while [`hang`](Self::hang) is set.
#[derive(Clone)]
pub struct MockConnector {
    state: Arc<Mutex<State>>,
    peers: mpsc::UnboundedSender<MockPeer>,
}

impl MockConnector {
    #[must_use]
    pub fn new() -> (Self, MockPeers) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connector = Self {
            state: Arc::new(Mutex::new(State::default())),
            peers: tx,
        };
        (connector, MockPeers { rx })
    }

    pub fn set_reachable(&self, addr: SocketAddr, reachable: bool) {
        let mut state = self.state.lock();
        if reachable {
            state.reachable.insert(addr);
        } else {
            state.reachable.remove(&addr);
        }
    }

    /// Unreachable addresses never answer instead of refusing.
    pub fn hang(&self, hang: bool) {
        self.state.lock().hang = hang;
    }

    #[must_use]
    pub fn attempts(&self) -> Vec<(SocketAddr, Instant)> {
        self.state.lock().attempts.clone()
    }

    #[must_use]
    pub fn attempt_count(&self) -> usize {
        self.state.lock().attempts.len()
    }
}

#[async_trait]
impl Connector for MockConnector {
    type Io = DuplexStream;

    async fn connect(&self, addr: SocketAddr) -> io::Result<DuplexStream> {
        let (reachable, hang) = {
            let mut state = self.state.lock();
            state.attempts.push((addr, Instant::now()));
            (state.reachable.contains(&addr), state.hang)
        };

        if reachable {
            let (local, remote) = tokio::io::duplex(PIPE_CAPACITY);
            let peer = MockPeer {
                addr,
                reader: BufReader::new(remote),
            };
            if self.peers.send(peer).is_err() {
                return Err(io::Error::new(io::ErrorKind::ConnectionRefused, "no peer listening"));
            }
            return Ok(local);
        }

        if hang {
            std::future::pending::<()>().await;
        }
        Err(io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"))
    }
}

/// Far ends of the connections handed out by a [`MockConnector`].
pub struct MockPeers {
    rx: mpsc::UnboundedReceiver<MockPeer>,
}

impl MockPeers {
    /// Next connection the link opened.
    ///
    /// # Panics
    ///
    /// Panics if no connection is opened within `timeout_ms`.
    pub async fn accept(&mut self, timeout_ms: u64) -> MockPeer {
        match timeout(Duration::from_millis(timeout_ms), self.rx.recv()).await {
            Ok(Some(peer)) => peer,
            Ok(None) => panic!("Connector dropped before a connection was opened"),
            Err(_) => panic!("Timeout: No connection opened within {timeout_ms} ms"),
        }
    }
}

/// The device side of one in-memory connection.
pub struct MockPeer {
    addr: SocketAddr,
    reader: BufReader<DuplexStream>,
}

impl MockPeer {
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub async fn send_line(&mut self, line: &str) -> io::Result<()> {
        let stream = self.reader.get_mut();
        stream.write_all(line.as_bytes()).await?;
        stream.write_all(b"\n").await?;
        stream.flush().await
    }

    /// Next line written by the link, without its terminator, or `None` once
    /// the link closed its end.
    pub async fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_owned()))
    }
}
