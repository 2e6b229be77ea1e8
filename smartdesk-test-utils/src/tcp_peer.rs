// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use smartdesk_link::LinkConfig;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

/// A device listening on loopback.
pub struct TestPeer {
    listener: TcpListener,
    addr: SocketAddr,
}

impl TestPeer {
    pub async fn bind() -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        Ok(Self { listener, addr })
    }

    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// A link configuration whose only candidate is this peer, with short
    /// timeouts and backoff.
    #[must_use]
    pub fn link_config(&self) -> LinkConfig {
        LinkConfig {
            prefixes: vec!["127.0.0".to_owned()],
            first_host: 1,
            last_host: 1,
            port: self.addr.port(),
            attempt_timeout_ms: 200,
            initial_backoff_ms: 20,
            max_backoff_ms: 100,
            ..LinkConfig::default()
        }
    }

    /// # Panics
    ///
    /// Panics if nobody connects within `timeout_ms`.
    pub async fn accept(&self, timeout_ms: u64) -> io::Result<PeerStream> {
        let (stream, _) = match timeout(Duration::from_millis(timeout_ms), self.listener.accept()).await {
            Ok(accepted) => accepted?,
            Err(_) => panic!("Timeout: No connection accepted within {timeout_ms} ms"),
        };
        Ok(PeerStream {
            reader: BufReader::new(stream),
        })
    }
}

/// The device side of one accepted TCP connection.
pub struct PeerStream {
    reader: BufReader<TcpStream>,
}

impl PeerStream {
    pub async fn send_line(&mut self, line: &str) -> io::Result<()> {
        let stream = self.reader.get_mut();
        stream.write_all(line.as_bytes()).await?;
        stream.write_all(b"\n").await?;
        stream.flush().await
    }

    pub async fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_owned()))
    }
}
