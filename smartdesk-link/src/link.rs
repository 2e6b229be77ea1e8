// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The self-healing peer link.
//!
//! Two tokens govern every task the link spawns:
//!
//! - the **run token** stands for the owner's wish to be connected. `connect`
//!   installs a fresh one, `disconnect` cancels it. Discovery, backoff waits
//!   and reconnects all race against it, and nothing reconnects once it is
//!   cancelled.
//! - the **session token** is a child of the run token and lives as long as one
//!   established stream. Tearing a session down cancels it, which stops that
//!   session's read loop without triggering a reconnect.

use crate::inbound::{Frame, LineCodec};
use crate::{Backoff, Connector, InboundLines, LinkConfig, TcpConnector};
use futures::StreamExt;
use parking_lot::Mutex;
use smartdesk_core::{ConnectionState, ControlMessage, Result, SmartdeskError};
use std::net::SocketAddr;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::sync::{mpsc, watch, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tokio_util::codec::FramedRead;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

/// Discovery & connection manager for the single active peer.
///
/// Cheap to clone; all clones drive the same connection. The link keeps
/// itself alive through its session tasks, so owners must call
/// [`disconnect`](Self::disconnect) to release the socket.
pub struct Link<C: Connector = TcpConnector> {
    shared: Arc<Shared<C>>,
}

struct Shared<C: Connector> {
    config: LinkConfig,
    connector: C,
    state: watch::Sender<ConnectionState>,
    inbound: mpsc::UnboundedSender<String>,
    control: Mutex<Control<C::Io>>,
    backoff: Mutex<Backoff>,
    oversized: AtomicU64,
}

struct Control<Io> {
    run: CancellationToken,
    session: Option<Session<Io>>,
    next_session_id: u64,
}

struct Session<Io> {
    id: u64,
    peer: SocketAddr,
    token: CancellationToken,
    reader: JoinHandle<()>,
    writer: Arc<AsyncMutex<WriteHalf<Io>>>,
}

impl Link<TcpConnector> {
    /// A link that connects over plain TCP.
    #[must_use]
    pub fn tcp(config: LinkConfig) -> (Self, InboundLines) {
        Self::new(config, TcpConnector)
    }
}

impl<C: Connector> Link<C> {
    /// Creates an idle link and the stream its inbound lines are published on.
    ///
    /// Nothing happens until [`connect`](Self::connect) is called.
    #[must_use]
    pub fn new(config: LinkConfig, connector: C) -> (Self, InboundLines) {
        let (inbound, receiver) = mpsc::unbounded_channel();
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        let idle = CancellationToken::new();
        idle.cancel();

        let link = Self {
            shared: Arc::new(Shared {
                backoff: Mutex::new(config.backoff()),
                config,
                connector,
                state,
                inbound,
                control: Mutex::new(Control {
                    run: idle,
                    session: None,
                    next_session_id: 0,
                }),
                oversized: AtomicU64::new(0),
            }),
        };
        (link, InboundLines::new(receiver))
    }

    #[must_use]
    pub fn config(&self) -> &LinkConfig {
        &self.shared.config
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.shared.state.borrow()
    }

    /// Receiver that observes every connection state change.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state.subscribe()
    }

    /// Address of the peer of the current session, if any.
    #[must_use]
    pub fn peer(&self) -> Option<SocketAddr> {
        self.shared.control.lock().session.as_ref().map(|s| s.peer)
    }

    /// Inbound lines dropped for exceeding
    /// [`max_line_length`](LinkConfig::max_line_length), across all sessions.
    #[must_use]
    pub fn oversized_lines(&self) -> u64 {
        self.shared.oversized.load(Ordering::Relaxed)
    }

    /// Whether the owner currently wants the link up (between `connect` and `disconnect`).
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.shared.control.lock().run.is_cancelled()
    }

    /// Tears down any current connection, then scans for the peer until one
    /// answers.
    ///
    /// Failed passes over the candidate range are retried after the backoff
    /// interval, indefinitely. Once connected, the link keeps itself connected
    /// until [`disconnect`](Self::disconnect).
    ///
    /// # Errors
    ///
    /// Returns [`SmartdeskError::Cancelled`] if `disconnect` (or another
    /// `connect`) is called before a peer is found. Individual socket errors
    /// never surface here.
    pub async fn connect(&self) -> Result<SocketAddr> {
        let run = CancellationToken::new();
        let previous = {
            let mut control = self.shared.control.lock();
            let old = std::mem::replace(&mut control.run, run.clone());
            old.cancel();
            control.session.take()
        };
        if let Some(session) = previous {
            self.close_session(session).await;
        }

        info!(
            prefixes = ?self.shared.config.prefixes,
            port = self.shared.config.port,
            "starting peer discovery"
        );
        self.discover(run).await
    }

    /// Stops discovery, any pending backoff wait and the current session.
    ///
    /// The link stays down until the next [`connect`](Self::connect). Safe to
    /// call any number of times.
    pub async fn disconnect(&self) {
        let session = {
            let mut control = self.shared.control.lock();
            control.run.cancel();
            self.shared.state.send_replace(ConnectionState::Disconnected);
            control.session.take()
        };
        if let Some(session) = session {
            let peer = session.peer;
            self.close_session(session).await;
            info!(%peer, "disconnected");
        }
    }

    /// Writes one line to the peer.
    ///
    /// Best effort: without a connection the message is dropped. A failed
    /// write, or one that does not complete within the attempt timeout, is
    /// logged and sends the link through the reconnect path.
    pub async fn send(&self, message: &str) {
        let session = {
            let control = self.shared.control.lock();
            control.session.as_ref().map(|s| (s.id, s.writer.clone()))
        };
        let Some((session_id, writer)) = session else {
            debug!(dropped = message, "not connected, dropping outbound message");
            return;
        };

        let mut line = String::with_capacity(message.len() + 1);
        line.push_str(message.trim_end_matches(['\r', '\n']));
        line.push('\n');

        let write = async {
            let mut writer = writer.lock().await;
            writer.write_all(line.as_bytes()).await?;
            writer.flush().await
        };
        let written = match timeout(self.shared.config.attempt_timeout(), write).await {
            Ok(written) => written,
            Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "write timed out")),
        };
        if let Err(e) = written {
            warn!(error = %e, "write failed, connection presumed dead");
            self.trigger_reconnect(session_id);
        }
    }

    /// Serializes a control command and sends it as one line.
    pub async fn send_control(&self, message: &ControlMessage) {
        match message.to_line() {
            Ok(line) => self.send(&line).await,
            Err(e) => warn!(error = %e, "cannot encode control message"),
        }
    }

    async fn discover(&self, run: CancellationToken) -> Result<SocketAddr> {
        loop {
            self.transition(&run, ConnectionState::Scanning)?;

            if let Some((io, peer)) = self.scan(&run).await? {
                return self.establish(io, peer, &run);
            }

            let delay = self.shared.backoff.lock().next_delay();
            warn!(
                delay_ms = delay.as_millis() as u64,
                "no peer answered, retrying discovery after backoff"
            );
            if !wait(&run, delay).await {
                return Err(SmartdeskError::Cancelled);
            }
        }
    }

    /// One sequential pass over every candidate; the first peer that answers wins.
    async fn scan(&self, run: &CancellationToken) -> Result<Option<(C::Io, SocketAddr)>> {
        let attempt_timeout = self.shared.config.attempt_timeout();

        for addr in self.shared.config.candidates() {
            if run.is_cancelled() {
                return Err(SmartdeskError::Cancelled);
            }

            let attempt = timeout(attempt_timeout, self.shared.connector.connect(addr));
            tokio::select! {
                () = run.cancelled() => return Err(SmartdeskError::Cancelled),
                outcome = attempt => match outcome {
                    Ok(Ok(io)) => return Ok(Some((io, addr))),
                    Ok(Err(e)) => trace!(%addr, error = %e, "candidate refused"),
                    Err(_) => trace!(%addr, "candidate timed out"),
                },
            }
        }
        Ok(None)
    }

    fn establish(&self, io: C::Io, peer: SocketAddr, run: &CancellationToken) -> Result<SocketAddr> {
        let (reader, writer) = tokio::io::split(io);

        let mut control = self.shared.control.lock();
        if run.is_cancelled() {
            return Err(SmartdeskError::Cancelled);
        }

        let id = control.next_session_id;
        control.next_session_id += 1;
        let token = run.child_token();
        let reader = tokio::spawn(
            self.clone().read_loop(
                id,
                FramedRead::new(reader, LineCodec::new(self.shared.config.max_line_length)),
                token.clone(),
            ),
        );
        let session = Session {
            id,
            peer,
            token,
            reader,
            writer: Arc::new(AsyncMutex::new(writer)),
        };
        if let Some(stale) = control.session.replace(session) {
            stale.token.cancel();
            stale.reader.abort();
        }

        self.shared.backoff.lock().reset();
        self.shared.state.send_replace(ConnectionState::Connected);
        info!(%peer, "connected to peer");
        Ok(peer)
    }

    async fn read_loop(
        self,
        session_id: u64,
        mut frames: FramedRead<ReadHalf<C::Io>, LineCodec>,
        token: CancellationToken,
    ) {
        loop {
            tokio::select! {
                () = token.cancelled() => return,
                frame = frames.next() => match frame {
                    Some(Ok(Frame::Line(line))) => {
                        if !line.is_empty() && self.shared.inbound.send(line).is_err() {
                            debug!("inbound stream dropped, discarding line");
                        }
                    }
                    Some(Ok(Frame::Oversized)) => {
                        let dropped = self.shared.oversized.fetch_add(1, Ordering::Relaxed) + 1;
                        debug!(
                            max_line_length = self.shared.config.max_line_length,
                            dropped,
                            "discarding oversized inbound line"
                        );
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "read failed");
                        break;
                    }
                    None => {
                        warn!("peer closed the stream");
                        break;
                    }
                },
            }
        }

        if !token.is_cancelled() {
            self.trigger_reconnect(session_id);
        }
    }

    /// Drops the given session and reconnects after the current backoff.
    ///
    /// Ignored when the owner has disconnected, or when the session is no
    /// longer current, which is also what collapses a read failure and a
    /// write failure on the same session into one reconnect.
    fn trigger_reconnect(&self, session_id: u64) {
        let (run, session) = {
            let mut control = self.shared.control.lock();
            let current = control.session.as_ref().map(|s| s.id);
            if control.run.is_cancelled() || current != Some(session_id) {
                return;
            }
            self.shared.state.send_replace(ConnectionState::Scanning);
            (control.run.clone(), control.session.take())
        };

        let link = self.clone();
        tokio::spawn(async move {
            if let Some(session) = session {
                link.close_session(session).await;
            }
            let delay = link.shared.backoff.lock().next_delay();
            info!(delay_ms = delay.as_millis() as u64, "reconnecting after backoff");
            if !wait(&run, delay).await {
                return;
            }
            if let Err(e) = link.discover(run).await {
                debug!(error = %e, "reconnect abandoned");
            }
        });
    }

    async fn close_session(&self, session: Session<C::Io>) {
        session.token.cancel();
        session.reader.abort();
        // A send in flight holds the writer until its write timeout; the
        // socket closes once that send drops its handle.
        if let Ok(mut writer) = session.writer.try_lock() {
            let _ = timeout(self.shared.config.attempt_timeout(), writer.shutdown()).await;
        }
        trace!(peer = %session.peer, "session closed");
    }

    /// Publishes `state` unless `run` was cancelled; checked under the control
    /// lock so it cannot overwrite the `Disconnected` set by `disconnect`.
    fn transition(&self, run: &CancellationToken, state: ConnectionState) -> Result<()> {
        let _control = self.shared.control.lock();
        if run.is_cancelled() {
            return Err(SmartdeskError::Cancelled);
        }
        self.shared.state.send_replace(state);
        Ok(())
    }
}

impl<C: Connector> Clone for Link<C> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

/// Sleeps for `delay`; `false` if `run` was cancelled first.
async fn wait(run: &CancellationToken, delay: Duration) -> bool {
    tokio::select! {
        () = run.cancelled() => false,
        () = sleep(delay) => true,
    }
}
