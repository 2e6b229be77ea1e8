// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use async_trait::async_trait;
use parking_lot::Mutex;
use smartdesk_link::Connector;
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::time::Instant;

/// How writes on a [`FaultyStream`] misbehave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteFault {
    /// Every write fails with `BrokenPipe`, after yielding once.
    Broken,
    /// Writes never complete.
    Stalled,
}

/// [`Connector`] whose connections always open but never carry data.
///
/// Reads stay pending forever, so only the write path can detect the fault.
#[derive(Clone)]
pub struct FaultyConnector {
    fault: WriteFault,
    attempts: Arc<Mutex<Vec<(SocketAddr, Instant)>>>,
}

impl FaultyConnector {
    #[must_use]
    pub fn new(fault: WriteFault) -> Self {
        Self {
            fault,
            attempts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    #[must_use]
    pub fn attempts(&self) -> Vec<(SocketAddr, Instant)> {
        self.attempts.lock().clone()
    }

    #[must_use]
    pub fn attempt_count(&self) -> usize {
        self.attempts.lock().len()
    }
}

#[async_trait]
impl Connector for FaultyConnector {
    type Io = FaultyStream;

    async fn connect(&self, addr: SocketAddr) -> io::Result<FaultyStream> {
        self.attempts.lock().push((addr, Instant::now()));
        Ok(FaultyStream {
            fault: self.fault,
            yielded: false,
        })
    }
}

pub struct FaultyStream {
    fault: WriteFault,
    yielded: bool,
}

impl AsyncRead for FaultyStream {
    fn poll_read(self: Pin<&mut Self>, _cx: &mut Context<'_>, _buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        Poll::Pending
    }
}

impl AsyncWrite for FaultyStream {
    fn poll_write(self: Pin<&mut Self>, cx: &mut Context<'_>, _buf: &[u8]) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        match this.fault {
            WriteFault::Stalled => Poll::Pending,
            // Yielding first lets concurrent sends queue on the same session.
            WriteFault::Broken if !this.yielded => {
                this.yielded = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
            WriteFault::Broken => Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe"))),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
