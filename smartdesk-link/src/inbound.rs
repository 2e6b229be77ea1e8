// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use futures::Stream;
use pin_project::pin_project;
use std::cmp;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_util::bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;

/// Lines received from the peer, across every session of the link.
///
/// The stream survives reconnects: lines from a new session simply follow the
/// ones from the previous session. It ends only once the link and all of its
/// tasks have been dropped.
#[pin_project]
pub struct InboundLines {
    #[pin]
    inner: UnboundedReceiverStream<String>,
}

impl InboundLines {
    pub(crate) fn new(receiver: mpsc::UnboundedReceiver<String>) -> Self {
        Self {
            inner: UnboundedReceiverStream::new(receiver),
        }
    }
}

impl Stream for InboundLines {
    type Item = String;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.project().inner.poll_next(cx)
    }
}

/// One frame of the peer's byte stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Frame {
    /// A complete line without its terminator, decoded lossily as UTF-8.
    Line(String),
    /// A line longer than the configured maximum; its bytes were discarded.
    Oversized,
}

/// Newline-delimited framing with a length cap.
///
/// An oversized line is reported once as [`Frame::Oversized`] and skipped up
/// to its terminating newline, so the lines after it keep flowing.
#[derive(Debug)]
pub(crate) struct LineCodec {
    max_length: usize,
    next_index: usize,
    discarding: bool,
}

impl LineCodec {
    pub(crate) fn new(max_length: usize) -> Self {
        Self {
            max_length,
            next_index: 0,
            discarding: false,
        }
    }
}

impl Decoder for LineCodec {
    type Item = Frame;
    type Error = io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> io::Result<Option<Frame>> {
        loop {
            let read_to = cmp::min(self.max_length.saturating_add(1), buf.len());
            let newline = buf[self.next_index..read_to].iter().position(|b| *b == b'\n');

            match (self.discarding, newline) {
                (true, Some(offset)) => {
                    buf.advance(self.next_index + offset + 1);
                    self.next_index = 0;
                    self.discarding = false;
                }
                (true, None) => {
                    buf.advance(read_to);
                    self.next_index = 0;
                    if buf.is_empty() {
                        return Ok(None);
                    }
                }
                (false, Some(offset)) => {
                    let end = self.next_index + offset;
                    self.next_index = 0;
                    let raw = buf.split_to(end + 1);
                    return Ok(Some(Frame::line(&raw[..end])));
                }
                (false, None) if buf.len() > self.max_length => {
                    self.discarding = true;
                    return Ok(Some(Frame::Oversized));
                }
                (false, None) => {
                    self.next_index = read_to;
                    return Ok(None);
                }
            }
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> io::Result<Option<Frame>> {
        if let Some(frame) = self.decode(buf)? {
            return Ok(Some(frame));
        }
        self.next_index = 0;
        if self.discarding || buf.is_empty() {
            buf.clear();
            return Ok(None);
        }
        let raw = buf.split();
        Ok(Some(Frame::line(&raw)))
    }
}

impl Frame {
    fn line(raw: &[u8]) -> Self {
        let line = String::from_utf8_lossy(raw);
        Self::Line(line.trim_end_matches(['\r', '\n']).to_owned())
    }
}
