//! Wire messages exchanged between the verifying client and the server.
//!
//! Every message is a run of bytes terminated by a single `\n`. The client
//! sends the literal trigger `LINE\n`; the server answers with one payload
//! built by [`transform`](crate::transform). There is no length prefix.
//!
//! [`FrameReader`] buffers inbound bytes and yields one newline-terminated
//! frame at a time, so a message split across reads, or several messages
//! arriving in one read, are still seen one by one.

use std::io::{self, Read};

use thiserror::Error;

use crate::transform::transform;

/// Request asking the server for its next line. Matched byte for byte.
pub const TRIGGER: &[u8] = b"LINE\n";

/// Largest frame, terminator included, that either side accepts.
pub const MAX_FRAME_BYTES: usize = 64 * 1024;

/// Longest line a cursor will load, so every payload fits in one frame.
pub const MAX_LINE_BYTES: usize = MAX_FRAME_BYTES - 1;

const CHUNK_BYTES: usize = 1024;

/// A protocol message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// The fixed request sent by the client.
    Trigger,
    /// One transformed line, including its terminator.
    Payload(Vec<u8>),
}

impl Message {
    /// Builds the payload answering a trigger with `line`.
    #[must_use]
    pub fn payload_for(line: &[u8]) -> Self {
        Self::Payload(transform(line))
    }

    /// Interprets an inbound request frame. Only an exact trigger is
    /// recognised; anything else yields `None`.
    #[must_use]
    pub fn parse_request(frame: &[u8]) -> Option<Self> {
        (frame == TRIGGER).then_some(Self::Trigger)
    }

    /// Encoded bytes of the message.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Trigger => TRIGGER,
            Self::Payload(payload) => payload,
        }
    }
}

/// Errors raised while reading frames.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The underlying stream failed.
    #[error("failed to read from stream: {0}")]
    Io(#[from] io::Error),
    /// The peer sent a frame longer than the limit.
    #[error("frame exceeds {limit} bytes")]
    TooLong {
        /// Limit that was exceeded.
        limit: usize,
    },
}

/// Splits a byte stream into newline-terminated frames.
#[derive(Debug)]
pub struct FrameReader<R> {
    inner: R,
    buffer: Vec<u8>,
    limit: usize,
}

impl<R: Read> FrameReader<R> {
    /// Wraps `inner` with the default frame limit.
    pub const fn new(inner: R) -> Self {
        Self::with_limit(inner, MAX_FRAME_BYTES)
    }

    /// Wraps `inner`, rejecting frames longer than `limit` bytes.
    pub const fn with_limit(inner: R, limit: usize) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
            limit,
        }
    }

    /// Mutable access to the wrapped stream, for writing replies.
    pub const fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Consumes the reader and returns the wrapped stream.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Reads the next frame, terminator included.
    ///
    /// Returns `Ok(None)` once the peer has closed and no bytes remain. Bytes
    /// left without a terminator at close are returned as a final frame. A
    /// frame of more than `limit` bytes, terminator included, is rejected
    /// however the bytes were split across reads.
    pub fn read_frame(&mut self) -> Result<Option<Vec<u8>>, FrameError> {
        let mut chunk = [0_u8; CHUNK_BYTES];
        loop {
            if let Some(end) = self.buffer.iter().position(|byte| *byte == b'\n') {
                if end >= self.limit {
                    return Err(FrameError::TooLong { limit: self.limit });
                }
                let frame: Vec<u8> = self.buffer.drain(..=end).collect();
                return Ok(Some(frame));
            }
            if self.buffer.len() >= self.limit {
                return Err(FrameError::TooLong { limit: self.limit });
            }

            let read = read_chunk_with_retry(&mut self.inner, &mut chunk)?;
            if read == 0 {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(std::mem::take(&mut self.buffer)));
            }
            self.buffer.extend_from_slice(chunk.get(..read).unwrap_or_default());
        }
    }
}

fn read_chunk_with_retry<R: Read>(stream: &mut R, chunk: &mut [u8]) -> io::Result<usize> {
    loop {
        match stream.read(chunk) {
            Ok(read) => return Ok(read),
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            Err(error) => return Err(error),
        }
    }
}
