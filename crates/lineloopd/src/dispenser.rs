//! Per-connection request loop answering triggers with the next line.
//!
//! A [`Dispenser`] moves through three states. It starts `Listening` while
//! the server waits for a peer, becomes `Serving` once it owns a connection,
//! and ends `Closed` when the peer hangs up or the stream fails. It never
//! leaves `Closed`.

use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex, PoisonError};

use clap::ValueEnum;
use thiserror::Error;
use tracing::debug;

use lineloop_core::{FrameError, FrameReader, LineCursor, Message};

const DISPENSER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispenser");

/// Reply sent for unrecognised requests under [`MismatchPolicy::ReplyError`].
pub const ERROR_REPLY: &[u8] = b"ERROR unrecognised request\n";

/// What to do with a request frame that is not the trigger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum MismatchPolicy {
    /// Drop the frame silently and keep reading.
    #[default]
    Ignore,
    /// Answer with an error line and keep reading.
    ReplyError,
}

/// Lifecycle state of a dispenser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispenserState {
    /// Waiting for a connection.
    Listening,
    /// Serving one connection.
    Serving,
    /// The connection has ended.
    Closed,
}

/// Counters for one served connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeOutcome {
    /// Payloads written in answer to triggers.
    pub dispensed: u64,
    /// Frames that did not match the trigger.
    pub unrecognised: u64,
}

/// Errors that end a connection early.
#[derive(Debug, Error)]
pub enum ServeError {
    /// Reading a request frame failed.
    #[error("failed to read request: {0}")]
    Read(#[source] FrameError),
    /// Writing a reply failed.
    #[error("failed to write reply: {0}")]
    Write(#[source] io::Error),
}

/// Cursor shared between connection handlers.
///
/// Lines are handed out in file order across every holder of a clone.
#[derive(Debug, Clone)]
pub struct SharedCursor {
    inner: Arc<Mutex<LineCursor>>,
}

impl SharedCursor {
    /// Wraps `cursor` for sharing.
    #[must_use]
    pub fn new(cursor: LineCursor) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cursor)),
        }
    }

    /// Takes the next line from the shared cursor.
    #[must_use]
    pub fn next_line(&self) -> Vec<u8> {
        // A panicking holder cannot leave the position out of range.
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next_line()
    }
}

/// Answers trigger requests on a single connection.
#[derive(Debug)]
pub struct Dispenser {
    cursor: SharedCursor,
    policy: MismatchPolicy,
    state: DispenserState,
}

impl Dispenser {
    /// Builds a dispenser in the `Listening` state.
    #[must_use]
    pub const fn new(cursor: SharedCursor, policy: MismatchPolicy) -> Self {
        Self {
            cursor,
            policy,
            state: DispenserState::Listening,
        }
    }

    /// Cursor the dispenser draws lines from.
    #[must_use]
    pub const fn cursor(&self) -> &SharedCursor {
        &self.cursor
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> DispenserState {
        self.state
    }

    /// Serves `stream` until the peer closes it or an I/O error occurs.
    ///
    /// A clean close by the peer yields `Ok`; the dispenser is `Closed` on
    /// return either way.
    pub fn serve<S: Read + Write>(&mut self, stream: S) -> Result<ServeOutcome, ServeError> {
        self.state = DispenserState::Serving;
        let result = self.serve_frames(stream);
        self.state = DispenserState::Closed;
        result
    }

    fn serve_frames<S: Read + Write>(&self, stream: S) -> Result<ServeOutcome, ServeError> {
        let mut frames = FrameReader::new(stream);
        let mut outcome = ServeOutcome::default();
        while let Some(frame) = frames.read_frame().map_err(ServeError::Read)? {
            if Message::parse_request(&frame).is_some() {
                let payload = Message::payload_for(&self.cursor.next_line());
                write_reply(frames.get_mut(), payload.as_bytes())?;
                outcome.dispensed += 1;
                continue;
            }

            outcome.unrecognised += 1;
            debug!(
                target: DISPENSER_TARGET,
                frame_bytes = frame.len(),
                policy = ?self.policy,
                "unrecognised request"
            );
            if self.policy == MismatchPolicy::ReplyError {
                write_reply(frames.get_mut(), ERROR_REPLY)?;
            }
        }
        Ok(outcome)
    }
}

fn write_reply<W: Write>(stream: &mut W, bytes: &[u8]) -> Result<(), ServeError> {
    stream.write_all(bytes).map_err(ServeError::Write)?;
    stream.flush().map_err(ServeError::Write)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use lineloop_core::MemoryLineSource;
    use rstest::{fixture, rstest};

    use super::*;

    /// In-memory duplex stream: reads scripted input, records output.
    struct ScriptedStream {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
        fail_writes: bool,
    }

    impl ScriptedStream {
        fn new(input: &[u8]) -> Self {
            Self {
                input: Cursor::new(input.to_vec()),
                output: Vec::new(),
                fail_writes: false,
            }
        }

        fn failing_writes(input: &[u8]) -> Self {
            Self {
                fail_writes: true,
                ..Self::new(input)
            }
        }
    }

    impl Read for ScriptedStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for ScriptedStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.fail_writes {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer gone"));
            }
            self.output.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[fixture]
    fn cursor() -> SharedCursor {
        let source = MemoryLineSource::new("memory", ["apple", "Banana"]);
        SharedCursor::new(LineCursor::from_source(source).expect("open cursor"))
    }

    #[rstest]
    fn answers_each_trigger_with_the_next_line(cursor: SharedCursor) {
        let mut stream = ScriptedStream::new(b"LINE\nLINE\nLINE\n");
        let mut dispenser = Dispenser::new(cursor, MismatchPolicy::Ignore);
        let outcome = dispenser.serve(&mut stream).expect("serve");
        assert_eq!(stream.output, b"APPLE\nBANANA\nAPPLE\n");
        assert_eq!(outcome.dispensed, 3);
        assert_eq!(dispenser.state(), DispenserState::Closed);
    }

    #[rstest]
    #[case(b"hello\nLINE\n".as_slice())]
    #[case(b"line\nLINE\n".as_slice())]
    #[case(b"LINE\r\nLINE\n".as_slice())]
    fn ignores_unrecognised_requests(cursor: SharedCursor, #[case] input: &[u8]) {
        let mut stream = ScriptedStream::new(input);
        let mut dispenser = Dispenser::new(cursor, MismatchPolicy::Ignore);
        let outcome = dispenser.serve(&mut stream).expect("serve");
        assert_eq!(stream.output, b"APPLE\n");
        assert_eq!(
            outcome,
            ServeOutcome {
                dispensed: 1,
                unrecognised: 1
            }
        );
    }

    #[rstest]
    fn replies_with_an_error_when_asked_to(cursor: SharedCursor) {
        let mut stream = ScriptedStream::new(b"what\nLINE\n");
        let mut dispenser = Dispenser::new(cursor, MismatchPolicy::ReplyError);
        dispenser.serve(&mut stream).expect("serve");
        assert_eq!(stream.output, b"ERROR unrecognised request\nAPPLE\n");
    }

    #[rstest]
    fn peer_close_without_requests_is_clean(cursor: SharedCursor) {
        let mut stream = ScriptedStream::new(b"");
        let mut dispenser = Dispenser::new(cursor, MismatchPolicy::Ignore);
        assert_eq!(dispenser.state(), DispenserState::Listening);
        let outcome = dispenser.serve(&mut stream).expect("serve");
        assert_eq!(outcome, ServeOutcome::default());
        assert!(stream.output.is_empty());
    }

    #[rstest]
    fn write_failure_closes_with_an_error(cursor: SharedCursor) {
        let mut stream = ScriptedStream::failing_writes(b"LINE\n");
        let mut dispenser = Dispenser::new(cursor, MismatchPolicy::Ignore);
        let error = dispenser.serve(&mut stream).expect_err("write should fail");
        assert!(matches!(error, ServeError::Write(_)));
        assert_eq!(dispenser.state(), DispenserState::Closed);
    }

    #[rstest]
    fn clones_share_one_position(cursor: SharedCursor) {
        let other = cursor.clone();
        assert_eq!(cursor.next_line(), b"apple");
        assert_eq!(other.next_line(), b"Banana");
        assert_eq!(cursor.next_line(), b"apple");
    }
}
