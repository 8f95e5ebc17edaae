//! Polling loop that checks server payloads against a local line file.
//!
//! A [`Verifier`] moves through `Connecting`, `Polling` and `Done`. Each poll
//! sends the trigger, reads one newline-terminated response, rescans the local
//! file and prints `OK` when some local line transforms to exactly the
//! received bytes, `MISSING` otherwise. Polls are spaced by the schedule's
//! step; there is no pause after the final poll.

use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use lineloop_config::{Endpoint, PollSchedule};
use lineloop_core::{
    FileLineSource, FrameError, FrameReader, LineSet, LineSource, OpenError, TRIGGER, Verdict,
};

use crate::transport;

const VERIFIER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::verifier");

/// Failures that stop the verifier before its schedule completes.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The local line file could not be opened.
    #[error("failed to open local line file: {0}")]
    Open(#[from] OpenError),
    /// The server address did not resolve.
    #[error("failed to resolve server address {endpoint}: {source}")]
    Resolve {
        /// Endpoint that failed to resolve.
        endpoint: String,
        /// Resolver error.
        #[source]
        source: io::Error,
    },
    /// No resolved address accepted the connection.
    #[error("failed to connect to server at {endpoint}: {source}")]
    Connect {
        /// Endpoint the client dialled.
        endpoint: String,
        /// Last socket error observed.
        #[source]
        source: io::Error,
    },
    /// Writing the trigger failed.
    #[error("failed to send trigger: {0}")]
    Send(#[source] io::Error),
    /// Reading the response failed, or the response exceeded the frame
    /// limit.
    #[error("failed to read response: {0}")]
    Receive(#[source] FrameError),
    /// The server closed the connection instead of answering.
    #[error("server closed the connection before answering poll {poll}")]
    Closed {
        /// One-based number of the unanswered poll.
        poll: u64,
    },
    /// Rescanning the local line file failed.
    #[error("failed to rescan local line file: {0}")]
    Scan(#[source] io::Error),
    /// Printing a verdict failed.
    #[error("failed to write verdict: {0}")]
    Emit(#[source] io::Error),
}

impl VerifyError {
    /// Whether the failure came from the network rather than local files or
    /// output. An oversized response is a protocol violation, not a socket
    /// failure.
    #[must_use]
    pub const fn is_socket_error(&self) -> bool {
        matches!(
            self,
            Self::Resolve { .. }
                | Self::Connect { .. }
                | Self::Send(_)
                | Self::Receive(FrameError::Io(_))
                | Self::Closed { .. }
        )
    }
}

/// Waits between polls.
pub trait Pacer {
    /// Blocks for `interval` before the next poll.
    fn pause(&mut self, interval: Duration);
}

/// Pacer that blocks the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&mut self, interval: Duration) {
        thread::sleep(interval);
    }
}

/// Verdict counts for a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerifySummary {
    /// Polls whose payload matched a local line.
    pub ok: u64,
    /// Polls whose payload matched nothing.
    pub missing: u64,
}

impl VerifySummary {
    fn record(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Ok => self.ok += 1,
            Verdict::Missing => self.missing += 1,
        }
    }

    /// Total number of completed polls.
    #[must_use]
    pub const fn polls(&self) -> u64 {
        self.ok + self.missing
    }
}

/// Lifecycle of a verifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifierState {
    /// Created, not yet polling.
    Connecting,
    /// Running its schedule.
    Polling,
    /// Finished, successfully or not.
    Done,
}

/// Resolved client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierConfig {
    file: PathBuf,
    endpoint: Endpoint,
    schedule: PollSchedule,
}

impl VerifierConfig {
    /// Settings checking `file` against the server at `endpoint`.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, endpoint: Endpoint, schedule: PollSchedule) -> Self {
        Self {
            file: file.into(),
            endpoint,
            schedule,
        }
    }

    /// Local line file.
    #[must_use]
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Server endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Polling cadence.
    #[must_use]
    pub const fn schedule(&self) -> PollSchedule {
        self.schedule
    }
}

/// Opens the local file, connects to the server and runs the full schedule,
/// printing one verdict per line to `out`.
pub fn verify<W, P>(
    config: &VerifierConfig,
    out: &mut W,
    pacer: &mut P,
) -> Result<VerifySummary, VerifyError>
where
    W: Write,
    P: Pacer,
{
    let source = FileLineSource::open(config.file())?;
    let mut verifier = Verifier::new(source, config.schedule());
    let stream = verifier.connect(config.endpoint())?;
    info!(
        target: VERIFIER_TARGET,
        endpoint = %config.endpoint(),
        polls = config.schedule().poll_count(),
        "connected to server"
    );
    verifier.run(&stream, out, pacer)
}

/// Checks server payloads against a local line source.
#[derive(Debug)]
pub struct Verifier<S> {
    source: S,
    schedule: PollSchedule,
    state: VerifierState,
}

impl<S: LineSource> Verifier<S> {
    /// Builds a verifier over `source`.
    #[must_use]
    pub const fn new(source: S, schedule: PollSchedule) -> Self {
        Self {
            source,
            schedule,
            state: VerifierState::Connecting,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> VerifierState {
        self.state
    }

    /// Dials `endpoint`, trying each resolved address in turn.
    ///
    /// The verifier stays `Connecting` until [`Verifier::run`] starts, and is
    /// `Done` if no address accepts.
    pub fn connect(&mut self, endpoint: &Endpoint) -> Result<TcpStream, VerifyError> {
        debug!(
            target: VERIFIER_TARGET,
            state = ?self.state,
            %endpoint,
            "dialling server"
        );
        transport::connect(endpoint).inspect_err(|_| self.state = VerifierState::Done)
    }

    /// Runs every scheduled poll over `connection`.
    ///
    /// The verifier is `Done` afterwards whether or not the run succeeded.
    pub fn run<C, W, P>(
        &mut self,
        connection: C,
        out: &mut W,
        pacer: &mut P,
    ) -> Result<VerifySummary, VerifyError>
    where
        C: Read + Write,
        W: Write,
        P: Pacer,
    {
        self.state = VerifierState::Polling;
        let result = self.poll_all(FrameReader::new(connection), out, pacer);
        self.state = VerifierState::Done;
        if let Ok(summary) = &result {
            info!(
                target: VERIFIER_TARGET,
                ok = summary.ok,
                missing = summary.missing,
                "verification finished"
            );
        }
        result
    }

    fn poll_all<C, W, P>(
        &mut self,
        mut frames: FrameReader<C>,
        out: &mut W,
        pacer: &mut P,
    ) -> Result<VerifySummary, VerifyError>
    where
        C: Read + Write,
        W: Write,
        P: Pacer,
    {
        let polls = self.schedule.poll_count();
        let mut summary = VerifySummary::default();
        for poll in 1..=polls {
            let verdict = self.poll_once(&mut frames, poll)?;
            summary.record(verdict);
            writeln!(out, "{verdict}")
                .and_then(|()| out.flush())
                .map_err(VerifyError::Emit)?;
            if poll < polls {
                pacer.pause(self.schedule.step());
            }
        }
        Ok(summary)
    }

    fn poll_once<C: Read + Write>(
        &mut self,
        frames: &mut FrameReader<C>,
        poll: u64,
    ) -> Result<Verdict, VerifyError> {
        let connection = frames.get_mut();
        connection
            .write_all(TRIGGER)
            .and_then(|()| connection.flush())
            .map_err(VerifyError::Send)?;

        let payload = frames
            .read_frame()
            .map_err(VerifyError::Receive)?
            .ok_or(VerifyError::Closed { poll })?;

        let lines = LineSet::scan(&mut self.source).map_err(VerifyError::Scan)?;
        let verdict = lines.verdict(&payload);
        debug!(
            target: VERIFIER_TARGET,
            poll,
            payload = %String::from_utf8_lossy(&payload).trim_end(),
            verdict = verdict.as_str(),
            "poll answered"
        );
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Cursor;

    use mockall::mock;
    use mockall::predicate::eq;
    use rstest::{fixture, rstest};

    use lineloop_core::MemoryLineSource;

    use super::*;

    mock! {
        Clock {}
        impl Pacer for Clock {
            fn pause(&mut self, interval: Duration);
        }
    }

    /// In-memory connection replaying canned server output.
    struct ScriptedConnection {
        responses: Cursor<Vec<u8>>,
        sent: Vec<u8>,
    }

    impl ScriptedConnection {
        fn new(responses: &str) -> Self {
            Self {
                responses: Cursor::new(responses.as_bytes().to_vec()),
                sent: Vec::new(),
            }
        }
    }

    impl Read for ScriptedConnection {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.responses.read(buf)
        }
    }

    impl Write for ScriptedConnection {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.sent.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[fixture]
    fn local_lines() -> MemoryLineSource {
        MemoryLineSource::new("local", ["apple", "cherry"])
    }

    fn two_polls() -> PollSchedule {
        PollSchedule::from_secs(3, 3).expect("valid schedule")
    }

    #[rstest]
    fn verdicts_follow_membership(local_lines: MemoryLineSource) {
        let mut connection = ScriptedConnection::new("APPLE\nBANANA\n");
        let mut out = Vec::new();
        let mut pacer = MockClock::new();
        pacer
            .expect_pause()
            .with(eq(Duration::from_secs(3)))
            .times(1)
            .return_const(());

        let mut verifier = Verifier::new(local_lines, two_polls());
        let summary = verifier
            .run(&mut connection, &mut out, &mut pacer)
            .expect("run succeeds");

        assert_eq!(out, b"OK\nMISSING\n");
        assert_eq!(connection.sent, b"LINE\nLINE\n");
        assert_eq!(summary, VerifySummary { ok: 1, missing: 1 });
    }

    #[rstest]
    fn default_schedule_polls_eleven_times(local_lines: MemoryLineSource) {
        let mut connection = ScriptedConnection::new(&"APPLE\n".repeat(11));
        let mut out = Vec::new();
        let mut pacer = MockClock::new();
        pacer.expect_pause().times(10).return_const(());

        let mut verifier = Verifier::new(local_lines, PollSchedule::default());
        let summary = verifier
            .run(&mut connection, &mut out, &mut pacer)
            .expect("run succeeds");

        assert_eq!(summary.polls(), 11);
        assert_eq!(summary.ok, 11);
    }

    #[rstest]
    fn closed_connection_stops_the_run(local_lines: MemoryLineSource) {
        let mut connection = ScriptedConnection::new("APPLE\n");
        let mut out = Vec::new();
        let mut pacer = MockClock::new();
        pacer.expect_pause().times(1).return_const(());

        let mut verifier = Verifier::new(local_lines, two_polls());
        let error = verifier
            .run(&mut connection, &mut out, &mut pacer)
            .expect_err("second poll has no answer");

        assert!(matches!(error, VerifyError::Closed { poll: 2 }), "{error:?}");
        assert!(error.is_socket_error());
        assert_eq!(out, b"OK\n");
        assert_eq!(verifier.state(), VerifierState::Done);
    }

    #[rstest]
    fn payload_with_lowercase_is_missing(local_lines: MemoryLineSource) {
        let mut connection = ScriptedConnection::new("apple\n");
        let mut out = Vec::new();
        let mut pacer = MockClock::new();
        pacer.expect_pause().never();

        let schedule = PollSchedule::from_secs(0, 3).expect("valid schedule");
        let mut verifier = Verifier::new(local_lines, schedule);
        verifier
            .run(&mut connection, &mut out, &mut pacer)
            .expect("run succeeds");

        assert_eq!(out, b"MISSING\n");
    }

    #[test]
    fn local_file_is_rescanned_every_poll() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("local.txt");
        fs::write(&path, "apple\n").expect("write local file");
        let source = FileLineSource::open(&path).expect("open local file");

        let mut pacer = MockClock::new();
        let rewrite = path.clone();
        pacer.expect_pause().times(1).returning(move |_| {
            fs::write(&rewrite, "banana\n").expect("rewrite local file");
        });

        let mut connection = ScriptedConnection::new("BANANA\nBANANA\n");
        let mut out = Vec::new();
        let mut verifier = Verifier::new(source, two_polls());
        verifier
            .run(&mut connection, &mut out, &mut pacer)
            .expect("run succeeds");

        assert_eq!(out, b"MISSING\nOK\n");
    }

    #[rstest]
    fn verifier_starts_connecting(local_lines: MemoryLineSource) {
        let verifier = Verifier::new(local_lines, two_polls());
        assert_eq!(verifier.state(), VerifierState::Connecting);
    }

    #[rstest]
    fn refused_connection_finishes_the_verifier(local_lines: MemoryLineSource) {
        let vacant = std::net::TcpListener::bind(("127.0.0.1", 0)).expect("reserve port");
        let port = vacant.local_addr().expect("reserved address").port();
        drop(vacant);

        let mut verifier = Verifier::new(local_lines, two_polls());
        let error = verifier
            .connect(&Endpoint::new("127.0.0.1", port))
            .expect_err("nothing listens on the port");

        assert!(matches!(error, VerifyError::Connect { .. }), "{error:?}");
        assert_eq!(verifier.state(), VerifierState::Done);
    }

    #[rstest]
    fn successful_connection_keeps_the_verifier_connecting(local_lines: MemoryLineSource) {
        let listener = std::net::TcpListener::bind(("127.0.0.1", 0)).expect("bind listener");
        let port = listener.local_addr().expect("listener address").port();

        let mut verifier = Verifier::new(local_lines, two_polls());
        verifier
            .connect(&Endpoint::new("127.0.0.1", port))
            .expect("listener accepts");

        assert_eq!(verifier.state(), VerifierState::Connecting);
    }

    #[rstest]
    fn oversized_response_is_not_a_socket_error(local_lines: MemoryLineSource) {
        let mut connection = ScriptedConnection::new(&"X".repeat(lineloop_core::MAX_FRAME_BYTES));
        let mut pacer = MockClock::new();
        pacer.expect_pause().never();

        let mut verifier = Verifier::new(local_lines, two_polls());
        let error = verifier
            .run(&mut connection, &mut Vec::new(), &mut pacer)
            .expect_err("response exceeds the frame limit");

        assert!(
            matches!(error, VerifyError::Receive(FrameError::TooLong { .. })),
            "{error:?}"
        );
        assert!(!error.is_socket_error());
    }

    #[test]
    fn missing_local_file_fails_before_connecting() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = VerifierConfig::new(
            dir.path().join("absent.txt"),
            Endpoint::new("127.0.0.1", 9),
            two_polls(),
        );
        let error = verify(&config, &mut Vec::new(), &mut ThreadPacer)
            .expect_err("open should fail");
        assert!(matches!(error, VerifyError::Open(_)), "{error:?}");
        assert!(!error.is_socket_error());
    }
}
