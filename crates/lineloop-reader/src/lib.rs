//! Standalone reader that cycles through a line file without a server.
//!
//! Prints the same payloads the server would send, one per line, forever or
//! until `--limit` payloads have been written. Useful for checking what a
//! client should expect from a given file.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use ortho_config::OrthoError;
use thiserror::Error;
use tracing::{debug, info};

use lineloop_config::{LoggingArgs, report_usage};
use lineloop_core::{LineCursor, OpenError, TelemetryError, telemetry, transform};

const PROGRAM: &str = "lineloop-reader";
const READER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::reader");

/// Prints the lines of a file uppercased, wrapping at the end.
#[derive(Parser, Debug)]
#[command(name = "lineloop-reader", version)]
struct Cli {
    /// Text file to cycle through.
    #[arg(value_name = "FILE")]
    file: PathBuf,
    /// Stop after this many lines instead of running until killed.
    #[arg(long, value_name = "N")]
    limit: Option<u64>,
    #[command(flatten)]
    logging: LoggingArgs,
}

/// Failures that end the reader with a non-zero status.
#[derive(Debug, Error)]
pub enum ReaderError {
    /// Logging configuration failed to load.
    #[error("failed to load configuration: {0}")]
    Config(#[from] Arc<OrthoError>),
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {0}")]
    Telemetry(#[from] TelemetryError),
    /// The line file could not be loaded.
    #[error("failed to load line file: {0}")]
    Open(#[from] OpenError),
    /// Writing to stdout failed for a reason other than a closed pipe.
    #[error("failed to write output: {0}")]
    Write(#[source] io::Error),
}

/// Runs the reader with the provided arguments and output streams.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => return report_usage(&error, stdout, stderr),
    };

    let result = cli
        .logging
        .resolve(PROGRAM)
        .map_err(ReaderError::from)
        .and_then(|logging| {
            telemetry::initialise(logging.log_filter(), logging.log_format())
                .map_err(ReaderError::from)
        })
        .and_then(|_| LineCursor::open(&cli.file).map_err(ReaderError::from))
        .and_then(|mut cursor| {
            info!(
                target: READER_TARGET,
                source = cursor.source_name(),
                lines = cursor.len(),
                limit = ?cli.limit,
                "reading line file"
            );
            cycle(&mut cursor, cli.limit, stdout)
        });

    match result {
        Ok(written) => {
            debug!(target: READER_TARGET, written, "reader finished");
            ExitCode::SUCCESS
        }
        Err(error) => {
            let _ = writeln!(stderr, "{error}");
            ExitCode::FAILURE
        }
    }
}

/// Writes transformed lines from `cursor` to `out`, `limit` times or forever.
///
/// Returns the number of lines written. A closed pipe on `out` ends the loop
/// successfully.
pub fn cycle<W: Write>(
    cursor: &mut LineCursor,
    limit: Option<u64>,
    out: &mut W,
) -> Result<u64, ReaderError> {
    let mut written = 0;
    while limit.is_none_or(|limit| written < limit) {
        let payload = transform(&cursor.next_line());
        match out.write_all(&payload).and_then(|()| out.flush()) {
            Ok(()) => written += 1,
            Err(error) if error.kind() == io::ErrorKind::BrokenPipe => break,
            Err(error) => return Err(ReaderError::Write(error)),
        }
    }
    Ok(written)
}
