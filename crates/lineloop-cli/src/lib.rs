//! Verifying client for the lineloop protocol.
//!
//! The client polls a line server on a fixed schedule. Every answer is
//! compared with the uppercased lines of a local copy of the file, and `OK`
//! or `MISSING` is printed for each poll.
//!
//! Socket failures are printed and then, for compatibility with older
//! deployments, end the process with status 0. `--strict-exit` turns them
//! into status 1. A missing local file always exits with status 1.

mod cli;
mod errors;
mod transport;
mod verifier;

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;

use lineloop_config::report_usage;
use lineloop_core::telemetry;

pub use verifier::{
    Pacer, ThreadPacer, Verifier, VerifierConfig, VerifierState, VerifyError, VerifySummary,
    verify,
};

use cli::Cli;
use errors::AppError;

const PROGRAM: &str = "lineloop";

/// Runs the client with the provided arguments and output streams.
///
/// Verdicts are written to `stdout`; diagnostics to `stderr`.
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

    match execute(&cli, stdout) {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            let _ = writeln!(stderr, "{error}");
            exit_code_for(&error, cli.strict_exit)
        }
    }
}

fn execute<W: Write>(cli: &Cli, stdout: &mut W) -> Result<VerifySummary, AppError> {
    let logging = cli.logging.resolve(PROGRAM)?;
    telemetry::initialise(logging.log_filter(), logging.log_format())?;
    let config = cli.verifier_config()?;
    Ok(verify(&config, stdout, &mut ThreadPacer)?)
}

fn exit_code_for(error: &AppError, strict: bool) -> ExitCode {
    if error.is_socket_error() && !strict {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests;
