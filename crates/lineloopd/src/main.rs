//! Entry point for the line server.
//!
//! Delegates to [`lineloopd::run`], which parses arguments, initialises
//! telemetry, loads the line file and serves connections.

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    lineloopd::run(std::env::args_os(), &mut io::stdout(), &mut io::stderr())
}
