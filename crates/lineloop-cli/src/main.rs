//! Entry point for the verifying client.
//!
//! Delegates to [`lineloop_cli::run`], which parses arguments, connects to the
//! server and prints one verdict per poll.

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    lineloop_cli::run(std::env::args_os(), &mut io::stdout(), &mut io::stderr())
}
