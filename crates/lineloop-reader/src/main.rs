//! Entry point for the standalone line reader.

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    lineloop_reader::run(std::env::args_os(), &mut io::stdout(), &mut io::stderr())
}
