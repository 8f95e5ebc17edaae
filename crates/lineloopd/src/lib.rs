//! Line server for the lineloop protocol.
//!
//! The server loads a text file, binds a TCP port and answers every `LINE\n`
//! request with the next line of the file, uppercased and newline-terminated.
//! After the last line the cursor wraps to the first. Any other request is
//! dropped without a reply unless the error-reply policy is selected.
//!
//! By default exactly one connection is served and the process then exits.
//! The persistent serve mode keeps accepting connections, each on its own
//! thread, all drawing from one shared cursor.

mod cli;
mod dispenser;
mod errors;
mod reporter;
mod server;
mod transport;

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use lineloop_config::report_usage;
use lineloop_core::telemetry;

pub use dispenser::{
    Dispenser, DispenserState, ERROR_REPLY, MismatchPolicy, ServeError, ServeOutcome,
    SharedCursor,
};
pub use errors::DaemonError;
pub use reporter::{LifecycleReporter, StructuredReporter};
pub use server::{ServeMode, Server, ServerConfig};
pub use transport::{
    ConnectionHandler, DispenserHandler, ListenerError, ListenerHandle, SocketListener,
};

use cli::Cli;

const PROGRAM: &str = "lineloopd";

/// Runs the server with the provided arguments and output streams.
///
/// Usage errors exit with clap's status; every other failure is written to
/// `stderr` and exits with status 1.
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

    match serve(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let _ = writeln!(stderr, "{error}");
            ExitCode::FAILURE
        }
    }
}

fn serve(cli: &Cli) -> Result<(), DaemonError> {
    let logging = cli.logging.resolve(PROGRAM)?;
    telemetry::initialise(logging.log_filter(), logging.log_format())?;
    let reporter: Arc<dyn LifecycleReporter> = Arc::new(StructuredReporter::new());
    Server::bind(cli.server_config(), reporter)?.run()
}

#[cfg(test)]
mod tests;
