//! Command-line interface for the line server.

use std::path::PathBuf;

use clap::Parser;

use lineloop_config::{DEFAULT_BIND_HOST, Endpoint, LoggingArgs};

use crate::dispenser::MismatchPolicy;
use crate::server::{ServeMode, ServerConfig};

/// Serves the lines of a file, one per `LINE` request, uppercased.
#[derive(Parser, Debug)]
#[command(name = "lineloopd", version)]
pub(crate) struct Cli {
    /// Text file whose lines are dispensed.
    #[arg(value_name = "FILE")]
    pub(crate) file: PathBuf,
    /// TCP port to listen on.
    #[arg(value_name = "PORT")]
    pub(crate) port: u16,
    /// Address to bind.
    #[arg(long, default_value = DEFAULT_BIND_HOST)]
    pub(crate) host: String,
    /// Serve one connection, or keep accepting with a shared cursor.
    #[arg(long, value_enum, default_value_t = ServeMode::Single)]
    pub(crate) serve_mode: ServeMode,
    /// How to treat requests other than `LINE`.
    #[arg(long, value_enum, default_value_t = MismatchPolicy::Ignore)]
    pub(crate) on_mismatch: MismatchPolicy,
    #[command(flatten)]
    pub(crate) logging: LoggingArgs,
}

impl Cli {
    /// Resolves the parsed flags into server settings.
    pub(crate) fn server_config(&self) -> ServerConfig {
        ServerConfig::new(self.file.clone(), Endpoint::new(self.host.clone(), self.port))
            .with_mode(self.serve_mode)
            .with_mismatch_policy(self.on_mismatch)
    }
}
