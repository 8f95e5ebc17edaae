//! Command-line interface for the verifying client.

use std::path::PathBuf;

use clap::Parser;

use lineloop_config::{
    DEFAULT_POLL_STEP_SECS, DEFAULT_POLL_WINDOW_SECS, Endpoint, LoggingArgs, PollSchedule,
    ScheduleError,
};

use crate::verifier::VerifierConfig;

/// Polls a line server and checks each answer against a local file.
#[derive(Parser, Debug)]
#[command(name = "lineloop", version)]
pub(crate) struct Cli {
    /// Local copy of the line file.
    #[arg(value_name = "FILE")]
    pub(crate) file: PathBuf,
    /// Server host name or address.
    #[arg(value_name = "HOST")]
    pub(crate) host: String,
    /// Server TCP port.
    #[arg(value_name = "PORT")]
    pub(crate) port: u16,
    /// Total polling window in seconds.
    #[arg(long, default_value_t = DEFAULT_POLL_WINDOW_SECS)]
    pub(crate) window_secs: u64,
    /// Seconds between polls.
    #[arg(
        long,
        default_value_t = DEFAULT_POLL_STEP_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub(crate) step_secs: u64,
    /// Exit with status 1 on socket errors instead of 0.
    #[arg(long)]
    pub(crate) strict_exit: bool,
    #[command(flatten)]
    pub(crate) logging: LoggingArgs,
}

impl Cli {
    /// Resolves the parsed flags into verifier settings.
    pub(crate) fn verifier_config(&self) -> Result<VerifierConfig, ScheduleError> {
        let schedule = PollSchedule::from_secs(self.window_secs, self.step_secs)?;
        Ok(VerifierConfig::new(
            self.file.clone(),
            Endpoint::new(self.host.clone(), self.port),
            schedule,
        ))
    }
}
