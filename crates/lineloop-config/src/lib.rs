//! Shared configuration primitives for the lineloop binaries.
//!
//! The server, the verifying client, and the standalone reader agree on a
//! handful of values: how to log, where to find a peer, and how the client
//! paces its polls. Those values live here so that each binary flattens the
//! same argument groups into its own command line and resolves the same
//! defaults. Logging settings are layered through `ortho_config`, so they
//! can also come from a TOML file or `LINELOOP_*` environment variables.

mod defaults;
mod endpoint;
mod logging;
mod schedule;
mod usage;

pub use defaults::{
    DEFAULT_BIND_HOST, DEFAULT_LOG_FILTER, DEFAULT_POLL_STEP_SECS, DEFAULT_POLL_WINDOW_SECS,
    default_log_filter, default_log_filter_string, default_log_format,
};
pub use endpoint::Endpoint;
pub use logging::{LogFormat, LogFormatParseError, LoggingArgs, LoggingConfig};
pub use schedule::{PollSchedule, ScheduleError};
pub use usage::report_usage;
