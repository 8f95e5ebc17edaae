use crate::logging::LogFormat;

/// Host the server binds to when none is supplied.
pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Total polling window of the verifying client, in seconds.
pub const DEFAULT_POLL_WINDOW_SECS: u64 = 30;

/// Interval between two polls of the verifying client, in seconds.
pub const DEFAULT_POLL_STEP_SECS: u64 = 3;

/// Default log filter expression used by the binaries.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}
