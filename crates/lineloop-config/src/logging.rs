use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::defaults::{default_log_filter_string, default_log_format};

/// Supported logging output formats.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// Structured JSON suitable for ingestion by logging stacks.
    #[default]
    Json,
    /// Human-readable single line output.
    Compact,
}

/// Errors encountered while parsing a [`LogFormat`] from text.
pub type LogFormatParseError = strum::ParseError;

/// Logging settings resolved from defaults, a configuration file, the
/// environment and command-line flags, in increasing order of precedence.
///
/// The file is TOML and is named by `--config-path` or
/// `LINELOOP_CONFIG_PATH`. Environment variables use the `LINELOOP_` prefix,
/// for example `LINELOOP_LOG_FILTER`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "LINELOOP")]
pub struct LoggingConfig {
    /// Tracing filter directive, for example `debug` or `lineloopd=trace`.
    #[serde(default = "default_log_filter_string")]
    pub log_filter: String,
    /// Output format for diagnostics written to stderr.
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    /// Filter expression handed to the tracing subscriber.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Selected output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}

/// Logging flags shared by every lineloop binary.
///
/// The flags are forwarded to the configuration loader by
/// [`LoggingArgs::resolve`], so they override the file and the environment.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingArgs {
    /// Tracing filter directive, for example `debug` or `lineloopd=trace`.
    #[arg(long = "log-filter", global = true)]
    pub log_filter: Option<String>,
    /// Output format for diagnostics written to stderr.
    #[arg(long = "log-format", value_parser = parse_log_format, global = true)]
    pub log_format: Option<LogFormat>,
    /// TOML file holding logging settings.
    #[arg(long = "config-path", global = true)]
    pub config_path: Option<PathBuf>,
}

impl LoggingArgs {
    /// Loads the layered logging configuration, passing `program` as the
    /// first loader argument.
    pub fn resolve(&self, program: &str) -> Result<LoggingConfig, Arc<OrthoError>> {
        LoggingConfig::load_from_iter(self.loader_arguments(program))
    }

    fn loader_arguments(&self, program: &str) -> Vec<OsString> {
        let mut arguments = vec![OsString::from(program)];
        if let Some(path) = &self.config_path {
            arguments.push(OsString::from("--config-path"));
            arguments.push(path.clone().into_os_string());
        }
        if let Some(filter) = &self.log_filter {
            arguments.push(OsString::from("--log-filter"));
            arguments.push(OsString::from(filter));
        }
        if let Some(format) = self.log_format {
            arguments.push(OsString::from("--log-format"));
            arguments.push(OsString::from(format.to_string()));
        }
        arguments
    }
}

fn parse_log_format(input: &str) -> Result<LogFormat, LogFormatParseError> {
    input.parse()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use clap::Parser;
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    #[derive(Parser, Debug)]
    struct Harness {
        #[command(flatten)]
        logging: LoggingArgs,
    }

    #[rstest]
    #[case("json", LogFormat::Json)]
    #[case("COMPACT", LogFormat::Compact)]
    fn parses_formats_case_insensitively(#[case] input: &str, #[case] expected: LogFormat) {
        let parsed: LogFormat = input.parse().expect("format should parse");
        assert_eq!(parsed, expected);
    }

    #[test]
    fn rejects_unknown_format() {
        assert!("yaml".parse::<LogFormat>().is_err());
    }

    fn parse(arguments: &[&str]) -> LoggingArgs {
        let mut argv = vec!["harness"];
        argv.extend_from_slice(arguments);
        Harness::try_parse_from(argv)
            .expect("flags should parse")
            .logging
    }

    fn write_config(dir: &TempDir, contents: &str) -> String {
        let path = dir.path().join("lineloop.toml");
        fs::write(&path, contents).expect("write config file");
        path.display().to_string()
    }

    #[test]
    fn absent_flags_are_not_forwarded() {
        assert_eq!(parse(&[]).loader_arguments("harness"), ["harness"]);
    }

    #[test]
    fn flags_are_forwarded_to_the_loader() {
        let logging = parse(&["--log-filter", "debug", "--log-format", "COMPACT"]);
        assert_eq!(
            logging.loader_arguments("harness"),
            ["harness", "--log-filter", "debug", "--log-format", "compact"]
        );
    }

    #[test]
    fn configuration_file_sets_the_format() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = write_config(&dir, "log_format = \"compact\"\n");
        let resolved = parse(&["--config-path", &path])
            .resolve("harness")
            .expect("configuration should load");
        assert_eq!(resolved.log_format(), LogFormat::Compact);
    }

    #[test]
    fn flags_override_the_configuration_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = write_config(&dir, "log_filter = \"warn\"\nlog_format = \"compact\"\n");
        let resolved = parse(&["--config-path", &path, "--log-format", "json"])
            .resolve("harness")
            .expect("configuration should load");
        assert_eq!(resolved.log_filter(), "warn");
        assert_eq!(resolved.log_format(), LogFormat::Json);
    }

    #[test]
    fn malformed_configuration_file_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = write_config(&dir, "log_format = \"yaml\"\n");
        assert!(parse(&["--config-path", &path]).resolve("harness").is_err());
    }

    #[test]
    fn display_matches_serialised_form() {
        assert_eq!(LogFormat::Compact.to_string(), "compact");
        assert_eq!(LogFormat::Json.to_string(), "json");
    }
}
