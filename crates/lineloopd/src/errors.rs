//! Top-level error type for the server process.

use std::sync::Arc;

use ortho_config::OrthoError;
use thiserror::Error;

use lineloop_core::{OpenError, TelemetryError};

use crate::dispenser::ServeError;
use crate::transport::ListenerError;

/// Failures that end the server process with a non-zero status.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Logging configuration failed to load.
    #[error("failed to load configuration: {0}")]
    Config(#[from] Arc<OrthoError>),
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {0}")]
    Telemetry(#[from] TelemetryError),
    /// The line file could not be loaded.
    #[error("failed to load line file: {0}")]
    Open(#[from] OpenError),
    /// Binding or accepting on the listener failed.
    #[error("listener failed: {0}")]
    Listen(#[from] ListenerError),
    /// The served connection failed.
    #[error("connection failed: {0}")]
    Serve(#[from] ServeError),
}
