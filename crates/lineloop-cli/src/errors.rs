//! Error types for the client runtime.

use std::sync::Arc;

use ortho_config::OrthoError;
use thiserror::Error;

use lineloop_config::ScheduleError;
use lineloop_core::TelemetryError;

use crate::verifier::VerifyError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] Arc<OrthoError>),
    #[error("failed to initialise telemetry: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("invalid poll schedule: {0}")]
    Schedule(#[from] ScheduleError),
    #[error("{0}")]
    Verify(#[from] VerifyError),
}

impl AppError {
    /// Whether the failure came from the network.
    pub(crate) const fn is_socket_error(&self) -> bool {
        match self {
            Self::Verify(error) => error.is_socket_error(),
            Self::Config(_) | Self::Telemetry(_) | Self::Schedule(_) => false,
        }
    }
}
