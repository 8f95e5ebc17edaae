//! Structured reporting for server lifecycle events.

use std::net::SocketAddr;
use std::sync::Arc;

use lineloop_config::Endpoint;
use lineloop_core::LineCursor;

use crate::dispenser::{ServeError, ServeOutcome};
use crate::errors::DaemonError;

const LIFECYCLE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::lifecycle");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait LifecycleReporter: Send + Sync {
    /// Invoked once the line file has been loaded.
    fn source_loaded(&self, cursor: &LineCursor);

    /// Invoked after the listener is bound.
    fn listening(&self, endpoint: &Endpoint, local_addr: Option<SocketAddr>);

    /// Invoked when a peer connects.
    fn connection_accepted(&self, peer: SocketAddr);

    /// Invoked when a peer closes its connection cleanly.
    fn connection_closed(&self, peer: SocketAddr, outcome: &ServeOutcome);

    /// Invoked when a connection ends with an I/O error.
    fn connection_failed(&self, peer: SocketAddr, error: &ServeError);

    /// Invoked when the server cannot start.
    fn startup_failed(&self, error: &DaemonError);
}

impl<T> LifecycleReporter for Arc<T>
where
    T: LifecycleReporter,
{
    fn source_loaded(&self, cursor: &LineCursor) {
        (**self).source_loaded(cursor);
    }

    fn listening(&self, endpoint: &Endpoint, local_addr: Option<SocketAddr>) {
        (**self).listening(endpoint, local_addr);
    }

    fn connection_accepted(&self, peer: SocketAddr) {
        (**self).connection_accepted(peer);
    }

    fn connection_closed(&self, peer: SocketAddr, outcome: &ServeOutcome) {
        (**self).connection_closed(peer, outcome);
    }

    fn connection_failed(&self, peer: SocketAddr, error: &ServeError) {
        (**self).connection_failed(peer, error);
    }

    fn startup_failed(&self, error: &DaemonError) {
        (**self).startup_failed(error);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredReporter;

impl StructuredReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl LifecycleReporter for StructuredReporter {
    fn source_loaded(&self, cursor: &LineCursor) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "source_loaded",
            source = cursor.source_name(),
            lines = cursor.len(),
            "line file loaded"
        );
    }

    fn listening(&self, endpoint: &Endpoint, local_addr: Option<SocketAddr>) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "listening",
            endpoint = %endpoint,
            local_addr = ?local_addr,
            "listening for connections"
        );
    }

    fn connection_accepted(&self, peer: SocketAddr) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "connection_accepted",
            peer = %peer,
            "connection accepted"
        );
    }

    fn connection_closed(&self, peer: SocketAddr, outcome: &ServeOutcome) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "connection_closed",
            peer = %peer,
            dispensed = outcome.dispensed,
            unrecognised = outcome.unrecognised,
            "connection closed by peer"
        );
    }

    fn connection_failed(&self, peer: SocketAddr, error: &ServeError) {
        tracing::warn!(
            target: LIFECYCLE_TARGET,
            event = "connection_failed",
            peer = %peer,
            error = %error,
            "connection ended with an error"
        );
    }

    fn startup_failed(&self, error: &DaemonError) {
        tracing::error!(
            target: LIFECYCLE_TARGET,
            event = "startup_failed",
            error = %error,
            "server failed to start"
        );
    }
}
