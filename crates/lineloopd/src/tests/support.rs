//! Test double for [`LifecycleReporter`] that records events for assertions.

use std::net::SocketAddr;
use std::sync::Mutex;

use lineloop_config::Endpoint;
use lineloop_core::LineCursor;

use crate::dispenser::{ServeError, ServeOutcome};
use crate::errors::DaemonError;
use crate::reporter::LifecycleReporter;

/// Lifecycle events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LifecycleEvent {
    SourceLoaded { lines: usize },
    Listening,
    ConnectionAccepted,
    ConnectionClosed(ServeOutcome),
    ConnectionFailed(String),
    StartupFailed(String),
}

/// Records lifecycle events for assertions.
#[derive(Debug, Default)]
pub(crate) struct RecordingReporter {
    events: Mutex<Vec<LifecycleEvent>>,
}

impl RecordingReporter {
    /// Captures a copy of the recorded events.
    pub(crate) fn events(&self) -> Vec<LifecycleEvent> {
        self.events
            .lock()
            .expect("reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: LifecycleEvent) {
        self.events
            .lock()
            .expect("reporter mutex poisoned")
            .push(event);
    }
}

impl LifecycleReporter for RecordingReporter {
    fn source_loaded(&self, cursor: &LineCursor) {
        self.record(LifecycleEvent::SourceLoaded {
            lines: cursor.len(),
        });
    }

    fn listening(&self, _endpoint: &Endpoint, _local_addr: Option<SocketAddr>) {
        self.record(LifecycleEvent::Listening);
    }

    fn connection_accepted(&self, _peer: SocketAddr) {
        self.record(LifecycleEvent::ConnectionAccepted);
    }

    fn connection_closed(&self, _peer: SocketAddr, outcome: &ServeOutcome) {
        self.record(LifecycleEvent::ConnectionClosed(*outcome));
    }

    fn connection_failed(&self, _peer: SocketAddr, error: &ServeError) {
        self.record(LifecycleEvent::ConnectionFailed(error.to_string()));
    }

    fn startup_failed(&self, error: &DaemonError) {
        self.record(LifecycleEvent::StartupFailed(error.to_string()));
    }
}
