//! Server bootstrap: load the line file, bind the listener, then serve.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::ValueEnum;
use tracing::debug;

use lineloop_config::Endpoint;
use lineloop_core::LineCursor;

use crate::dispenser::{Dispenser, DispenserState, MismatchPolicy, ServeOutcome, SharedCursor};
use crate::errors::DaemonError;
use crate::reporter::LifecycleReporter;
use crate::transport::{DispenserHandler, ListenerHandle, SocketListener};

const SERVER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::server");

/// How many connections the server accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ServeMode {
    /// Serve exactly one connection, then exit.
    #[default]
    Single,
    /// Accept connections until stopped, one thread each, sharing the cursor.
    Persistent,
}

/// Resolved server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    source: PathBuf,
    endpoint: Endpoint,
    mode: ServeMode,
    on_mismatch: MismatchPolicy,
}

impl ServerConfig {
    /// Settings serving `source` on `endpoint` with default policies.
    #[must_use]
    pub fn new(source: impl Into<PathBuf>, endpoint: Endpoint) -> Self {
        Self {
            source: source.into(),
            endpoint,
            mode: ServeMode::default(),
            on_mismatch: MismatchPolicy::default(),
        }
    }

    /// Overrides the serve mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: ServeMode) -> Self {
        self.mode = mode;
        self
    }

    /// Overrides the mismatch policy.
    #[must_use]
    pub const fn with_mismatch_policy(mut self, policy: MismatchPolicy) -> Self {
        self.on_mismatch = policy;
        self
    }

    /// Path of the line file.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Endpoint to bind.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Selected serve mode.
    #[must_use]
    pub const fn mode(&self) -> ServeMode {
        self.mode
    }

    /// Selected mismatch policy.
    #[must_use]
    pub const fn on_mismatch(&self) -> MismatchPolicy {
        self.on_mismatch
    }
}

/// A bound server, ready to accept connections.
pub struct Server {
    config: ServerConfig,
    listener: SocketListener,
    dispenser: Dispenser,
    reporter: Arc<dyn LifecycleReporter>,
}

impl Server {
    /// Loads the line file and binds the listener.
    ///
    /// The file is opened first so a bad path never leaves a bound port
    /// behind.
    pub fn bind(
        config: ServerConfig,
        reporter: Arc<dyn LifecycleReporter>,
    ) -> Result<Self, DaemonError> {
        let cursor = match LineCursor::open(config.source()) {
            Ok(cursor) => cursor,
            Err(source) => return Err(report_failure(&*reporter, source.into())),
        };
        reporter.source_loaded(&cursor);

        let listener = match SocketListener::bind(config.endpoint()) {
            Ok(listener) => listener,
            Err(source) => return Err(report_failure(&*reporter, source.into())),
        };
        reporter.listening(config.endpoint(), listener.local_addr());

        let dispenser = Dispenser::new(SharedCursor::new(cursor), config.on_mismatch());
        Ok(Self {
            config,
            listener,
            dispenser,
            reporter,
        })
    }

    /// Address the listener is bound to.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.local_addr()
    }

    /// State of the dispenser that [`Server::serve_one`] uses. A bound
    /// server is `Listening` until a peer connects.
    #[must_use]
    pub const fn state(&self) -> DispenserState {
        self.dispenser.state()
    }

    /// Serves according to the configured mode. In persistent mode this only
    /// returns if the accept loop stops.
    pub fn run(self) -> Result<(), DaemonError> {
        match self.config.mode() {
            ServeMode::Single => self.serve_one().map(|_| ()),
            ServeMode::Persistent => self.start()?.join().map_err(DaemonError::from),
        }
    }

    /// Accepts one connection, serves it to completion on the calling thread,
    /// and closes the listener.
    pub fn serve_one(mut self) -> Result<ServeOutcome, DaemonError> {
        debug!(
            target: SERVER_TARGET,
            state = ?self.dispenser.state(),
            "awaiting a connection"
        );
        let (stream, peer) = self.listener.accept_one()?;
        drop(self.listener);
        self.reporter.connection_accepted(peer);

        let result = self.dispenser.serve(&stream);
        debug!(
            target: SERVER_TARGET,
            state = ?self.dispenser.state(),
            "connection finished"
        );
        match result {
            Ok(outcome) => {
                self.reporter.connection_closed(peer, &outcome);
                Ok(outcome)
            }
            Err(error) => {
                self.reporter.connection_failed(peer, &error);
                Err(error.into())
            }
        }
    }

    /// Starts the background accept loop, serving every connection from the
    /// shared cursor.
    pub fn start(self) -> Result<ListenerHandle, DaemonError> {
        let handler = Arc::new(DispenserHandler::new(
            self.dispenser.cursor().clone(),
            self.config.on_mismatch(),
            self.reporter,
        ));
        Ok(self.listener.start(handler)?)
    }
}

fn report_failure(reporter: &dyn LifecycleReporter, error: DaemonError) -> DaemonError {
    reporter.startup_failed(&error);
    error
}
