//! End-to-end tests across the lineloop server, client and reader.
//!
//! The crate holds the shared fixtures; the scenarios live under `tests/`
//! and drive the library entry points of each binary over real loopback
//! sockets.

pub mod fixtures;

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;

use lineloop_cli::Pacer;

/// Pacer that records intervals instead of sleeping, so scenarios run at
/// socket speed.
#[derive(Debug, Default)]
pub struct InstantPacer {
    pauses: Vec<Duration>,
}

impl InstantPacer {
    /// Intervals requested so far.
    #[must_use]
    pub fn pauses(&self) -> &[Duration] {
        &self.pauses
    }
}

impl Pacer for InstantPacer {
    fn pause(&mut self, interval: Duration) {
        self.pauses.push(interval);
    }
}

/// Temporary directory holding the line files of one scenario.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Creates an empty workspace.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    /// Writes `contents` to `name` inside the workspace.
    pub fn write(&self, name: &str, contents: impl AsRef<[u8]>) -> io::Result<PathBuf> {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    /// Root of the workspace.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}
