//! Stateful cursor handing out the lines of a file in an endless cycle.

use std::io;
use std::path::Path;

use thiserror::Error;

use crate::protocol::MAX_LINE_BYTES;
use crate::source::{FileLineSource, LineSource};

/// Errors raised while opening a line source.
#[derive(Debug, Error)]
pub enum OpenError {
    /// The backing file could not be opened.
    #[error("failed to open line source {path}: {source}")]
    Open {
        /// Path that failed to open.
        path: String,
        /// Underlying filesystem error.
        #[source]
        source: io::Error,
    },
    /// Reading from the source failed.
    #[error("failed to read line source {name}: {source}")]
    Read {
        /// Name of the source being read.
        name: String,
        /// Underlying read error.
        #[source]
        source: io::Error,
    },
    /// A line is too long for its payload to fit in one frame.
    #[error("line {line} of {name} exceeds {limit} bytes")]
    LineTooLong {
        /// Name of the source being read.
        name: String,
        /// One-based number of the offending line.
        line: usize,
        /// Longest line accepted.
        limit: usize,
    },
    /// The source holds no lines, so there is nothing to cycle through.
    #[error("line source {name} contains no lines")]
    Empty {
        /// Name of the empty source.
        name: String,
    },
}

/// Cursor over a non-empty sequence of lines.
///
/// The whole source is loaded when the cursor is built, so
/// [`LineCursor::next_line`] cannot fail. After the last line has been
/// returned the position wraps to zero. There is no seek: building a fresh
/// cursor from the same source is the only way to restart.
#[derive(Debug, Clone)]
pub struct LineCursor {
    source_name: String,
    lines: Vec<Vec<u8>>,
    position: usize,
}

impl LineCursor {
    /// Opens the file at `path` and loads its lines.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, OpenError> {
        Self::from_source(FileLineSource::open(path)?)
    }

    /// Loads every line of `source`, starting from its first line.
    ///
    /// Lines longer than [`MAX_LINE_BYTES`] are rejected so that every
    /// payload the cursor feeds can be framed.
    pub fn from_source<S: LineSource>(mut source: S) -> Result<Self, OpenError> {
        let read_error = |name: &str, source: io::Error| OpenError::Read {
            name: name.to_owned(),
            source,
        };
        source
            .rewind()
            .map_err(|error| read_error(source.name(), error))?;

        let mut lines = Vec::new();
        loop {
            match source.read_line() {
                Ok(Some(line)) if line.len() > MAX_LINE_BYTES => {
                    return Err(OpenError::LineTooLong {
                        name: source.name().to_owned(),
                        line: lines.len() + 1,
                        limit: MAX_LINE_BYTES,
                    });
                }
                Ok(Some(line)) => lines.push(line),
                Ok(None) => break,
                Err(error) => return Err(read_error(source.name(), error)),
            }
        }

        if lines.is_empty() {
            return Err(OpenError::Empty {
                name: source.name().to_owned(),
            });
        }

        Ok(Self {
            source_name: source.name().to_owned(),
            lines,
            position: 0,
        })
    }

    /// Returns the line at the current position and advances, wrapping to the
    /// first line once the end has been reached.
    pub fn next_line(&mut self) -> Vec<u8> {
        let line = self.lines.get(self.position).cloned().unwrap_or_default();
        self.position += 1;
        if self.position >= self.lines.len() {
            self.position = 0;
        }
        line
    }

    /// Number of lines in the cycle.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Always `false`: empty sources are rejected on open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Index of the line the next call to [`LineCursor::next_line`] returns.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Name of the source the lines were loaded from.
    #[must_use]
    pub fn source_name(&self) -> &str {
        &self.source_name
    }
}
