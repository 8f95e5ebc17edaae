//! Membership check of a received payload against a local line file.

use std::collections::HashSet;
use std::fmt;
use std::io;

use crate::source::LineSource;
use crate::transform::transform;

/// Outcome of one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// The payload matches a transformed line of the local file.
    Ok,
    /// No local line transforms to the payload.
    Missing,
}

impl Verdict {
    /// Label printed for the verdict.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Missing => "MISSING",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Payload forms of every line in a source, as the server would send them.
#[derive(Debug, Clone, Default)]
pub struct LineSet {
    payloads: HashSet<Vec<u8>>,
}

impl LineSet {
    /// Rewinds `source` and scans it completely.
    pub fn scan<S: LineSource>(source: &mut S) -> io::Result<Self> {
        source.rewind()?;
        let mut payloads = HashSet::new();
        while let Some(line) = source.read_line()? {
            payloads.insert(transform(&line));
        }
        Ok(Self { payloads })
    }

    /// Classifies a received payload by byte-exact comparison.
    #[must_use]
    pub fn verdict(&self, payload: &[u8]) -> Verdict {
        if self.payloads.contains(payload) {
            Verdict::Ok
        } else {
            Verdict::Missing
        }
    }

    /// Number of distinct payloads in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    /// Whether the scanned source was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }
}
