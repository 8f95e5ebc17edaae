//! Cyclic line dispensing shared by the lineloop binaries.
//!
//! The crate owns the parts of the system that carry state or policy:
//!
//! - [`LineSource`] is the collaborator that yields lines, as raw bytes, from
//!   a backing file and can rewind to the start.
//! - [`LineCursor`] walks a loaded line file forever, wrapping to the first
//!   line after the last one has been handed out.
//! - [`transform`] uppercases a line and terminates it, producing the payload
//!   the server sends back.
//! - [`protocol`] frames requests and payloads as newline-terminated messages
//!   and recognises the `LINE` trigger.
//! - [`LineSet`] and [`Verdict`] classify a received payload against the
//!   client's own copy of the file.
//!
//! Process concerns (sockets, argument parsing, exit codes) belong to the
//! binary crates. [`telemetry`] is shared so every binary logs the same way.

mod cursor;
pub mod protocol;
mod source;
pub mod telemetry;
mod transform;
mod verdict;

pub use cursor::{LineCursor, OpenError};
pub use protocol::{FrameError, FrameReader, MAX_FRAME_BYTES, MAX_LINE_BYTES, Message, TRIGGER};
pub use source::{FileLineSource, LineSource, MemoryLineSource};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transform::{LINE_TERMINATOR, normalise, transform};
pub use verdict::{LineSet, Verdict};

#[cfg(test)]
mod tests;
