//! Line sources backing a cursor or a membership scan.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

use crate::cursor::OpenError;

/// Sequential access to the lines of a source.
///
/// Lines are raw bytes delimited by `\n`; no text encoding is assumed. The delimiter is stripped; a carriage return
/// before it is kept as line content. A final line without a delimiter is
/// still yielded, while a trailing delimiter does not produce an extra empty
/// line.
pub trait LineSource {
    /// Human-readable name used in diagnostics.
    fn name(&self) -> &str;

    /// Reads the next line, returning `None` at end of stream.
    fn read_line(&mut self) -> io::Result<Option<Vec<u8>>>;

    /// Repositions the source at its first line.
    fn rewind(&mut self) -> io::Result<()>;
}

impl<S> LineSource for &mut S
where
    S: LineSource + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    fn read_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        (**self).read_line()
    }

    fn rewind(&mut self) -> io::Result<()> {
        (**self).rewind()
    }
}

/// Line source reading from a file on disk.
#[derive(Debug)]
pub struct FileLineSource {
    name: String,
    reader: BufReader<File>,
}

impl FileLineSource {
    /// Opens `path` for reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, OpenError> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let file = File::open(path).map_err(|source| OpenError::Open {
            path: name.clone(),
            source,
        })?;
        Ok(Self {
            name,
            reader: BufReader::new(file),
        })
    }
}

impl LineSource for FileLineSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut raw = Vec::new();
        let read = self.reader.read_until(b'\n', &mut raw)?;
        if read == 0 {
            return Ok(None);
        }
        if raw.last() == Some(&b'\n') {
            raw.pop();
        }
        Ok(Some(raw))
    }

    fn rewind(&mut self) -> io::Result<()> {
        self.reader.seek(SeekFrom::Start(0)).map(|_| ())
    }
}

/// In-memory line source, mostly useful for tests and fixtures.
#[derive(Debug, Clone, Default)]
pub struct MemoryLineSource {
    name: String,
    lines: Vec<Vec<u8>>,
    position: usize,
}

impl MemoryLineSource {
    /// Builds a source over the supplied lines.
    pub fn new<I, L>(name: impl Into<String>, lines: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Vec<u8>>,
    {
        Self {
            name: name.into(),
            lines: lines.into_iter().map(Into::into).collect(),
            position: 0,
        }
    }
}

impl LineSource for MemoryLineSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        let line = self.lines.get(self.position).cloned();
        if line.is_some() {
            self.position += 1;
        }
        Ok(line)
    }

    fn rewind(&mut self) -> io::Result<()> {
        self.position = 0;
        Ok(())
    }
}
