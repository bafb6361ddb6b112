//! Memory-mapped byte source
//!
//! _Requires Cargo feature `mmap`._

use std::fs::File;
use std::io::{Seek, SeekFrom};

use memmap2::Mmap;
use tracing::trace;

use super::{ByteSource, RestoreMode};
use crate::error::{Result, TextError};

/// Byte source over a whole-file memory map
///
/// Same external contract as [`super::BufferedSource`]: reading starts at the
/// file's current position and [`ByteSource::finish`] repositions the file.
pub struct MappedSource<'a> {
    file: &'a File,
    map: Option<Mmap>,
    start: usize,
    pos: usize,
    line: u64,
}

impl<'a> MappedSource<'a> {
    /// Map `file` and start reading at its current position
    pub fn new(file: &'a File) -> Result<Self> {
        let mut handle = file;
        let current = handle.stream_position()?;
        let len = file.metadata()?.len();

        // Zero-length maps are rejected on some platforms.
        let map = if len == 0 {
            None
        } else {
            // SAFETY: the map is read-only and lives no longer than the
            // borrowed file. Concurrent truncation by another process is
            // outside this crate's control, as with any mmap reader.
            Some(unsafe { Mmap::map(file)? })
        };

        let start = usize::try_from(current.min(len)).map_err(|_| {
            TextError::InvalidArgument(format!("file offset {} does not fit in memory", current))
        })?;

        Ok(MappedSource {
            file,
            map,
            start,
            pos: start,
            line: 0,
        })
    }

    #[inline]
    fn bytes(&self) -> &[u8] {
        self.map.as_deref().unwrap_or(&[])
    }

    #[inline]
    fn is_crlf(&self) -> bool {
        let bytes = self.bytes();
        bytes[self.pos] == b'\r' && bytes.get(self.pos + 1) == Some(&b'\n')
    }
}

impl ByteSource for MappedSource<'_> {
    fn peek(&mut self) -> Result<Option<u8>> {
        if self.pos >= self.bytes().len() {
            return Ok(None);
        }
        if self.is_crlf() {
            return Ok(Some(b'\n'));
        }
        Ok(Some(self.bytes()[self.pos]))
    }

    fn advance(&mut self) -> Result<Option<u8>> {
        if self.pos >= self.bytes().len() {
            return Ok(None);
        }

        let c = if self.is_crlf() {
            self.pos += 2;
            b'\n'
        } else {
            self.pos += 1;
            self.bytes()[self.pos - 1]
        };

        if c == b'\n' {
            self.line += 1;
        }
        Ok(Some(c))
    }

    fn line_number(&self) -> u64 {
        self.line
    }

    fn offset(&self) -> u64 {
        self.pos as u64
    }

    fn finish(&mut self, mode: RestoreMode) -> Result<()> {
        let target = match mode {
            RestoreMode::LeaveAsIs => return Ok(()),
            RestoreMode::ToStart => self.start,
            RestoreMode::ToEnd => self.pos,
        };
        trace!(target, ?mode, "restoring file position");
        let mut handle = self.file;
        handle.seek(SeekFrom::Start(target as u64))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_mapped_matches_buffered_contract() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"skip\r\nab\r\nc").unwrap();
        let file = temp.reopen().unwrap();
        (&file).seek(SeekFrom::Start(6)).unwrap();

        let mut source = MappedSource::new(&file).unwrap();
        assert_eq!(source.peek().unwrap(), Some(b'a'));
        assert_eq!(source.advance().unwrap(), Some(b'a'));
        assert_eq!(source.advance().unwrap(), Some(b'b'));
        assert_eq!(source.peek().unwrap(), Some(b'\n'));
        assert_eq!(source.advance().unwrap(), Some(b'\n'));
        assert_eq!(source.line_number(), 1);
        source.finish(RestoreMode::ToEnd).unwrap();
        assert_eq!((&file).stream_position().unwrap(), 10);

        let mut source = MappedSource::new(&file).unwrap();
        assert_eq!(source.advance().unwrap(), Some(b'c'));
        assert_eq!(source.advance().unwrap(), None);
        source.finish(RestoreMode::ToStart).unwrap();
        assert_eq!((&file).stream_position().unwrap(), 10);
    }

    #[test]
    fn test_empty_file() {
        let temp = NamedTempFile::new().unwrap();
        let file = temp.reopen().unwrap();
        let mut source = MappedSource::new(&file).unwrap();
        assert_eq!(source.peek().unwrap(), None);
        assert_eq!(source.advance().unwrap(), None);
    }
}
