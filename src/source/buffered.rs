//! Buffered byte source over any `Read + Seek` handle

use std::io::{ErrorKind, Read, Seek, SeekFrom};

use tracing::trace;

use super::{ByteSource, RestoreMode};
use crate::error::{Result, TextError};

/// Buffered, peekable reader over an open file
///
/// Holds a fixed-capacity buffer that is refilled whenever fewer than two
/// unconsumed bytes remain, so a `\r\n` pair is always visible as a whole.
///
/// # Examples
///
/// ```no_run
/// use std::fs::File;
/// use textreader::source::{BufferedSource, ByteSource, RestoreMode};
///
/// let file = File::open("data.csv")?;
/// let mut source = BufferedSource::new(&file, 4096)?;
/// while let Some(byte) = source.advance()? {
///     // ...
/// #   let _ = byte;
/// }
/// source.finish(RestoreMode::ToStart)?;
/// # Ok::<(), textreader::TextError>(())
/// ```
pub struct BufferedSource<R> {
    inner: R,
    buffer: Vec<u8>,

    // Cursor state; cursor <= valid <= buffer.len()
    buffer_start: u64,
    cursor: usize,
    valid: usize,
    at_eof: bool,

    start_offset: u64,
    line: u64,
}

impl<R: Read + Seek> BufferedSource<R> {
    /// Bind a source to `inner` at its current position
    ///
    /// `capacity` must be at least 2 bytes.
    pub fn new(mut inner: R, capacity: usize) -> Result<Self> {
        if capacity < 2 {
            return Err(TextError::InvalidArgument(format!(
                "buffer capacity must be at least 2 bytes, got {}",
                capacity
            )));
        }

        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(capacity)
            .map_err(|_| TextError::OutOfMemory)?;
        buffer.resize(capacity, 0);

        let start_offset = inner.stream_position()?;

        Ok(BufferedSource {
            inner,
            buffer,
            buffer_start: start_offset,
            cursor: 0,
            valid: 0,
            at_eof: false,
            start_offset,
            line: 0,
        })
    }

    /// Release the buffer and return the underlying handle as-is
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn refill(&mut self) -> Result<()> {
        if self.at_eof || self.valid - self.cursor >= 2 {
            return Ok(());
        }

        let keep = self.valid - self.cursor;
        self.buffer.copy_within(self.cursor..self.valid, 0);
        self.buffer_start += self.cursor as u64;
        self.cursor = 0;
        self.valid = keep;

        // Short reads are not end of input; only a zero-length read is.
        while self.valid < self.buffer.len() {
            match self.inner.read(&mut self.buffer[self.valid..]) {
                Ok(0) => {
                    self.at_eof = true;
                    break;
                }
                Ok(n) => self.valid += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    #[inline]
    fn is_crlf(&self) -> bool {
        self.buffer[self.cursor] == b'\r'
            && self.cursor + 1 < self.valid
            && self.buffer[self.cursor + 1] == b'\n'
    }
}

impl<R: Read + Seek> ByteSource for BufferedSource<R> {
    fn peek(&mut self) -> Result<Option<u8>> {
        self.refill()?;
        if self.cursor == self.valid {
            return Ok(None);
        }
        if self.is_crlf() {
            return Ok(Some(b'\n'));
        }
        Ok(Some(self.buffer[self.cursor]))
    }

    fn advance(&mut self) -> Result<Option<u8>> {
        self.refill()?;
        if self.cursor == self.valid {
            return Ok(None);
        }

        let c = if self.is_crlf() {
            self.cursor += 2;
            b'\n'
        } else {
            self.cursor += 1;
            self.buffer[self.cursor - 1]
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
        self.buffer_start + self.cursor as u64
    }

    fn finish(&mut self, mode: RestoreMode) -> Result<()> {
        let target = match mode {
            RestoreMode::LeaveAsIs => return Ok(()),
            RestoreMode::ToStart => self.start_offset,
            RestoreMode::ToEnd => self.offset(),
        };
        trace!(target, ?mode, "restoring file position");
        self.inner.seek(SeekFrom::Start(target))?;
        Ok(())
    }
}
