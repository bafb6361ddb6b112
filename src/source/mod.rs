//! Peekable byte streams over open files
//!
//! All tokenizing and decoding code reads its input through the
//! [`ByteSource`] trait. Two implementations exist:
//!
//! - [`BufferedSource`]: fixed-capacity buffered reads (canonical)
//! - `MappedSource`: whole-file memory mapping (feature `mmap`)
//!
//! Both collapse `\r\n` into a single `\n`, count newlines, and can hand the
//! underlying file back at a well-defined position via [`ByteSource::finish`].

mod buffered;
#[cfg(feature = "mmap")]
mod mapped;

pub use buffered::BufferedSource;
#[cfg(feature = "mmap")]
pub use mapped::MappedSource;

use crate::error::Result;

/// Default capacity of a [`BufferedSource`] read buffer
pub const DEFAULT_BUFFER_CAPACITY: usize = 64 * 1024;

/// Where to leave the underlying file position when a source is finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreMode {
    /// Leave the file position wherever buffered reading left it
    LeaveAsIs,
    /// Seek back to the offset at which the source was constructed
    ToStart,
    /// Seek to the byte immediately following the last consumed byte
    ToEnd,
}

/// Strategy used to construct a byte source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SourceKind {
    /// Buffered reads of a fixed capacity
    #[default]
    Buffered,
    /// Map the whole file into memory
    #[cfg(feature = "mmap")]
    Mapped,
}

/// A peekable, newline-normalizing byte stream
///
/// `None` from [`peek`](ByteSource::peek) or [`advance`](ByteSource::advance)
/// means end of input. Read failures are returned as errors and never
/// reported as end of input.
pub trait ByteSource {
    /// Next byte without consuming it
    ///
    /// A `\r\n` pair is reported as `\n`.
    fn peek(&mut self) -> Result<Option<u8>>;

    /// Consume and return the next byte
    ///
    /// A `\r\n` pair is consumed as one `\n`. Every `\n` produced increments
    /// the line counter.
    fn advance(&mut self) -> Result<Option<u8>>;

    /// Number of newlines consumed so far
    fn line_number(&self) -> u64;

    /// File offset of the next unconsumed byte
    fn offset(&self) -> u64;

    /// Reposition the underlying file according to `mode`
    fn finish(&mut self, mode: RestoreMode) -> Result<()>;

    /// Consume bytes up to and including the next `\n`, or until end of input
    fn skip_to_line_end(&mut self) -> Result<()> {
        while let Some(c) = self.advance()? {
            if c == b'\n' {
                break;
            }
        }
        Ok(())
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn peek(&mut self) -> Result<Option<u8>> {
        (**self).peek()
    }

    fn advance(&mut self) -> Result<Option<u8>> {
        (**self).advance()
    }

    fn line_number(&self) -> u64 {
        (**self).line_number()
    }

    fn offset(&self) -> u64 {
        (**self).offset()
    }

    fn finish(&mut self, mode: RestoreMode) -> Result<()> {
        (**self).finish(mode)
    }

    fn skip_to_line_end(&mut self) -> Result<()> {
        (**self).skip_to_line_end()
    }
}
