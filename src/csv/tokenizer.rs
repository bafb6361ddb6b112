//! Row tokenizer: splits one logical row into field strings
//!
//! The tokenizer is a three-state machine (`Unquoted`, `Quoted`,
//! `WhitespaceSkip`) driven one byte at a time from a [`ByteSource`]. Field
//! text is copied into a bounded scratch buffer owned by the [`Tokenizer`];
//! the returned [`Row`] borrows that buffer, so a row must be fully processed
//! before the next one is requested.

use std::ops::Range;

use crate::error::{Result, TextError};
use crate::source::ByteSource;

/// Default limit on the bytes of field text in one row
pub const DEFAULT_MAX_CHARS: usize = 65_536;

/// Default limit on the number of fields in one row
pub const DEFAULT_MAX_FIELDS: usize = 4_096;

/// How fields are separated within a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Delimiter {
    /// A single delimiter byte; consecutive delimiters produce empty fields
    Byte(u8),
    /// Runs of spaces separate fields; leading and trailing spaces are ignored
    Whitespace,
}

/// Quoting and separation rules for one file
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dialect {
    /// Field separator. Default: `,`.
    pub delimiter: Delimiter,
    /// Quote character. Default: `"`.
    pub quote: u8,
    /// Comment character; the rest of a line after it is ignored. Default: none.
    pub comment: Option<u8>,
    /// Whether a quoted field may span lines. Default: `true`.
    pub allow_embedded_newline: bool,
    /// Whitespace mode only: when `false`, a quote inside unquoted text
    /// opens a quoted segment. Default: `true`.
    pub strict_quoting: bool,
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect {
            delimiter: Delimiter::Byte(b','),
            quote: b'"',
            comment: None,
            allow_embedded_newline: true,
            strict_quoting: true,
        }
    }
}

impl Dialect {
    fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(TextError::InvalidArgument(msg.to_string()));

        if self.quote == b'\n' || self.comment == Some(b'\n') {
            return invalid("newline cannot be used as quote or comment character");
        }
        if self.comment == Some(self.quote) {
            return invalid("quote and comment characters must differ");
        }
        if let Delimiter::Byte(d) = self.delimiter {
            if d == b'\n' {
                return invalid("newline cannot be used as delimiter");
            }
            if d == self.quote || Some(d) == self.comment {
                return invalid("delimiter must differ from quote and comment characters");
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Unquoted,
    Quoted,
    WhitespaceSkip,
}

/// Splits rows read from a [`ByteSource`] into fields
///
/// Memory per row is bounded: more than `max_chars` bytes of field text or
/// more than `max_fields` fields abort the row with
/// [`TextError::TooManyChars`] or [`TextError::TooManyFields`].
#[derive(Debug)]
pub struct Tokenizer {
    dialect: Dialect,
    scratch: Vec<u8>,
    spans: Vec<Range<usize>>,
    max_chars: usize,
    max_fields: usize,
    line: u64,
}

impl Tokenizer {
    /// Create a tokenizer with the default row limits
    pub fn new(dialect: Dialect) -> Result<Self> {
        Self::with_limits(dialect, DEFAULT_MAX_CHARS, DEFAULT_MAX_FIELDS)
    }

    /// Create a tokenizer with explicit row limits
    pub fn with_limits(dialect: Dialect, max_chars: usize, max_fields: usize) -> Result<Self> {
        dialect.validate()?;
        if max_fields == 0 {
            return Err(TextError::InvalidArgument(
                "max_fields must be at least 1".to_string(),
            ));
        }

        let mut scratch = Vec::new();
        scratch
            .try_reserve_exact(max_chars)
            .map_err(|_| TextError::OutOfMemory)?;
        let mut spans = Vec::new();
        spans
            .try_reserve_exact(max_fields)
            .map_err(|_| TextError::OutOfMemory)?;

        Ok(Tokenizer {
            dialect,
            scratch,
            spans,
            max_chars,
            max_fields,
            line: 0,
        })
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Tokenize the next row
    ///
    /// Full-line comments before the row are skipped. Returns `Ok(None)` when
    /// the input is exhausted before a row starts. A row always has at least
    /// one field; an empty line yields a single empty field.
    pub fn tokenize<S: ByteSource + ?Sized>(&mut self, source: &mut S) -> Result<Option<Row<'_>>> {
        self.scratch.clear();
        self.spans.clear();

        if let Some(comment) = self.dialect.comment {
            while source.peek()? == Some(comment) {
                source.skip_to_line_end()?;
            }
        }

        if source.peek()?.is_none() {
            return Ok(None);
        }

        self.line = source.line_number() + 1;

        match self.dialect.delimiter {
            Delimiter::Byte(delimiter) => self.tokenize_delimited(source, delimiter)?,
            Delimiter::Whitespace => self.tokenize_whitespace(source)?,
        }

        Ok(Some(Row {
            text: &self.scratch,
            spans: &self.spans,
            line: self.line,
        }))
    }

    fn tokenize_delimited<S: ByteSource + ?Sized>(
        &mut self,
        source: &mut S,
        delimiter: u8,
    ) -> Result<()> {
        let quote = self.dialect.quote;
        let comment = self.dialect.comment;
        let allow_newline = self.dialect.allow_embedded_newline;

        let mut state = State::Unquoted;
        let mut field_start = true;

        loop {
            let c = source.advance()?;
            match state {
                State::Unquoted | State::WhitespaceSkip => match c {
                    Some(b) if b == quote && field_start => {
                        state = State::Quoted;
                        field_start = false;
                    }
                    None | Some(b'\n') => {
                        self.close_field()?;
                        break;
                    }
                    Some(b) if b == delimiter => {
                        self.close_field()?;
                        field_start = true;
                    }
                    Some(b) if Some(b) == comment => {
                        self.close_field()?;
                        source.skip_to_line_end()?;
                        break;
                    }
                    Some(b) => {
                        self.push(b)?;
                        field_start = false;
                    }
                },
                State::Quoted => match c {
                    Some(b'\n') if allow_newline => self.push(b'\n')?,
                    // Unterminated quote at end of line or input closes the row
                    None | Some(b'\n') => {
                        self.close_field()?;
                        break;
                    }
                    Some(b) if b == quote => {
                        if source.peek()? == Some(quote) {
                            source.advance()?;
                            self.push(quote)?;
                        } else {
                            state = State::Unquoted;
                        }
                    }
                    Some(b) => self.push(b)?,
                },
            }
        }
        Ok(())
    }

    fn tokenize_whitespace<S: ByteSource + ?Sized>(&mut self, source: &mut S) -> Result<()> {
        let quote = self.dialect.quote;
        let allow_newline = self.dialect.allow_embedded_newline;
        let strict = self.dialect.strict_quoting;

        let mut state = State::WhitespaceSkip;

        loop {
            let c = source.advance()?;
            match state {
                State::WhitespaceSkip => match c {
                    None | Some(b'\n') => break,
                    Some(b) if b == quote => state = State::Quoted,
                    Some(b' ') => {}
                    Some(b) => {
                        self.push(b)?;
                        state = State::Unquoted;
                    }
                },
                State::Unquoted => match c {
                    Some(b) if b == quote && !strict => state = State::Quoted,
                    None | Some(b'\n') => {
                        self.close_field()?;
                        break;
                    }
                    Some(b' ') => {
                        self.close_field()?;
                        state = State::WhitespaceSkip;
                    }
                    Some(b) => self.push(b)?,
                },
                State::Quoted => match c {
                    Some(b'\n') if allow_newline => self.push(b'\n')?,
                    None | Some(b'\n') => {
                        self.close_field()?;
                        break;
                    }
                    // A quote only closes the segment before a separator
                    Some(b) if b == quote => match source.peek()? {
                        Some(next) if next == quote => {
                            source.advance()?;
                            self.push(quote)?;
                        }
                        None | Some(b' ') | Some(b'\n') => state = State::Unquoted,
                        Some(_) => self.push(quote)?,
                    },
                    Some(b) => self.push(b)?,
                },
            }
        }

        if self.spans.is_empty() {
            self.close_field()?;
        }
        Ok(())
    }

    #[inline]
    fn push(&mut self, c: u8) -> Result<()> {
        if self.scratch.len() >= self.max_chars {
            return Err(TextError::TooManyChars {
                line: self.line,
                limit: self.max_chars,
            });
        }
        self.scratch.push(c);
        Ok(())
    }

    #[inline]
    fn close_field(&mut self) -> Result<()> {
        if self.spans.len() >= self.max_fields {
            return Err(TextError::TooManyFields {
                line: self.line,
                limit: self.max_fields,
            });
        }
        let start = self.spans.last().map_or(0, |span| span.end);
        self.spans.push(start..self.scratch.len());
        Ok(())
    }
}

/// One tokenized row, borrowing the tokenizer's scratch buffer
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    text: &'a [u8],
    spans: &'a [Range<usize>],
    line: u64,
}

impl<'a> Row<'a> {
    /// Number of fields; always at least 1
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// 1-based line number at which the row starts
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Field text by index
    pub fn get(&self, index: usize) -> Option<&'a [u8]> {
        let text = self.text;
        self.spans.get(index).map(|span| &text[span.clone()])
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a [u8]> + 'a {
        let text = self.text;
        self.spans.iter().map(move |span| &text[span.clone()])
    }

    /// Copy the fields out as (lossily decoded) strings
    pub fn to_strings(&self) -> Vec<String> {
        self.iter()
            .map(|field| String::from_utf8_lossy(field).into_owned())
            .collect()
    }
}
