//! Reader configuration

use crate::convert::{DateTimeFormat, NumberFormat, DEFAULT_DATETIME_FORMAT};
use crate::csv::{Delimiter, Dialect, DEFAULT_MAX_CHARS, DEFAULT_MAX_FIELDS};
use crate::source::{SourceKind, DEFAULT_BUFFER_CAPACITY};

/// Options for counting and decoding rows
///
/// Built with consuming setters on top of [`ReadOptions::default`].
///
/// # Examples
///
/// ```
/// use textreader::ReadOptions;
///
/// let options = ReadOptions::default()
///     .delimiter(b';')
///     .comment(b'#')
///     .decimal(b',')
///     .usecols(vec![0, -1])
///     .skip_rows(1);
/// assert_eq!(options.skip_rows, 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReadOptions {
    /// Quoting and separation rules
    pub dialect: Dialect,
    /// Decimal point and exponent characters
    pub number_format: NumberFormat,
    /// strftime-style pattern for datetime fields. Default: `%Y-%m-%d %H:%M:%S`.
    pub datetime_format: String,
    /// UTC offset, in seconds east, of datetime fields. Default: `0`.
    pub tz_offset_seconds: i64,
    /// Columns to decode, one per layout field; negative indices count from
    /// the end of the row. Default: the first `n` columns for an `n`-field layout.
    pub usecols: Option<Vec<isize>>,
    /// Rows to tokenize and discard before decoding. Default: `0`.
    pub skip_rows: usize,
    /// Upper bound on decoded rows, in addition to the destination capacity
    pub max_rows: Option<usize>,
    /// Read buffer size of the buffered source. Default: 64 KiB.
    pub buffer_capacity: usize,
    /// Limit on field text per row. Default: 65 536 bytes.
    pub max_row_chars: usize,
    /// Limit on fields per row. Default: 4 096.
    pub max_fields: usize,
    /// Byte source strategy. Default: buffered.
    pub source: SourceKind,
}

impl Default for ReadOptions {
    fn default() -> Self {
        ReadOptions {
            dialect: Dialect::default(),
            number_format: NumberFormat::default(),
            datetime_format: DEFAULT_DATETIME_FORMAT.to_string(),
            tz_offset_seconds: 0,
            usecols: None,
            skip_rows: 0,
            max_rows: None,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            max_row_chars: DEFAULT_MAX_CHARS,
            max_fields: DEFAULT_MAX_FIELDS,
            source: SourceKind::default(),
        }
    }
}

impl ReadOptions {
    /// Set a single-byte field delimiter
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.dialect.delimiter = Delimiter::Byte(delimiter);
        self
    }

    /// Separate fields by runs of spaces
    pub fn whitespace_delimited(mut self) -> Self {
        self.dialect.delimiter = Delimiter::Whitespace;
        self
    }

    pub fn quote(mut self, quote: u8) -> Self {
        self.dialect.quote = quote;
        self
    }

    pub fn comment(mut self, comment: u8) -> Self {
        self.dialect.comment = Some(comment);
        self
    }

    pub fn allow_embedded_newline(mut self, allow: bool) -> Self {
        self.dialect.allow_embedded_newline = allow;
        self
    }

    pub fn strict_quoting(mut self, strict: bool) -> Self {
        self.dialect.strict_quoting = strict;
        self
    }

    /// Set the decimal point character of float fields
    pub fn decimal(mut self, decimal: u8) -> Self {
        self.number_format.decimal = decimal;
        self
    }

    /// Set the exponent marker of float fields (e.g. `b'D'` for Fortran output)
    pub fn exponent(mut self, exponent: u8) -> Self {
        self.number_format.exponent = exponent;
        self
    }

    pub fn datetime_format(mut self, pattern: impl Into<String>) -> Self {
        self.datetime_format = pattern.into();
        self
    }

    pub fn tz_offset_seconds(mut self, offset: i64) -> Self {
        self.tz_offset_seconds = offset;
        self
    }

    pub fn usecols(mut self, columns: Vec<isize>) -> Self {
        self.usecols = Some(columns);
        self
    }

    pub fn skip_rows(mut self, rows: usize) -> Self {
        self.skip_rows = rows;
        self
    }

    pub fn max_rows(mut self, rows: usize) -> Self {
        self.max_rows = Some(rows);
        self
    }

    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Set the per-row limits on field text and field count
    pub fn row_limits(mut self, max_chars: usize, max_fields: usize) -> Self {
        self.max_row_chars = max_chars;
        self.max_fields = max_fields;
        self
    }

    pub fn source(mut self, source: SourceKind) -> Self {
        self.source = source;
        self
    }

    pub(crate) fn datetime(&self) -> DateTimeFormat {
        DateTimeFormat::new(&self.datetime_format, self.tz_offset_seconds)
    }
}
