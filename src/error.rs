//! Error types for tokenizing and decoding text rows

use thiserror::Error;

/// Result type alias for textreader operations
pub type Result<T> = std::result::Result<T, TextError>;

/// Errors raised while reading, tokenizing or decoding rows
///
/// Every variant maps to a stable integer code (see [`TextError::code`]) so a
/// binding layer can surface it across a language boundary.
#[derive(Error, Debug)]
pub enum TextError {
    /// A scratch or destination allocation failed
    #[error("Out of memory")]
    OutOfMemory,

    /// A requested use-column does not exist in the first data row
    #[error("Invalid column index {index} at usecols position {ordinal} (row has {field_count} fields)")]
    InvalidColumnIndex {
        ordinal: usize,
        index: isize,
        field_count: usize,
    },

    /// The number of use-columns does not match the number of layout fields
    #[error("{columns} columns requested but the format describes {layout_fields} fields")]
    LayoutMismatch {
        columns: usize,
        layout_fields: usize,
    },

    /// A row after the first has a different number of fields
    #[error("Changed number of fields at line {line}: expected {expected}, found {found}")]
    ChangedFieldCount {
        line: u64,
        expected: usize,
        found: usize,
    },

    /// A row holds more text than the tokenizer scratch buffer
    #[error("Line {line} too long: more than {limit} characters")]
    TooManyChars { line: u64, limit: usize },

    /// A row holds more fields than the tokenizer supports
    #[error("Too many fields at line {line}: more than {limit}")]
    TooManyFields { line: u64, limit: usize },

    /// The input holds no row at all
    #[error("No data")]
    NoData,

    /// The binary layout format string could not be parsed
    #[error("Invalid format at position {position}: {reason}")]
    InvalidFormat { position: usize, reason: String },

    /// An integer field does not fit its destination type
    #[error("Integer overflow at line {line}, column {column}")]
    IntegerOverflow { line: u64, column: usize },

    /// A caller-supplied option is unusable
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An I/O error from the underlying file, distinct from end of input
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TextError {
    /// Stable integer code for this error kind
    pub fn code(&self) -> i32 {
        match self {
            TextError::OutOfMemory => 1,
            TextError::InvalidColumnIndex { .. } => 10,
            TextError::LayoutMismatch { .. } => 11,
            TextError::ChangedFieldCount { .. } => 12,
            TextError::TooManyChars { .. } => 21,
            TextError::TooManyFields { .. } => 22,
            TextError::NoData => 23,
            TextError::InvalidFormat { .. } => 30,
            TextError::IntegerOverflow { .. } => 31,
            TextError::InvalidArgument(_) => 32,
            TextError::Io(_) => 40,
        }
    }

    /// Positional context: the 1-based line number of the failing row, or
    /// the offending usecols ordinal for [`TextError::InvalidColumnIndex`]
    pub fn position(&self) -> Option<u64> {
        match self {
            TextError::InvalidColumnIndex { ordinal, .. } => Some(*ordinal as u64),
            TextError::ChangedFieldCount { line, .. }
            | TextError::TooManyChars { line, .. }
            | TextError::TooManyFields { line, .. }
            | TextError::IntegerOverflow { line, .. } => Some(*line),
            _ => None,
        }
    }

    pub(crate) fn invalid_format(position: usize, reason: impl Into<String>) -> Self {
        TextError::InvalidFormat {
            position,
            reason: reason.into(),
        }
    }
}

/// A fatal decode error together with the rows already written
///
/// Rows written before the failure remain valid in the destination buffer.
#[derive(Error, Debug)]
#[error("{error} (after {rows_written} rows)")]
pub struct RowsError {
    pub rows_written: usize,
    #[source]
    pub error: TextError,
}

impl RowsError {
    pub(crate) fn new(rows_written: usize, error: TextError) -> Self {
        RowsError {
            rows_written,
            error,
        }
    }

    /// Stable integer code of the underlying error
    pub fn code(&self) -> i32 {
        self.error.code()
    }
}

impl From<RowsError> for TextError {
    fn from(err: RowsError) -> Self {
        err.error
    }
}
