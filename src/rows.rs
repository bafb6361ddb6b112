//! Row decoding into fixed-stride binary buffers
//!
//! [`RowDecoder`] drives the [`Tokenizer`] row by row, checks every row
//! against the field count of the first data row, converts the requested
//! columns and appends them to a caller-owned destination buffer.
//!
//! Conversion failures are handled in two tiers:
//!
//! - **Local**: a float, complex or datetime token that does not parse is
//!   replaced by a sentinel (NaN, or zero bytes for datetimes); an integer
//!   token with bad syntax is zero-filled. The row is still written.
//! - **Fatal**: tokenizer limits, a changed field count, an invalid column
//!   index, an integer out of range for its type, allocation and I/O
//!   failures abort the decode. Rows written before the failing one remain
//!   valid and are reported in [`RowsError::rows_written`].

use std::fs::File;
use std::io::{Read, Seek};

use tracing::{debug, trace};

use crate::convert::{parse_int, ConvertError, DateTimeFormat, NumberFormat};
use crate::csv::{Row, Tokenizer};
use crate::error::{Result, RowsError, TextError};
use crate::layout::FieldTypeLayout;
use crate::options::ReadOptions;
use crate::source::{BufferedSource, ByteSource, RestoreMode, SourceKind};
use crate::types::FieldType;

/// Decodes rows of one file according to a layout and [`ReadOptions`]
///
/// A decoder holds no file state; every call to [`RowDecoder::decode`] builds
/// its own tokenizer, so one decoder can serve many sources.
#[derive(Debug)]
pub struct RowDecoder<'o> {
    layout: FieldTypeLayout,
    options: &'o ReadOptions,
    numbers: NumberFormat,
    datetime: DateTimeFormat,
}

impl<'o> RowDecoder<'o> {
    /// Build a decoder for `format`
    ///
    /// Fails fast on an invalid format string or when `usecols` does not name
    /// exactly one column per layout field.
    pub fn new(format: &str, options: &'o ReadOptions) -> Result<Self> {
        let layout = FieldTypeLayout::parse(format)?;

        if let Some(columns) = &options.usecols {
            if columns.len() != layout.len() {
                return Err(TextError::LayoutMismatch {
                    columns: columns.len(),
                    layout_fields: layout.len(),
                });
            }
        }

        Ok(RowDecoder {
            layout,
            options,
            numbers: options.number_format,
            datetime: options.datetime(),
        })
    }

    pub fn layout(&self) -> &FieldTypeLayout {
        &self.layout
    }

    /// Decode rows from `source` into `dest`
    ///
    /// At most `dest.len() / stride` rows are written (further bounded by
    /// [`ReadOptions::max_rows`]). Returns the number of rows written. The
    /// source is left positioned after the last consumed row.
    pub fn decode<S: ByteSource + ?Sized>(
        &self,
        source: &mut S,
        dest: &mut [u8],
    ) -> std::result::Result<usize, RowsError> {
        let stride = self.layout.stride();
        let mut limit = self.options.max_rows.unwrap_or(usize::MAX);
        if stride > 0 {
            limit = limit.min(dest.len() / stride);
        }

        debug!(
            format = %self.layout,
            stride,
            limit,
            skip_rows = self.options.skip_rows,
            "decoding rows"
        );

        let fail = |e: TextError| RowsError::new(0, e);

        let mut tokenizer = Tokenizer::with_limits(
            self.options.dialect.clone(),
            self.options.max_row_chars,
            self.options.max_fields,
        )
        .map_err(fail)?;

        // Rows are converted here first so a failing row never reaches `dest`
        let mut scratch = Vec::new();
        scratch
            .try_reserve_exact(stride)
            .map_err(|_| fail(TextError::OutOfMemory))?;
        scratch.resize(stride, 0);

        for skipped in 0..self.options.skip_rows {
            if tokenizer.tokenize(source).map_err(fail)?.is_none() {
                debug!(skipped, "input exhausted while skipping rows");
                return Ok(0);
            }
        }

        if limit == 0 {
            return Ok(0);
        }

        let first = match tokenizer.tokenize(source).map_err(fail)? {
            Some(row) => row,
            None => {
                debug!("no data rows");
                return Ok(0);
            }
        };
        let field_count = first.len();
        let columns = self.resolve_columns(field_count).map_err(fail)?;
        debug!(field_count, ?columns, line = first.line(), "schema established");

        self.write_row(&first, &columns, &mut scratch)
            .map_err(fail)?;
        dest[..stride].copy_from_slice(&scratch);
        let mut rows = 1;

        while rows < limit {
            let row = match tokenizer.tokenize(source) {
                Ok(Some(row)) => row,
                Ok(None) => break,
                Err(e) => return Err(RowsError::new(rows, e)),
            };

            if row.len() != field_count {
                return Err(RowsError::new(
                    rows,
                    TextError::ChangedFieldCount {
                        line: row.line(),
                        expected: field_count,
                        found: row.len(),
                    },
                ));
            }

            self.write_row(&row, &columns, &mut scratch)
                .map_err(|e| RowsError::new(rows, e))?;
            dest[rows * stride..(rows + 1) * stride].copy_from_slice(&scratch);
            rows += 1;
        }

        debug!(rows, "decode finished");
        Ok(rows)
    }

    /// Decode, then seek the underlying file to just after the last consumed
    /// byte, whether or not decoding succeeded
    pub fn decode_and_finish<S: ByteSource + ?Sized>(
        &self,
        source: &mut S,
        dest: &mut [u8],
    ) -> std::result::Result<usize, RowsError> {
        let decoded = self.decode(source, dest);
        let restored = source.finish(RestoreMode::ToEnd);
        match (decoded, restored) {
            (Ok(rows), Ok(())) => Ok(rows),
            (Ok(rows), Err(e)) => Err(RowsError::new(rows, e)),
            (Err(e), _) => Err(e),
        }
    }

    /// Resolve `usecols` against the first row's field count
    fn resolve_columns(&self, field_count: usize) -> Result<Vec<usize>> {
        let invalid = |ordinal: usize, index: isize| TextError::InvalidColumnIndex {
            ordinal,
            index,
            field_count,
        };

        match &self.options.usecols {
            Some(columns) => columns
                .iter()
                .enumerate()
                .map(|(ordinal, &index)| {
                    let resolved = if index < 0 {
                        field_count.checked_sub(index.unsigned_abs())
                    } else {
                        Some(index.unsigned_abs())
                    };
                    resolved
                        .filter(|&col| col < field_count)
                        .ok_or_else(|| invalid(ordinal, index))
                })
                .collect(),
            None => (0..self.layout.len())
                .map(|col| {
                    if col < field_count {
                        Ok(col)
                    } else {
                        Err(invalid(col, col as isize))
                    }
                })
                .collect(),
        }
    }

    fn write_row(&self, row: &Row<'_>, columns: &[usize], slot: &mut [u8]) -> Result<()> {
        let mut offset = 0;
        for (ordinal, (&col, ty)) in columns.iter().zip(self.layout.fields()).enumerate() {
            let size = ty.size();
            let token = row.get(col).unwrap_or_default();
            self.write_field(*ty, token, &mut slot[offset..offset + size])
                .map_err(|_| TextError::IntegerOverflow {
                    line: row.line(),
                    column: ordinal,
                })?;
            offset += size;
        }
        Ok(())
    }

    /// Convert one token into its binary encoding
    ///
    /// Only integer range overflow is reported; every other failure writes
    /// the type's sentinel.
    fn write_field(
        &self,
        ty: FieldType,
        token: &[u8],
        out: &mut [u8],
    ) -> std::result::Result<(), ConvertError> {
        macro_rules! put_int {
            ($t:ty) => {
                match parse_int::<$t>(token) {
                    Ok(v) => out.copy_from_slice(&v.to_ne_bytes()),
                    Err(ConvertError::Syntax) => {
                        trace!(?token, "integer syntax error, zero-filled");
                        out.fill(0);
                    }
                    Err(ConvertError::Overflow) => return Err(ConvertError::Overflow),
                }
            };
        }

        match ty {
            FieldType::Int8 => put_int!(i8),
            FieldType::UInt8 => put_int!(u8),
            FieldType::Int16 => put_int!(i16),
            FieldType::UInt16 => put_int!(u16),
            FieldType::Int32 => put_int!(i32),
            FieldType::UInt32 => put_int!(u32),
            FieldType::Int64 => put_int!(i64),
            FieldType::UInt64 => put_int!(u64),
            FieldType::Float32 => {
                let v = self.float_or_nan(token);
                out.copy_from_slice(&(v as f32).to_ne_bytes());
            }
            FieldType::Float64 => {
                let v = self.float_or_nan(token);
                out.copy_from_slice(&v.to_ne_bytes());
            }
            FieldType::Complex64 => {
                let (re, im) = self.complex_or_nan(token);
                out[..4].copy_from_slice(&(re as f32).to_ne_bytes());
                out[4..].copy_from_slice(&(im as f32).to_ne_bytes());
            }
            FieldType::Complex128 => {
                let (re, im) = self.complex_or_nan(token);
                out[..8].copy_from_slice(&re.to_ne_bytes());
                out[8..].copy_from_slice(&im.to_ne_bytes());
            }
            FieldType::Bytes(_) => {
                let n = token.len().min(out.len());
                out[..n].copy_from_slice(&token[..n]);
                out[n..].fill(0);
            }
            FieldType::DateTime => match self.datetime.parse_micros(token) {
                Some(micros) => out.copy_from_slice(&micros.to_ne_bytes()),
                None => {
                    trace!(?token, "unparseable datetime, zero-filled");
                    out.fill(0);
                }
            },
        }
        Ok(())
    }

    fn float_or_nan(&self, token: &[u8]) -> f64 {
        self.numbers.parse_f64(token).unwrap_or_else(|e| {
            trace!(?token, error = %e, "float conversion failed, using NaN");
            f64::NAN
        })
    }

    fn complex_or_nan(&self, token: &[u8]) -> (f64, f64) {
        self.numbers.parse_complex(token).unwrap_or_else(|e| {
            trace!(?token, error = %e, "complex conversion failed, using NaN");
            (f64::NAN, f64::NAN)
        })
    }
}

/// Decode rows from an open file into `dest`
///
/// The byte source is chosen by [`ReadOptions::source`]. Reading starts at
/// the file's current position; afterwards the file is positioned just past
/// the last consumed row, so a following call continues where this one
/// stopped.
///
/// # Examples
///
/// ```no_run
/// use std::fs::File;
/// use textreader::{read_rows, ReadOptions};
///
/// let file = File::open("data.csv")?;
/// let mut dest = vec![0u8; 16 * 100];
/// let rows = read_rows(&file, "2i1d", &ReadOptions::default(), &mut dest)?;
/// println!("decoded {} rows", rows);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn read_rows(
    file: &File,
    format: &str,
    options: &ReadOptions,
    dest: &mut [u8],
) -> std::result::Result<usize, RowsError> {
    match options.source {
        SourceKind::Buffered => read_rows_from(file, format, options, dest),
        #[cfg(feature = "mmap")]
        SourceKind::Mapped => {
            let decoder = RowDecoder::new(format, options).map_err(|e| RowsError::new(0, e))?;
            let mut source =
                crate::source::MappedSource::new(file).map_err(|e| RowsError::new(0, e))?;
            decoder.decode_and_finish(&mut source, dest)
        }
    }
}

/// Decode rows from any seekable reader through a [`BufferedSource`]
pub fn read_rows_from<R: Read + Seek>(
    reader: R,
    format: &str,
    options: &ReadOptions,
    dest: &mut [u8],
) -> std::result::Result<usize, RowsError> {
    let decoder = RowDecoder::new(format, options).map_err(|e| RowsError::new(0, e))?;
    let mut source =
        BufferedSource::new(reader, options.buffer_capacity).map_err(|e| RowsError::new(0, e))?;
    decoder.decode_and_finish(&mut source, dest)
}

/// Rows decoded into a buffer allocated by [`read_all`]
#[derive(Debug, Clone, PartialEq)]
pub struct RowBuffer {
    data: Vec<u8>,
    rows: usize,
    layout: FieldTypeLayout,
}

impl RowBuffer {
    /// Number of decoded rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn layout(&self) -> &FieldTypeLayout {
        &self.layout
    }

    /// Raw bytes of all rows, `rows * stride` long
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Raw bytes of one row
    pub fn row(&self, index: usize) -> Option<&[u8]> {
        let stride = self.layout.stride();
        if index >= self.rows {
            return None;
        }
        self.data.get(index * stride..(index + 1) * stride)
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// Count the rows, allocate a destination and decode into it
///
/// The reader is left positioned after the last decoded row.
pub fn read_all<R: Read + Seek>(
    mut reader: R,
    format: &str,
    options: &ReadOptions,
) -> Result<RowBuffer> {
    let decoder = RowDecoder::new(format, options)?;
    let layout = decoder.layout().clone();

    let mut rows = count_rows(&mut reader, options)?.saturating_sub(options.skip_rows);
    if let Some(max) = options.max_rows {
        rows = rows.min(max);
    }

    let len = rows
        .checked_mul(layout.stride())
        .ok_or(TextError::OutOfMemory)?;
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| TextError::OutOfMemory)?;
    data.resize(len, 0);

    let options = ReadOptions {
        max_rows: Some(rows),
        ..options.clone()
    };
    let decoder = RowDecoder::new(format, &options)?;
    let mut source = BufferedSource::new(&mut reader, options.buffer_capacity)?;
    let written = decoder.decode_and_finish(&mut source, &mut data)?;

    data.truncate(written * layout.stride());
    Ok(RowBuffer {
        data,
        rows: written,
        layout,
    })
}

/// Count the rows remaining in `reader`
///
/// Full-line comments are not rows; a quoted field spanning lines belongs to
/// one row. The reader is restored to its position at the call. An empty
/// input has zero rows.
pub fn count_rows<R: Read + Seek>(reader: R, options: &ReadOptions) -> Result<usize> {
    let mut source = BufferedSource::new(reader, options.buffer_capacity)?;
    let counted = count_with(&mut source, options);
    source.finish(RestoreMode::ToStart)?;
    counted
}

fn count_with<S: ByteSource + ?Sized>(source: &mut S, options: &ReadOptions) -> Result<usize> {
    let mut tokenizer = Tokenizer::with_limits(
        options.dialect.clone(),
        options.max_row_chars,
        options.max_fields,
    )?;
    let mut rows = 0;
    while tokenizer.tokenize(source)?.is_some() {
        rows += 1;
    }
    trace!(rows, "counted rows");
    Ok(rows)
}

/// Count the fields of the next row in `reader`
///
/// Fails with [`TextError::NoData`] when no row remains. The reader is
/// restored to its position at the call.
pub fn count_fields<R: Read + Seek>(reader: R, options: &ReadOptions) -> Result<usize> {
    let mut source = BufferedSource::new(reader, options.buffer_capacity)?;
    let counted = Tokenizer::with_limits(
        options.dialect.clone(),
        options.max_row_chars,
        options.max_fields,
    )
    .and_then(|mut tokenizer| {
        let fields = tokenizer.tokenize(&mut source)?.map(|row| row.len());
        fields.ok_or(TextError::NoData)
    });
    source.finish(RestoreMode::ToStart)?;
    counted
}
