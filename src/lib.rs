//! # textreader
//!
//! Streaming reader that converts delimited text files (CSV-like, with
//! configurable delimiter, quote and comment characters, or
//! whitespace-separated columns) into typed, fixed-stride binary rows.
//!
//! ## Features
//!
//! - **Bounded memory**: files are read through a fixed-size buffer (or a
//!   memory map) and one row at a time is tokenized into a bounded scratch
//!   buffer
//! - **Quoting**: quoted fields may hold delimiters, doubled quote
//!   characters and, optionally, newlines
//! - **Typed output**: 1/2/4/8-byte integers, 32/64-bit floats, complex
//!   numbers, fixed-width strings and microsecond datetimes, described by a
//!   compact format string such as `"2i1d"`
//! - **Locale notation**: configurable decimal point and exponent marker
//!   (e.g. `1,5D2`)
//! - **Strict parsing**: integers are base 10 only and range-checked
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::fs::File;
//! use textreader::{read_rows, FieldTypeLayout, ReadOptions};
//!
//! let file = File::open("measurements.csv")?;
//! let options = ReadOptions::default().comment(b'#').usecols(vec![0, 2, -1]);
//!
//! let layout = FieldTypeLayout::parse("2i1d")?;
//! let mut dest = vec![0u8; layout.stride() * 1000];
//! let rows = read_rows(&file, "2i1d", &options, &mut dest)?;
//! println!("decoded {} rows", rows);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Cargo Features
//!
//! - `mmap`: memory-mapped byte source ([`source::SourceKind::Mapped`])
//! - `parallel`: decode many files concurrently with rayon
//! - `serde`: serialize and deserialize [`ReadOptions`]

pub mod convert;
pub mod csv;
pub mod error;
pub mod layout;
pub mod options;
#[cfg(feature = "parallel")]
pub mod parallel;
pub mod rows;
pub mod source;
pub mod types;

pub use csv::{Delimiter, Dialect, Row, Tokenizer};
pub use error::{Result, RowsError, TextError};
pub use layout::FieldTypeLayout;
pub use options::ReadOptions;
pub use rows::{count_fields, count_rows, read_all, read_rows, read_rows_from, RowBuffer, RowDecoder};
pub use source::{BufferedSource, ByteSource, RestoreMode, SourceKind};
#[cfg(feature = "mmap")]
pub use source::MappedSource;
pub use types::FieldType;
