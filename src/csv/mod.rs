//! Delimited-text tokenizing

mod tokenizer;

pub use tokenizer::{
    Delimiter, Dialect, Row, Tokenizer, DEFAULT_MAX_CHARS, DEFAULT_MAX_FIELDS,
};
