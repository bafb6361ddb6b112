//! Binary row layout parsed from a compact format string
//!
//! A format string is a sequence of `[count]code` tokens, for example
//! `"2i1d"` or `"f4B10s"`. For every code except `s` the count repeats the
//! type, one field per instance. For `s` the count is the string width in
//! bytes and the token describes a single field.

use std::fmt;

use crate::error::{Result, TextError};
use crate::types::FieldType;

/// Ordered field types of one decoded row and their total byte stride
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTypeLayout {
    fields: Vec<FieldType>,
    stride: usize,
}

impl FieldTypeLayout {
    /// Parse a format string
    ///
    /// # Examples
    ///
    /// ```
    /// use textreader::FieldTypeLayout;
    ///
    /// assert_eq!(FieldTypeLayout::parse("id")?.stride(), 12);
    /// assert_eq!(FieldTypeLayout::parse("4f10s")?.stride(), 26);
    /// assert!(FieldTypeLayout::parse("4f10").is_err());
    /// # Ok::<(), textreader::TextError>(())
    /// ```
    pub fn parse(format: &str) -> Result<Self> {
        let bytes = format.as_bytes();
        let mut fields = Vec::new();
        let mut stride = 0usize;
        let mut pos = 0;

        while pos < bytes.len() {
            let token_start = pos;
            let mut count: Option<usize> = None;
            while let Some(digit) = bytes.get(pos).filter(|b| b.is_ascii_digit()) {
                let value = count
                    .unwrap_or(0)
                    .checked_mul(10)
                    .and_then(|v| v.checked_add(usize::from(digit - b'0')))
                    .ok_or_else(|| TextError::invalid_format(token_start, "repeat count too large"))?;
                count = Some(value);
                pos += 1;
            }

            let code = *bytes
                .get(pos)
                .ok_or_else(|| TextError::invalid_format(token_start, "repeat count without type"))?;

            let count = match count {
                Some(0) => return Err(TextError::invalid_format(token_start, "zero repeat count")),
                Some(n) => n,
                None => 1,
            };

            let (ty, repeat) = if code == b's' {
                (FieldType::Bytes(count), 1)
            } else {
                let ty = FieldType::from_code(code).ok_or_else(|| {
                    TextError::invalid_format(pos, format!("unknown type code {:?}", code as char))
                })?;
                (ty, count)
            };

            let width = ty
                .size()
                .checked_mul(repeat)
                .and_then(|w| w.checked_add(stride))
                .ok_or_else(|| TextError::invalid_format(token_start, "row stride too large"))?;
            stride = width;

            fields
                .try_reserve(repeat)
                .map_err(|_| TextError::OutOfMemory)?;
            fields.extend(std::iter::repeat(ty).take(repeat));
            pos += 1;
        }

        Ok(FieldTypeLayout { fields, stride })
    }

    /// Total byte width of one decoded row
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of fields the layout decodes
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[FieldType] {
        &self.fields
    }
}

impl fmt::Display for FieldTypeLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for field in &self.fields {
            write!(f, "{}", field)?;
        }
        Ok(())
    }
}
