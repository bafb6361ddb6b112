//! Strict text-to-number conversions
//!
//! Every parser consumes the whole token; leading and trailing ASCII
//! whitespace is permitted, anything else left over is a syntax error.

use std::borrow::Cow;
use std::num::{IntErrorKind, ParseIntError};
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Default datetime pattern (`YYYY-MM-DD HH:MM:SS`)
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Failure of a single field conversion
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertError {
    /// The token is not a number of the requested kind
    #[error("invalid number syntax")]
    Syntax,
    /// The token is a valid number outside the target range
    #[error("number out of range")]
    Overflow,
}

#[inline]
fn trim(token: &[u8]) -> &[u8] {
    token.trim_ascii()
}

/// Parse a base-10 integer into `T`, range-checked against `T`
///
/// A leading zero never selects octal: `"012"` is 12.
///
/// ```
/// use textreader::convert::{parse_int, ConvertError};
///
/// assert_eq!(parse_int::<i32>(b" 012 "), Ok(12));
/// assert_eq!(parse_int::<i8>(b"99999"), Err(ConvertError::Overflow));
/// assert_eq!(parse_int::<u8>(b"-1"), Err(ConvertError::Overflow));
/// assert_eq!(parse_int::<i8>(b"12a"), Err(ConvertError::Syntax));
/// ```
pub fn parse_int<T>(token: &[u8]) -> Result<T, ConvertError>
where
    T: FromStr<Err = ParseIntError>,
{
    let text = std::str::from_utf8(trim(token)).map_err(|_| ConvertError::Syntax)?;
    match text.parse::<T>() {
        Ok(value) => Ok(value),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => Err(ConvertError::Overflow),
            _ => negative_unsigned(text),
        },
    }
}

/// Classify a token rejected by an unsigned parse: `-<digits>` is below the
/// type's minimum unless every digit is zero
fn negative_unsigned<T>(text: &str) -> Result<T, ConvertError>
where
    T: FromStr<Err = ParseIntError>,
{
    match text.strip_prefix('-') {
        Some(digits) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
            if digits.bytes().all(|b| b == b'0') {
                digits.parse::<T>().map_err(|_| ConvertError::Syntax)
            } else {
                Err(ConvertError::Overflow)
            }
        }
        _ => Err(ConvertError::Syntax),
    }
}

/// Locale-style notation for floating point tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NumberFormat {
    /// Decimal point character. Default: `.`.
    pub decimal: u8,
    /// Exponent marker, matched case-insensitively. Default: `E`.
    pub exponent: u8,
}

impl Default for NumberFormat {
    fn default() -> Self {
        NumberFormat {
            decimal: b'.',
            exponent: b'E',
        }
    }
}

impl NumberFormat {
    pub fn new(decimal: u8, exponent: u8) -> Self {
        NumberFormat { decimal, exponent }
    }

    fn is_standard(&self) -> bool {
        self.decimal == b'.' && self.exponent.eq_ignore_ascii_case(&b'e')
    }

    /// Trim and rewrite the token into standard `.`/`e` notation
    fn normalize<'t>(&self, token: &'t [u8]) -> Cow<'t, [u8]> {
        let token = trim(token);
        if self.is_standard() {
            return Cow::Borrowed(token);
        }
        Cow::Owned(
            token
                .iter()
                .map(|&b| {
                    if b == self.decimal {
                        b'.'
                    } else if b.eq_ignore_ascii_case(&self.exponent) {
                        b'e'
                    } else {
                        b
                    }
                })
                .collect(),
        )
    }

    /// Parse a floating point token
    ///
    /// Out-of-range magnitudes (overflow to infinity from finite digits, or
    /// nonzero digits underflowing to zero) are reported as
    /// [`ConvertError::Overflow`].
    ///
    /// ```
    /// use textreader::convert::NumberFormat;
    ///
    /// let fortran = NumberFormat::new(b',', b'D');
    /// assert_eq!(fortran.parse_f64(b"1,5D2"), Ok(150.0));
    /// ```
    pub fn parse_f64(&self, token: &[u8]) -> Result<f64, ConvertError> {
        let normalized = self.normalize(token);
        parse_standard_f64(&normalized)
    }

    /// Parse a complex token: `a`, `bi`, `a+bi` or `a-bi`
    ///
    /// `i` and `j` are interchangeable imaginary markers.
    ///
    /// ```
    /// use textreader::convert::NumberFormat;
    ///
    /// let format = NumberFormat::default();
    /// assert_eq!(format.parse_complex(b"1.0-2.0j"), Ok((1.0, -2.0)));
    /// assert_eq!(format.parse_complex(b"3i"), Ok((0.0, 3.0)));
    /// ```
    pub fn parse_complex(&self, token: &[u8]) -> Result<(f64, f64), ConvertError> {
        let normalized = self.normalize(token);
        let s: &[u8] = &normalized;

        let n = float_prefix_len(s);
        if n == 0 {
            return Err(ConvertError::Syntax);
        }
        let first = parse_standard_f64(&s[..n])?;
        let rest = &s[n..];

        match rest {
            [] => Ok((first, 0.0)),
            [marker] if is_imaginary_marker(*marker) => Ok((0.0, first)),
            [b'+' | b'-', ..] => {
                let m = float_prefix_len(rest);
                if m == 0 {
                    return Err(ConvertError::Syntax);
                }
                let second = parse_standard_f64(&rest[..m])?;
                match &rest[m..] {
                    [marker] if is_imaginary_marker(*marker) => Ok((first, second)),
                    _ => Err(ConvertError::Syntax),
                }
            }
            _ => Err(ConvertError::Syntax),
        }
    }
}

#[inline]
fn is_imaginary_marker(b: u8) -> bool {
    matches!(b, b'i' | b'j' | b'I' | b'J')
}

fn parse_standard_f64(token: &[u8]) -> Result<f64, ConvertError> {
    if token.is_empty() {
        return Err(ConvertError::Syntax);
    }
    let text = std::str::from_utf8(token).map_err(|_| ConvertError::Syntax)?;
    let value = text.parse::<f64>().map_err(|_| ConvertError::Syntax)?;
    if value.is_infinite() && !token.iter().any(|b| b.eq_ignore_ascii_case(&b'i')) {
        return Err(ConvertError::Overflow);
    }
    if value == 0.0 && has_nonzero_mantissa(token) {
        return Err(ConvertError::Overflow);
    }
    Ok(value)
}

/// Whether the digits before the exponent marker include a nonzero one
///
/// A zero result from such a token means the magnitude underflowed.
fn has_nonzero_mantissa(token: &[u8]) -> bool {
    token
        .iter()
        .take_while(|b| !b.eq_ignore_ascii_case(&b'e'))
        .any(|b| matches!(b, b'1'..=b'9'))
}

/// Length of the longest prefix of `s` that reads as a float in standard
/// notation: optional sign, digits with optional fraction, optional
/// exponent, or one of `inf`, `infinity`, `nan`
fn float_prefix_len(s: &[u8]) -> usize {
    let mut i = 0;
    if matches!(s.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    for word in ["infinity", "inf", "nan"] {
        let w = word.as_bytes();
        if s.len() >= i + w.len() && s[i..i + w.len()].eq_ignore_ascii_case(w) {
            return i + w.len();
        }
    }

    let digits = |from: usize| s[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let mut mantissa = digits(i);
    i += mantissa;
    if s.get(i) == Some(&b'.') {
        let fraction = digits(i + 1);
        mantissa += fraction;
        i += 1 + fraction;
    }
    if mantissa == 0 {
        return 0;
    }

    if matches!(s.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(s.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exponent = digits(j);
        if exponent > 0 {
            i = j + exponent;
        }
    }
    i
}

/// Datetime pattern plus the UTC offset of the wall-clock values it reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTimeFormat {
    pattern: String,
    tz_offset_seconds: i64,
}

impl Default for DateTimeFormat {
    fn default() -> Self {
        DateTimeFormat::new(DEFAULT_DATETIME_FORMAT, 0)
    }
}

impl DateTimeFormat {
    /// `pattern` uses strftime-style specifiers; an empty pattern selects
    /// [`DEFAULT_DATETIME_FORMAT`]
    pub fn new(pattern: &str, tz_offset_seconds: i64) -> Self {
        let pattern = if pattern.is_empty() {
            DEFAULT_DATETIME_FORMAT
        } else {
            pattern
        };
        DateTimeFormat {
            pattern: pattern.to_string(),
            tz_offset_seconds,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Parse a token into microseconds since the Unix epoch (UTC)
    ///
    /// The token is read as wall-clock time at `tz_offset_seconds` east of
    /// UTC. A pattern without a time component reads as midnight.
    ///
    /// ```
    /// use textreader::convert::DateTimeFormat;
    ///
    /// let utc = DateTimeFormat::default();
    /// assert_eq!(utc.parse_micros(b"1970-01-01 00:01:00"), Some(60_000_000));
    ///
    /// let plus_one = DateTimeFormat::new("%Y-%m-%d %H:%M", 3600);
    /// assert_eq!(plus_one.parse_micros(b"1970-01-01 01:00"), Some(0));
    /// ```
    pub fn parse_micros(&self, token: &[u8]) -> Option<i64> {
        let text = std::str::from_utf8(trim(token)).ok()?;
        let naive = NaiveDateTime::parse_from_str(text, &self.pattern)
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(text, &self.pattern)
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })?;

        naive
            .and_utc()
            .timestamp_micros()
            .checked_sub(self.tz_offset_seconds.checked_mul(1_000_000)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_base_ten_only() {
        assert_eq!(parse_int::<i64>(b"012"), Ok(12));
        assert_eq!(parse_int::<i64>(b"0x10"), Err(ConvertError::Syntax));
        assert_eq!(parse_int::<i16>(b"  -42"), Ok(-42));
        assert_eq!(parse_int::<u8>(b"+7 "), Ok(7));
    }

    #[test]
    fn test_int_overflow_is_distinct() {
        assert_eq!(parse_int::<i8>(b"99999"), Err(ConvertError::Overflow));
        assert_eq!(parse_int::<i8>(b"-129"), Err(ConvertError::Overflow));
        assert_eq!(parse_int::<u16>(b"65536"), Err(ConvertError::Overflow));
        assert_eq!(parse_int::<u16>(b"-1"), Err(ConvertError::Overflow));
        assert_eq!(parse_int::<u8>(b" -300 "), Err(ConvertError::Overflow));
        assert_eq!(parse_int::<u64>(b"-0"), Ok(0));
        assert_eq!(parse_int::<u32>(b"-"), Err(ConvertError::Syntax));
        assert_eq!(parse_int::<u32>(b"-1x"), Err(ConvertError::Syntax));
        assert_eq!(parse_int::<i32>(b""), Err(ConvertError::Syntax));
        assert_eq!(parse_int::<i32>(b"1.5"), Err(ConvertError::Syntax));
        assert_eq!(parse_int::<i32>(b"1 2"), Err(ConvertError::Syntax));
    }

    #[test]
    fn test_float_default_notation() {
        let format = NumberFormat::default();
        assert_eq!(format.parse_f64(b" 1.0 "), Ok(1.0));
        assert_eq!(format.parse_f64(b"2.5e-1"), Ok(0.25));
        assert_eq!(format.parse_f64(b"2.5E1"), Ok(25.0));
        assert_eq!(format.parse_f64(b"-inf"), Ok(f64::NEG_INFINITY));
        assert!(format.parse_f64(b"nan").unwrap().is_nan());
        assert_eq!(format.parse_f64(b""), Err(ConvertError::Syntax));
        assert_eq!(format.parse_f64(b"1.5x"), Err(ConvertError::Syntax));
        assert_eq!(format.parse_f64(b"1e999"), Err(ConvertError::Overflow));
    }

    #[test]
    fn test_float_underflow_is_range_error() {
        let format = NumberFormat::default();
        assert_eq!(format.parse_f64(b"1e-400"), Err(ConvertError::Overflow));
        assert_eq!(format.parse_f64(b"-2.5E-999"), Err(ConvertError::Overflow));
        assert_eq!(format.parse_f64(b"0.000e-400"), Ok(0.0));
        assert_eq!(format.parse_f64(b"0"), Ok(0.0));
        assert_eq!(format.parse_f64(b"1e-300"), Ok(1e-300));
        assert_eq!(format.parse_complex(b"1e-400+2j"), Err(ConvertError::Overflow));
    }

    #[test]
    fn test_float_custom_notation() {
        let format = NumberFormat::new(b',', b'D');
        assert_eq!(format.parse_f64(b"1,5D2"), Ok(150.0));
        assert_eq!(format.parse_f64(b"1,5d2"), Ok(150.0));
        assert_eq!(format.parse_f64(b"-2,25"), Ok(-2.25));

        let sci_d = NumberFormat::new(b'.', b'D');
        assert_eq!(sci_d.parse_f64(b"1.0D+01"), Ok(10.0));
    }

    #[test]
    fn test_complex_forms() {
        let format = NumberFormat::default();
        assert_eq!(format.parse_complex(b"  1.0-2.0j"), Ok((1.0, -2.0)));
        assert_eq!(format.parse_complex(b" 3+4j"), Ok((3.0, 4.0)));
        assert_eq!(format.parse_complex(b"5.0e-1"), Ok((0.5, 0.0)));
        assert_eq!(format.parse_complex(b"6.0+0j "), Ok((6.0, 0.0)));
        assert_eq!(format.parse_complex(b"-2.5i"), Ok((0.0, -2.5)));
        assert_eq!(format.parse_complex(b"1e2+1e-1I"), Ok((100.0, 0.1)));
    }

    #[test]
    fn test_complex_rejects_partial() {
        let format = NumberFormat::default();
        assert_eq!(format.parse_complex(b""), Err(ConvertError::Syntax));
        assert_eq!(format.parse_complex(b"j"), Err(ConvertError::Syntax));
        assert_eq!(format.parse_complex(b"1+2"), Err(ConvertError::Syntax));
        assert_eq!(format.parse_complex(b"1+2jx"), Err(ConvertError::Syntax));
        assert_eq!(format.parse_complex(b"1x"), Err(ConvertError::Syntax));
    }

    #[test]
    fn test_complex_custom_notation() {
        let format = NumberFormat::new(b',', b'D');
        assert_eq!(format.parse_complex(b"1,5D1-0,5j"), Ok((15.0, -0.5)));
    }

    #[test]
    fn test_float_prefix_len() {
        assert_eq!(float_prefix_len(b"1.5e3+2j"), 5);
        assert_eq!(float_prefix_len(b"-.5"), 3);
        assert_eq!(float_prefix_len(b"1e"), 1);
        assert_eq!(float_prefix_len(b"."), 0);
        assert_eq!(float_prefix_len(b"-inf"), 4);
    }

    #[test]
    fn test_datetime() {
        let format = DateTimeFormat::new("%Y-%m-%d %H:%M", 0);
        assert_eq!(
            format.parse_micros(b"2011-01-02 00:30"),
            Some(1_293_928_200_000_000)
        );
        assert_eq!(format.parse_micros(b"garbage"), None);

        let dates = DateTimeFormat::new("%m/%d/%Y", 0);
        assert_eq!(dates.parse_micros(b"01/02/1970"), Some(86_400_000_000));
    }

    #[test]
    fn test_datetime_default_pattern_and_offset() {
        let format = DateTimeFormat::new("", -3600);
        assert_eq!(format.pattern(), DEFAULT_DATETIME_FORMAT);
        assert_eq!(
            format.parse_micros(b"1970-01-01 00:00:00"),
            Some(3_600_000_000)
        );
    }
}
