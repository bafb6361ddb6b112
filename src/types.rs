//! Binary field types of a decoded row

use std::fmt;

/// Fixed-width binary type of one decoded field
///
/// Every value is written in platform-native byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// `b`: 8 bit signed integer
    Int8,
    /// `B`: 8 bit unsigned integer
    UInt8,
    /// `h`: 16 bit signed integer
    Int16,
    /// `H`: 16 bit unsigned integer
    UInt16,
    /// `i`: 32 bit signed integer
    Int32,
    /// `I`: 32 bit unsigned integer
    UInt32,
    /// `q`: 64 bit signed integer
    Int64,
    /// `Q`: 64 bit unsigned integer
    UInt64,
    /// `f`: 32 bit float
    Float32,
    /// `d`: 64 bit float
    Float64,
    /// `c`: complex of two 32 bit floats
    Complex64,
    /// `z`: complex of two 64 bit floats
    Complex128,
    /// `Ns`: fixed-width byte string of N bytes, zero padded
    Bytes(usize),
    /// `U`: signed 64 bit count of microseconds since the Unix epoch
    DateTime,
}

impl FieldType {
    /// Type for a single-character format code
    ///
    /// `s` is not covered here since its width comes from the repeat count.
    pub fn from_code(code: u8) -> Option<Self> {
        let ty = match code {
            b'b' => FieldType::Int8,
            b'B' => FieldType::UInt8,
            b'h' => FieldType::Int16,
            b'H' => FieldType::UInt16,
            b'i' => FieldType::Int32,
            b'I' => FieldType::UInt32,
            b'q' => FieldType::Int64,
            b'Q' => FieldType::UInt64,
            b'f' => FieldType::Float32,
            b'd' => FieldType::Float64,
            b'c' => FieldType::Complex64,
            b'z' => FieldType::Complex128,
            b'U' => FieldType::DateTime,
            _ => return None,
        };
        Some(ty)
    }

    /// Format code of this type
    pub fn code(&self) -> char {
        match self {
            FieldType::Int8 => 'b',
            FieldType::UInt8 => 'B',
            FieldType::Int16 => 'h',
            FieldType::UInt16 => 'H',
            FieldType::Int32 => 'i',
            FieldType::UInt32 => 'I',
            FieldType::Int64 => 'q',
            FieldType::UInt64 => 'Q',
            FieldType::Float32 => 'f',
            FieldType::Float64 => 'd',
            FieldType::Complex64 => 'c',
            FieldType::Complex128 => 'z',
            FieldType::Bytes(_) => 's',
            FieldType::DateTime => 'U',
        }
    }

    /// Width in bytes of the binary encoding
    pub fn size(&self) -> usize {
        match self {
            FieldType::Int8 | FieldType::UInt8 => 1,
            FieldType::Int16 | FieldType::UInt16 => 2,
            FieldType::Int32 | FieldType::UInt32 | FieldType::Float32 => 4,
            FieldType::Int64
            | FieldType::UInt64
            | FieldType::Float64
            | FieldType::Complex64
            | FieldType::DateTime => 8,
            FieldType::Complex128 => 16,
            FieldType::Bytes(width) => *width,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Bytes(width) => write!(f, "{}s", width),
            other => write!(f, "{}", other.code()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        for code in b"bBhHiIqQfdczU" {
            let ty = FieldType::from_code(*code).unwrap();
            assert_eq!(ty.code(), *code as char);
        }
        assert_eq!(FieldType::from_code(b's'), None);
        assert_eq!(FieldType::from_code(b'p'), None);
    }

    #[test]
    fn test_sizes() {
        assert_eq!(FieldType::UInt8.size(), 1);
        assert_eq!(FieldType::Int16.size(), 2);
        assert_eq!(FieldType::Float32.size(), 4);
        assert_eq!(FieldType::Complex64.size(), 8);
        assert_eq!(FieldType::Complex128.size(), 16);
        assert_eq!(FieldType::DateTime.size(), 8);
        assert_eq!(FieldType::Bytes(10).size(), 10);
    }

    #[test]
    fn test_display() {
        assert_eq!(FieldType::Bytes(3).to_string(), "3s");
        assert_eq!(FieldType::Float64.to_string(), "d");
    }
}
