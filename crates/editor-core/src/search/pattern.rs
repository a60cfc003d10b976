use crate::errors::SearchError;

/// How search text is read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchType {
    /// The text's own bytes.
    Ascii,
    /// Hexadecimal byte pairs, whitespace ignored: `"de ad be ef"`.
    Byte,
    /// A decimal integer encoded at a fixed width.
    Integer(IntWidth),
    /// A decimal float encoded as IEEE-754.
    Float(FloatWidth),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FloatWidth {
    F32,
    F64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Endianness {
    #[default]
    Big,
    Little,
}

impl IntWidth {
    #[inline]
    pub fn bytes(self) -> usize {
        match self {
            IntWidth::W8 => 1,
            IntWidth::W16 => 2,
            IntWidth::W32 => 4,
            IntWidth::W64 => 8,
        }
    }

    #[inline]
    pub fn bits(self) -> u32 {
        (self.bytes() * 8) as u32
    }
}

/// Turns search text into the bytes to search for.
///
/// # Errors
///
/// [`SearchError`] describing why the text cannot be read as `search_type`.
pub fn parse_pattern(
    text: &str,
    search_type: SearchType,
    endianness: Endianness,
) -> Result<Vec<u8>, SearchError> {
    let bytes = match search_type {
        SearchType::Ascii => text.as_bytes().to_vec(),
        SearchType::Byte => parse_hex(text)?,
        SearchType::Integer(width) => parse_integer(text.trim(), width, endianness)?,
        SearchType::Float(width) => parse_float(text.trim(), width, endianness)?,
    };

    if bytes.is_empty() {
        return Err(SearchError::EmptyPattern);
    }

    Ok(bytes)
}

fn parse_hex(text: &str) -> Result<Vec<u8>, SearchError> {
    let digits: Vec<u8> = text
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .map(|b| match b {
            b'0'..=b'9' => Ok(b - b'0'),
            b'a'..=b'f' => Ok(b - b'a' + 10),
            b'A'..=b'F' => Ok(b - b'A' + 10),
            _ => Err(SearchError::InvalidHex {
                text: text.to_owned(),
            }),
        })
        .collect::<Result<_, _>>()?;

    if digits.len() % 2 != 0 {
        return Err(SearchError::OddNibbles {
            text: text.to_owned(),
        });
    }

    Ok(digits
        .chunks_exact(2)
        .map(|pair| (pair[0] << 4) | pair[1])
        .collect())
}

fn parse_integer(text: &str, width: IntWidth, endianness: Endianness) -> Result<Vec<u8>, SearchError> {
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let value: i128 = text.parse().map_err(|_| SearchError::InvalidNumber {
        text: text.to_owned(),
    })?;
    let bits = width.bits();
    let min = -(1i128 << (bits - 1));
    let max = (1i128 << bits) - 1;

    if value < min || value > max {
        return Err(SearchError::ValueOutOfRange {
            text: text.to_owned(),
            bits,
        });
    }

    // two's complement, low bytes only
    let mut bytes = (value as u128).to_le_bytes()[..width.bytes()].to_vec();

    if endianness == Endianness::Big {
        bytes.reverse();
    }

    Ok(bytes)
}

fn parse_float(text: &str, width: FloatWidth, endianness: Endianness) -> Result<Vec<u8>, SearchError> {
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let value: f64 = text.parse().map_err(|_| SearchError::InvalidNumber {
        text: text.to_owned(),
    })?;

    Ok(match (width, endianness) {
        (FloatWidth::F64, Endianness::Big) => value.to_be_bytes().to_vec(),
        (FloatWidth::F64, Endianness::Little) => value.to_le_bytes().to_vec(),
        (FloatWidth::F32, _) => {
            let narrowed = value as f32;

            if value.is_finite() && !narrowed.is_finite() {
                return Err(SearchError::ValueOutOfRange {
                    text: text.to_owned(),
                    bits: 32,
                });
            }

            match endianness {
                Endianness::Big => narrowed.to_be_bytes().to_vec(),
                Endianness::Little => narrowed.to_le_bytes().to_vec(),
            }
        }
    })
}

#[cfg(test)]
mod pattern_tests {
    use crate::errors::SearchError;
    use crate::search::pattern::{Endianness, FloatWidth, IntWidth, SearchType, parse_pattern};

    #[test]
    fn hex_pairs_with_and_without_spaces() {
        assert_eq!(
            parse_pattern("43 44", SearchType::Byte, Endianness::Big).unwrap(),
            vec![0x43, 0x44]
        );
        assert_eq!(
            parse_pattern("dEaDbeef", SearchType::Byte, Endianness::Big).unwrap(),
            vec![0xde, 0xad, 0xbe, 0xef]
        );
    }

    #[test]
    fn malformed_hex_is_rejected() {
        assert!(matches!(
            parse_pattern("4g", SearchType::Byte, Endianness::Big),
            Err(SearchError::InvalidHex { .. })
        ));
        assert!(matches!(
            parse_pattern("434", SearchType::Byte, Endianness::Big),
            Err(SearchError::OddNibbles { .. })
        ));
        assert_eq!(
            parse_pattern("   ", SearchType::Byte, Endianness::Big),
            Err(SearchError::EmptyPattern)
        );
    }

    #[test]
    fn ascii_is_taken_verbatim() {
        assert_eq!(
            parse_pattern("CD", SearchType::Ascii, Endianness::Little).unwrap(),
            b"CD".to_vec()
        );
        assert_eq!(
            parse_pattern("", SearchType::Ascii, Endianness::Little),
            Err(SearchError::EmptyPattern)
        );
    }

    #[test]
    fn integers_respect_width_and_order() {
        assert_eq!(
            parse_pattern("258", SearchType::Integer(IntWidth::W16), Endianness::Big).unwrap(),
            vec![0x01, 0x02]
        );
        assert_eq!(
            parse_pattern("258", SearchType::Integer(IntWidth::W32), Endianness::Little).unwrap(),
            vec![0x02, 0x01, 0x00, 0x00]
        );
        assert_eq!(
            parse_pattern("-1", SearchType::Integer(IntWidth::W16), Endianness::Big).unwrap(),
            vec![0xff, 0xff]
        );
        assert_eq!(
            parse_pattern("255", SearchType::Integer(IntWidth::W8), Endianness::Big).unwrap(),
            vec![0xff]
        );
    }

    #[test]
    fn integers_out_of_range_or_garbage() {
        assert_eq!(
            parse_pattern("256", SearchType::Integer(IntWidth::W8), Endianness::Big),
            Err(SearchError::ValueOutOfRange {
                text: "256".to_owned(),
                bits: 8,
            })
        );
        assert!(matches!(
            parse_pattern("-129", SearchType::Integer(IntWidth::W8), Endianness::Big),
            Err(SearchError::ValueOutOfRange { .. })
        ));
        assert!(matches!(
            parse_pattern("12ab", SearchType::Integer(IntWidth::W32), Endianness::Big),
            Err(SearchError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn floats_encode_ieee754() {
        assert_eq!(
            parse_pattern("1.0", SearchType::Float(FloatWidth::F32), Endianness::Big).unwrap(),
            vec![0x3f, 0x80, 0x00, 0x00]
        );
        assert_eq!(
            parse_pattern("1.0", SearchType::Float(FloatWidth::F64), Endianness::Little).unwrap(),
            1.0f64.to_le_bytes().to_vec()
        );
        assert!(matches!(
            parse_pattern("1e39", SearchType::Float(FloatWidth::F32), Endianness::Big),
            Err(SearchError::ValueOutOfRange { bits: 32, .. })
        ));
    }
}
