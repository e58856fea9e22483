//! 16-bit data-value codec
//!
//! Every OpenTherm data-value is one 16-bit word. The dictionary describes
//! how to read it (format + bit position); `decode_value` renders the word as
//! decimal text and `encode_value` parses operator-supplied text (with the
//! `%F8.8` / `%B<n>` / `%HB` / `%LB` suffix mini-language) back into a word.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("unsupported data format")]
    UnsupportedFormat,

    #[error("invalid bit position '{0}'")]
    InvalidPosition(String),

    #[error("invalid numeric value '{0}'")]
    InvalidNumber(String),

    #[error("invalid value format suffix '{0}'")]
    InvalidSuffix(String),
}

/// Data formats used by the dictionary descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    /// Bitfield container (described per sub-field).
    Bf,
    U8,
    U16,
    S8,
    S16,
    /// Signed 8.8 fixed point (1/256 steps).
    F8_8,
    /// No format known; the value cannot be decoded.
    None,
}

impl DataFormat {
    /// Parse a descriptor format string. Unknown or empty strings map to
    /// `None` (undecodable), matching the dictionary's blank entries.
    pub fn parse(s: &str) -> Self {
        match s {
            "BF" => Self::Bf,
            "U8" => Self::U8,
            "U16" => Self::U16,
            "S8" => Self::S8,
            "S16" => Self::S16,
            "F8.8" => Self::F8_8,
            _ => Self::None,
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Bf => "BF",
            Self::U8 => "U8",
            Self::U16 => "U16",
            Self::S8 => "S8",
            Self::S16 => "S16",
            Self::F8_8 => "F8.8",
            Self::None => "",
        };
        f.write_str(s)
    }
}

/// Where a sub-field sits inside the 16-bit data-value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitPosition {
    /// The whole word.
    Word,
    /// A single bit, counted from bit 0.
    Bit(u8),
    /// An inclusive bit range `lo..=hi`, counted from bit 0.
    Range { lo: u8, hi: u8 },
}

impl BitPosition {
    /// Parse a descriptor position: "" (whole word), "HBn" (bit 8+n),
    /// "LBn" (bit n) or "a-b" (inclusive range).
    pub fn parse(pos: &str) -> Result<Self, CodecError> {
        if pos.is_empty() {
            return Ok(Self::Word);
        }
        if let Some(n) = pos.strip_prefix("HB") {
            let n: u8 = n
                .parse()
                .map_err(|_| CodecError::InvalidPosition(pos.to_string()))?;
            if n > 7 {
                return Err(CodecError::InvalidPosition(pos.to_string()));
            }
            return Ok(Self::Bit(8 + n));
        }
        if let Some(n) = pos.strip_prefix("LB") {
            let n: u8 = n
                .parse()
                .map_err(|_| CodecError::InvalidPosition(pos.to_string()))?;
            if n > 7 {
                return Err(CodecError::InvalidPosition(pos.to_string()));
            }
            return Ok(Self::Bit(n));
        }
        if let Some((lo, hi)) = pos.split_once('-') {
            let lo: u8 = lo
                .parse()
                .map_err(|_| CodecError::InvalidPosition(pos.to_string()))?;
            let hi: u8 = hi
                .parse()
                .map_err(|_| CodecError::InvalidPosition(pos.to_string()))?;
            if lo > hi || hi > 15 {
                return Err(CodecError::InvalidPosition(pos.to_string()));
            }
            return Ok(Self::Range { lo, hi });
        }
        Err(CodecError::InvalidPosition(pos.to_string()))
    }

    /// Extract the addressed bits, right-aligned.
    pub fn extract(self, value: u16) -> u16 {
        match self {
            Self::Word => value,
            Self::Bit(n) => (value >> n) & 1,
            Self::Range { lo, hi } => {
                let width = u32::from(hi - lo) + 1;
                let mask = if width >= 16 {
                    0xffff
                } else {
                    (1u16 << width) - 1
                };
                (value >> lo) & mask
            }
        }
    }
}

/// Render a raw data-value as decimal text per format and position.
///
/// F8.8 output is truncated to 3 fractional digits with trailing zeros (and a
/// trailing point) stripped, so 0x0190 renders as "1.562" and 0x0400 as "4".
pub fn decode_value(raw: u16, fmt: DataFormat, pos: &str) -> Result<String, CodecError> {
    let pos = BitPosition::parse(pos)?;
    match fmt {
        DataFormat::U8 | DataFormat::Bf => Ok(format!("{}", pos.extract(raw) & 0xff)),
        DataFormat::S8 => {
            let b = pos.extract(raw) & 0xff;
            if b > 127 {
                Ok(format!("-{}", 256 - b))
            } else {
                Ok(format!("{b}"))
            }
        }
        DataFormat::U16 => Ok(format!("{raw}")),
        DataFormat::S16 => {
            if raw > 32767 {
                Ok(format!("-{}", 65536u32 - u32::from(raw)))
            } else {
                Ok(format!("{raw}"))
            }
        }
        DataFormat::F8_8 => Ok(format_f88(raw)),
        DataFormat::None => Err(CodecError::UnsupportedFormat),
    }
}

fn format_f88(raw: u16) -> String {
    let (negative, magnitude) = if raw > 32767 {
        (true, 65536 - u32::from(raw))
    } else {
        (false, u32::from(raw))
    };
    // integer millis, truncated (not rounded)
    let millis = magnitude * 1000 / 256;
    let mut s = format!("{}.{:03}", millis / 1000, millis % 1000);
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    if negative && s != "0" {
        s.insert(0, '-');
    }
    s
}

/// Parse an operator-supplied value expression into a raw 16-bit word.
///
/// Accepted forms: a plain integer (negatives wrap into 16 bits);
/// `X%F8.8` (fixed point); `X%B<n>` (single bit n) and `X%B<n>-<m>`
/// (right-aligned field at bits n..=m); `X%HB` / `X%LB` (byte into the
/// high/low half) and `X%HB<n>` / `X%LB<n>` (single bit n of that half).
/// `+`-joined terms are summed and masked to 16 bits.
pub fn encode_value(expr: &str) -> Result<u16, CodecError> {
    if expr.contains('+') {
        let mut sum: u32 = 0;
        for part in expr.split('+') {
            sum += u32::from(encode_value(part)?);
        }
        return Ok((sum & 0xffff) as u16);
    }
    let expr = expr.trim();
    let Some((num, suffix)) = expr.split_once('%') else {
        return parse_word(expr);
    };
    if suffix == "F8.8" {
        let f: f64 = num
            .parse()
            .map_err(|_| CodecError::InvalidNumber(num.to_string()))?;
        return Ok(((f * 256.0) as i64 & 0xffff) as u16);
    }
    if let Some(rest) = suffix.strip_prefix("HB") {
        return encode_half(num, rest, 8);
    }
    if let Some(rest) = suffix.strip_prefix("LB") {
        return encode_half(num, rest, 0);
    }
    if let Some(rest) = suffix.strip_prefix('B') {
        let n = parse_word(num)?;
        if let Some((lo, hi)) = rest.split_once('-') {
            let lo: u32 = lo
                .parse()
                .map_err(|_| CodecError::InvalidNumber(lo.to_string()))?;
            let hi: u32 = hi
                .parse()
                .map_err(|_| CodecError::InvalidNumber(hi.to_string()))?;
            if lo > hi || hi > 15 {
                return Err(CodecError::InvalidSuffix(suffix.to_string()));
            }
            let mask = if hi - lo + 1 >= 16 {
                0xffff
            } else {
                (1u32 << (hi - lo + 1)) - 1
            };
            return Ok((((u32::from(n) & mask) << lo) & 0xffff) as u16);
        }
        let bit: u32 = rest
            .parse()
            .map_err(|_| CodecError::InvalidNumber(rest.to_string()))?;
        if bit > 15 {
            return Err(CodecError::InvalidSuffix(suffix.to_string()));
        }
        return Ok((((u32::from(n) & 1) << bit) & 0xffff) as u16);
    }
    Err(CodecError::InvalidSuffix(suffix.to_string()))
}

fn encode_half(num: &str, bit: &str, base: u32) -> Result<u16, CodecError> {
    let n = parse_word(num)?;
    if bit.is_empty() {
        // whole byte into the half-word
        return Ok((((u32::from(n) & 0xff) << base) & 0xffff) as u16);
    }
    let bit: u32 = bit
        .parse()
        .map_err(|_| CodecError::InvalidNumber(bit.to_string()))?;
    if bit > 7 {
        return Err(CodecError::InvalidSuffix(format!("bit {bit}")));
    }
    Ok((((u32::from(n) & 1) << (base + bit)) & 0xffff) as u16)
}

fn parse_word(s: &str) -> Result<u16, CodecError> {
    let n: i64 = s
        .trim()
        .parse()
        .map_err(|_| CodecError::InvalidNumber(s.trim().to_string()))?;
    Ok((n & 0xffff) as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_position_parse() {
        assert_eq!(BitPosition::parse("").unwrap(), BitPosition::Word);
        assert_eq!(BitPosition::parse("HB0").unwrap(), BitPosition::Bit(8));
        assert_eq!(BitPosition::parse("HB7").unwrap(), BitPosition::Bit(15));
        assert_eq!(BitPosition::parse("LB3").unwrap(), BitPosition::Bit(3));
        assert_eq!(
            BitPosition::parse("8-15").unwrap(),
            BitPosition::Range { lo: 8, hi: 15 }
        );
        assert_eq!(
            BitPosition::parse("13-15").unwrap(),
            BitPosition::Range { lo: 13, hi: 15 }
        );
        assert!(BitPosition::parse("XB1").is_err());
        assert!(BitPosition::parse("7-3").is_err());
        assert!(BitPosition::parse("HB8").is_err());
    }

    #[test]
    fn test_bit_extraction() {
        assert_eq!(BitPosition::Bit(8).extract(0x0100), 1);
        assert_eq!(BitPosition::Bit(8).extract(0xfeff), 0);
        assert_eq!(BitPosition::Range { lo: 8, hi: 15 }.extract(0xab12), 0xab);
        assert_eq!(BitPosition::Range { lo: 0, hi: 7 }.extract(0xab12), 0x12);
        assert_eq!(BitPosition::Range { lo: 13, hi: 15 }.extract(0xe000), 7);
        assert_eq!(BitPosition::Range { lo: 0, hi: 15 }.extract(0xdead), 0xdead);
    }

    #[test]
    fn test_decode_f88_pinned() {
        assert_eq!(decode_value(0x0190, DataFormat::F8_8, "").unwrap(), "1.562");
        assert_eq!(
            decode_value(0xFF38, DataFormat::F8_8, "").unwrap(),
            "-0.781"
        );
        assert_eq!(decode_value(0x0400, DataFormat::F8_8, "").unwrap(), "4");
        assert_eq!(decode_value(0x0000, DataFormat::F8_8, "").unwrap(), "0");
        assert_eq!(decode_value(0x0080, DataFormat::F8_8, "").unwrap(), "0.5");
    }

    #[test]
    fn test_decode_signed() {
        assert_eq!(decode_value(0x8000, DataFormat::S16, "").unwrap(), "-32768");
        assert_eq!(decode_value(0xffff, DataFormat::S16, "").unwrap(), "-1");
        assert_eq!(decode_value(0x7fff, DataFormat::S16, "").unwrap(), "32767");
        assert_eq!(decode_value(0x00ff, DataFormat::S8, "").unwrap(), "-1");
        assert_eq!(decode_value(0x0080, DataFormat::S8, "0-7").unwrap(), "-128");
        assert_eq!(decode_value(0x7f00, DataFormat::S8, "8-15").unwrap(), "127");
    }

    #[test]
    fn test_decode_unsigned() {
        assert_eq!(decode_value(0xab12, DataFormat::U16, "").unwrap(), "43794");
        assert_eq!(decode_value(0xab12, DataFormat::U8, "8-15").unwrap(), "171");
        assert_eq!(decode_value(0xab12, DataFormat::U8, "0-7").unwrap(), "18");
        assert_eq!(decode_value(0x0100, DataFormat::Bf, "HB0").unwrap(), "1");
        assert_eq!(decode_value(0x0100, DataFormat::Bf, "LB0").unwrap(), "0");
    }

    #[test]
    fn test_decode_unknown_format() {
        assert_eq!(
            decode_value(1, DataFormat::None, ""),
            Err(CodecError::UnsupportedFormat)
        );
    }

    #[test]
    fn test_encode_plain_numbers() {
        assert_eq!(encode_value("0").unwrap(), 0);
        assert_eq!(encode_value("65280").unwrap(), 65280);
        assert_eq!(encode_value("-1").unwrap(), 0xffff);
        assert!(encode_value("abc").is_err());
        assert!(encode_value("12.5").is_err());
    }

    #[test]
    fn test_encode_f88() {
        assert_eq!(encode_value("1.5625%F8.8").unwrap(), 0x0190);
        assert_eq!(encode_value("4%F8.8").unwrap(), 0x0400);
        assert_eq!(encode_value("-1%F8.8").unwrap(), 0xff00);
        assert!(encode_value("x%F8.8").is_err());
    }

    #[test]
    fn test_encode_bits() {
        assert_eq!(encode_value("1%B3").unwrap(), 0x0008);
        assert_eq!(encode_value("0%B3").unwrap(), 0);
        assert_eq!(encode_value("5%B0-3").unwrap(), 5);
        assert_eq!(encode_value("5%B13-15").unwrap(), 5 << 13);
        assert_eq!(encode_value("255%B4-5").unwrap(), 3 << 4);
        assert!(encode_value("1%B16").is_err());
    }

    #[test]
    fn test_encode_half_words() {
        assert_eq!(encode_value("18%HB").unwrap(), 18 << 8);
        assert_eq!(encode_value("300%HB").unwrap(), (300 & 0xff) << 8);
        assert_eq!(encode_value("18%LB").unwrap(), 18);
        assert_eq!(encode_value("1%HB2").unwrap(), 1 << 10);
        assert_eq!(encode_value("1%LB7").unwrap(), 1 << 7);
        assert!(encode_value("1%LB9").is_err());
    }

    #[test]
    fn test_encode_sums() {
        assert_eq!(encode_value("1%HB0+1%LB1").unwrap(), 0x0102);
        assert_eq!(
            encode_value("7%B13-15+12%B8-12+30%LB").unwrap(),
            (7 << 13) | (12 << 8) | 30
        );
        assert!(encode_value("1%HB0+zz").is_err());
    }

    #[test]
    fn test_encode_unknown_suffix() {
        assert_eq!(
            encode_value("1%QQ"),
            Err(CodecError::InvalidSuffix("QQ".to_string()))
        );
    }

    #[test]
    fn test_f88_roundtrip_within_quantum() {
        for text in ["1.562", "-0.781", "36.25", "90", "-40"] {
            let raw = encode_value(&format!("{text}%F8.8")).unwrap();
            let back: f64 = decode_value(raw, DataFormat::F8_8, "")
                .unwrap()
                .parse()
                .unwrap();
            let orig: f64 = text.parse().unwrap();
            assert!(
                (back - orig).abs() <= 1.0 / 256.0 + 0.001,
                "{text} -> {raw:#06x} -> {back}"
            );
        }
    }
}
