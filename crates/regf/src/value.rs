//! Registry value types and typed decoding of raw value payloads.
//!
//! The same type tags are used by offline hives and by the live registry API,
//! so decoding lives here and is shared by every source.

use crate::error::{HiveError, HiveResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Registry value type tag (`REG_*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    None,
    Sz,
    ExpandSz,
    Binary,
    Dword,
    DwordBigEndian,
    Link,
    MultiSz,
    ResourceList,
    FullResourceDescriptor,
    ResourceRequirementsList,
    Qword,
    Unknown(u32),
}

impl ValueType {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => ValueType::None,
            1 => ValueType::Sz,
            2 => ValueType::ExpandSz,
            3 => ValueType::Binary,
            4 => ValueType::Dword,
            5 => ValueType::DwordBigEndian,
            6 => ValueType::Link,
            7 => ValueType::MultiSz,
            8 => ValueType::ResourceList,
            9 => ValueType::FullResourceDescriptor,
            10 => ValueType::ResourceRequirementsList,
            11 => ValueType::Qword,
            n => ValueType::Unknown(n),
        }
    }

    pub fn to_raw(self) -> u32 {
        match self {
            ValueType::None => 0,
            ValueType::Sz => 1,
            ValueType::ExpandSz => 2,
            ValueType::Binary => 3,
            ValueType::Dword => 4,
            ValueType::DwordBigEndian => 5,
            ValueType::Link => 6,
            ValueType::MultiSz => 7,
            ValueType::ResourceList => 8,
            ValueType::FullResourceDescriptor => 9,
            ValueType::ResourceRequirementsList => 10,
            ValueType::Qword => 11,
            ValueType::Unknown(n) => n,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::None => "REG_NONE",
            ValueType::Sz => "REG_SZ",
            ValueType::ExpandSz => "REG_EXPAND_SZ",
            ValueType::Binary => "REG_BINARY",
            ValueType::Dword => "REG_DWORD",
            ValueType::DwordBigEndian => "REG_DWORD_BIG_ENDIAN",
            ValueType::Link => "REG_LINK",
            ValueType::MultiSz => "REG_MULTI_SZ",
            ValueType::ResourceList => "REG_RESOURCE_LIST",
            ValueType::FullResourceDescriptor => "REG_FULL_RESOURCE_DESCRIPTOR",
            ValueType::ResourceRequirementsList => "REG_RESOURCE_REQUIREMENTS_LIST",
            ValueType::Qword => "REG_QWORD",
            ValueType::Unknown(n) => return write!(f, "REG_UNKNOWN({:#x})", n),
        };
        f.write_str(name)
    }
}

/// Decoded value payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueData {
    String(String),
    Integer(u64),
    Binary(Vec<u8>),
    MultiString(Vec<String>),
}

impl ValueData {
    /// Decode a raw payload according to its type tag.
    pub fn decode(value_type: ValueType, raw: &[u8]) -> HiveResult<Self> {
        match value_type {
            ValueType::Sz | ValueType::ExpandSz | ValueType::Link => {
                Ok(ValueData::String(read_utf16le_string(raw)))
            }
            ValueType::Dword => {
                let bytes: [u8; 4] = raw.try_into().map_err(|_| length_error(value_type, 4, raw))?;
                Ok(ValueData::Integer(u32::from_le_bytes(bytes) as u64))
            }
            ValueType::DwordBigEndian => {
                let bytes: [u8; 4] = raw.try_into().map_err(|_| length_error(value_type, 4, raw))?;
                Ok(ValueData::Integer(u32::from_be_bytes(bytes) as u64))
            }
            ValueType::Qword => {
                let bytes: [u8; 8] = raw.try_into().map_err(|_| length_error(value_type, 8, raw))?;
                Ok(ValueData::Integer(u64::from_le_bytes(bytes)))
            }
            ValueType::MultiSz => Ok(ValueData::MultiString(read_utf16le_multi_string(raw))),
            _ => Ok(ValueData::Binary(raw.to_vec())),
        }
    }

    /// Canonical text used for matching and display.
    pub fn to_text(&self) -> String {
        match self {
            ValueData::String(s) => s.clone(),
            ValueData::Integer(n) => n.to_string(),
            ValueData::MultiString(items) => items.join(", "),
            ValueData::Binary(bytes) => bytes
                .iter()
                .map(|b| format!("{:02x}", b))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

fn length_error(value_type: ValueType, expected: usize, raw: &[u8]) -> HiveError {
    HiveError::Decode {
        value_type: value_type.to_string(),
        msg: format!("expected {} bytes, got {}", expected, raw.len()),
    }
}

// ── UTF-16 helpers ───────────────────────────────────────────────────

/// Decode a UTF-16LE string from raw bytes, stopping at first null or end.
/// A trailing odd byte is ignored.
pub fn read_utf16le_string(data: &[u8]) -> String {
    let chars: Vec<u16> = data
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .take_while(|&c| c != 0)
        .collect();
    String::from_utf16_lossy(&chars)
}

/// Decode a `REG_MULTI_SZ` payload: NUL-separated strings ending in an empty one.
pub fn read_utf16le_multi_string(data: &[u8]) -> Vec<String> {
    let units: Vec<u16> = data
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    let mut items: Vec<String> = units
        .split(|&c| c == 0)
        .map(String::from_utf16_lossy)
        .collect();
    // The list is terminated by an empty string; drop everything after it.
    if let Some(end) = items.iter().position(|s| s.is_empty()) {
        items.truncate(end);
    }
    items
}

/// Encode text as UTF-16LE with a terminating NUL, the `REG_SZ` layout.
pub fn encode_utf16le_string(text: &str) -> Vec<u8> {
    text.encode_utf16()
        .chain(std::iter::once(0))
        .flat_map(|c| c.to_le_bytes())
        .collect()
}

/// Encode strings as a `REG_MULTI_SZ` payload.
pub fn encode_utf16le_multi_string<S: AsRef<str>>(items: &[S]) -> Vec<u8> {
    let mut out = Vec::new();
    for item in items {
        out.extend(encode_utf16le_string(item.as_ref()));
    }
    out.extend([0, 0]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf16le_decode() {
        // "SAM" in UTF-16LE
        let data = [b'S', 0, b'A', 0, b'M', 0, 0, 0];
        assert_eq!(read_utf16le_string(&data), "SAM");
    }

    #[test]
    fn test_utf16le_decode_no_null_odd_length() {
        let data = [b'H', 0, b'i', 0, 0x41];
        assert_eq!(read_utf16le_string(&data), "Hi");
    }

    #[test]
    fn test_decode_string_types() {
        let raw = encode_utf16le_string("C:\\Windows");
        for ty in [ValueType::Sz, ValueType::ExpandSz, ValueType::Link] {
            assert_eq!(
                ValueData::decode(ty, &raw).unwrap(),
                ValueData::String("C:\\Windows".into())
            );
        }
    }

    #[test]
    fn test_decode_integers() {
        let dword = ValueData::decode(ValueType::Dword, &0x10u32.to_le_bytes()).unwrap();
        assert_eq!(dword.to_text(), "16");
        let be = ValueData::decode(ValueType::DwordBigEndian, &[0, 0, 1, 0]).unwrap();
        assert_eq!(be, ValueData::Integer(256));
        let qword = ValueData::decode(ValueType::Qword, &u64::MAX.to_le_bytes()).unwrap();
        assert_eq!(qword.to_text(), "18446744073709551615");
    }

    #[test]
    fn test_decode_dword_wrong_length_fails() {
        let err = ValueData::decode(ValueType::Dword, &[1, 2]).unwrap_err();
        assert!(err.to_string().contains("REG_DWORD"));
        assert!(err.to_string().contains("expected 4 bytes, got 2"));
    }

    #[test]
    fn test_decode_multi_string() {
        let raw = encode_utf16le_multi_string(&["alpha", "beta"]);
        let data = ValueData::decode(ValueType::MultiSz, &raw).unwrap();
        assert_eq!(
            data,
            ValueData::MultiString(vec!["alpha".into(), "beta".into()])
        );
        assert_eq!(data.to_text(), "alpha, beta");
    }

    #[test]
    fn test_multi_string_without_terminator() {
        let raw: Vec<u8> = "a\0b".encode_utf16().flat_map(|c| c.to_le_bytes()).collect();
        assert_eq!(read_utf16le_multi_string(&raw), vec!["a", "b"]);
    }

    #[test]
    fn test_binary_text_is_hex() {
        let data = ValueData::decode(ValueType::Binary, &[0xde, 0xad, 0x01]).unwrap();
        assert_eq!(data.to_text(), "de ad 01");
        let unknown = ValueData::decode(ValueType::from_raw(0x42), &[0xff]).unwrap();
        assert_eq!(unknown, ValueData::Binary(vec![0xff]));
    }

    #[test]
    fn test_value_type_raw_round_trip() {
        for raw in 0..16u32 {
            assert_eq!(ValueType::from_raw(raw).to_raw(), raw);
        }
        assert_eq!(ValueType::from_raw(0x20).to_string(), "REG_UNKNOWN(0x20)");
    }
}
