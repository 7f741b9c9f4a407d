//! Base block (`regf` header) parsing.
//!
//! ```text
//! +0x000  Signature "regf"
//! +0x004  Primary sequence number
//! +0x008  Secondary sequence number
//! +0x00C  Last written (FILETIME)
//! +0x014  Major version
//! +0x018  Minor version
//! +0x024  Root cell offset (relative to the first hbin)
//! +0x028  Hive bins data size
//! +0x030  Embedded file name (UTF-16LE, 64 bytes)
//! +0x1FC  XOR-32 checksum of the first 508 bytes
//! ```

use crate::error::{HiveError, HiveResult};
use crate::value::read_utf16le_string;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub(crate) const REGF_SIGNATURE: &[u8; 4] = b"regf";

/// The base block is always 4096 bytes; hive bins start right after it.
pub const BASE_BLOCK_SIZE: usize = 4096;

const SEQ1: usize = 0x04;
const SEQ2: usize = 0x08;
const LAST_WRITTEN: usize = 0x0C;
const MAJOR_VERSION: usize = 0x14;
const MINOR_VERSION: usize = 0x18;
const ROOT_CELL_OFFSET: usize = 0x24;
const HIVE_BINS_SIZE: usize = 0x28;
const FILE_NAME: usize = 0x30;
const FILE_NAME_LEN: usize = 64;
const CHECKSUM: usize = 0x1FC;

/// Seconds between 1601-01-01 and 1970-01-01.
const FILETIME_UNIX_DIFF_SECS: i64 = 11_644_473_600;

/// Parsed `regf` base block.
#[derive(Debug, Clone, Serialize)]
pub struct BaseBlock {
    pub primary_sequence: u32,
    pub secondary_sequence: u32,
    /// Header timestamp, `None` when zero or out of range.
    pub last_written: Option<DateTime<Utc>>,
    pub major_version: u32,
    pub minor_version: u32,
    pub root_cell_offset: u32,
    pub hive_bins_size: u32,
    /// File name recorded by the system that wrote the hive.
    pub file_name: String,
    pub checksum: u32,
    /// Whether `checksum` matches the computed XOR of the header.
    pub checksum_valid: bool,
}

impl BaseBlock {
    /// Parse the base block at the start of `data`.
    pub fn parse(data: &[u8]) -> HiveResult<Self> {
        if data.len() < 4 || &data[0..4] != REGF_SIGNATURE {
            return Err(HiveError::Format("missing regf signature".into()));
        }
        if data.len() < BASE_BLOCK_SIZE {
            return Err(HiveError::Format(format!(
                "base block truncated: {} of {} bytes",
                data.len(),
                BASE_BLOCK_SIZE
            )));
        }

        let checksum = read_u32(data, CHECKSUM);
        Ok(BaseBlock {
            primary_sequence: read_u32(data, SEQ1),
            secondary_sequence: read_u32(data, SEQ2),
            last_written: filetime_to_datetime(read_u64(data, LAST_WRITTEN)),
            major_version: read_u32(data, MAJOR_VERSION),
            minor_version: read_u32(data, MINOR_VERSION),
            root_cell_offset: read_u32(data, ROOT_CELL_OFFSET),
            hive_bins_size: read_u32(data, HIVE_BINS_SIZE),
            file_name: read_utf16le_string(&data[FILE_NAME..FILE_NAME + FILE_NAME_LEN]),
            checksum,
            checksum_valid: compute_checksum(data) == checksum,
        })
    }

    /// Sequence numbers differ when the hive was not cleanly flushed.
    pub fn is_dirty(&self) -> bool {
        self.primary_sequence != self.secondary_sequence
    }
}

/// XOR-32 over the first 508 bytes of the base block.
pub fn compute_checksum(data: &[u8]) -> u32 {
    let sum = data[..CHECKSUM]
        .chunks_exact(4)
        .fold(0u32, |acc, c| acc ^ u32::from_le_bytes([c[0], c[1], c[2], c[3]]));
    match sum {
        0 => 1,
        0xFFFF_FFFF => 0xFFFF_FFFE,
        n => n,
    }
}

/// Convert a Windows FILETIME (100ns ticks since 1601) to UTC.
pub fn filetime_to_datetime(filetime: u64) -> Option<DateTime<Utc>> {
    if filetime == 0 {
        return None;
    }
    let secs = (filetime / 10_000_000) as i64 - FILETIME_UNIX_DIFF_SECS;
    let nanos = ((filetime % 10_000_000) * 100) as u32;
    DateTime::from_timestamp(secs, nanos)
}

pub(crate) fn read_u16(data: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([data[at], data[at + 1]])
}

pub(crate) fn read_u32(data: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

pub(crate) fn read_u64(data: &[u8], at: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&data[at..at + 8]);
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes() -> Vec<u8> {
        let mut block = vec![0u8; BASE_BLOCK_SIZE];
        block[0..4].copy_from_slice(REGF_SIGNATURE);
        block[SEQ1..SEQ1 + 4].copy_from_slice(&7u32.to_le_bytes());
        block[SEQ2..SEQ2 + 4].copy_from_slice(&7u32.to_le_bytes());
        block[MAJOR_VERSION..MAJOR_VERSION + 4].copy_from_slice(&1u32.to_le_bytes());
        block[MINOR_VERSION..MINOR_VERSION + 4].copy_from_slice(&5u32.to_le_bytes());
        block[ROOT_CELL_OFFSET..ROOT_CELL_OFFSET + 4].copy_from_slice(&0x20u32.to_le_bytes());
        block[HIVE_BINS_SIZE..HIVE_BINS_SIZE + 4].copy_from_slice(&4096u32.to_le_bytes());
        for (i, unit) in "SYSTEM".encode_utf16().enumerate() {
            block[FILE_NAME + i * 2..FILE_NAME + i * 2 + 2].copy_from_slice(&unit.to_le_bytes());
        }
        let sum = compute_checksum(&block);
        block[CHECKSUM..CHECKSUM + 4].copy_from_slice(&sum.to_le_bytes());
        block
    }

    #[test]
    fn test_parse_base_block() {
        let header = BaseBlock::parse(&header_bytes()).unwrap();
        assert_eq!(header.major_version, 1);
        assert_eq!(header.minor_version, 5);
        assert_eq!(header.root_cell_offset, 0x20);
        assert_eq!(header.hive_bins_size, 4096);
        assert_eq!(header.file_name, "SYSTEM");
        assert!(header.checksum_valid);
        assert!(!header.is_dirty());
        assert!(header.last_written.is_none());
    }

    #[test]
    fn test_bad_signature_is_format_error() {
        let mut bytes = header_bytes();
        bytes[0..4].copy_from_slice(b"rgef");
        assert!(matches!(BaseBlock::parse(&bytes), Err(HiveError::Format(_))));
    }

    #[test]
    fn test_truncated_base_block() {
        let bytes = header_bytes();
        let err = BaseBlock::parse(&bytes[..100]).unwrap_err();
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn test_checksum_mismatch_detected() {
        let mut bytes = header_bytes();
        bytes[SEQ2] = 8;
        let header = BaseBlock::parse(&bytes).unwrap();
        assert!(!header.checksum_valid);
        assert!(header.is_dirty());
    }

    #[test]
    fn test_filetime_conversion() {
        // 2020-01-01T00:00:00Z
        let ft = (1_577_836_800u64 + FILETIME_UNIX_DIFF_SECS as u64) * 10_000_000;
        let dt = filetime_to_datetime(ft).unwrap();
        assert_eq!(dt.to_rfc3339(), "2020-01-01T00:00:00+00:00");
    }
}
