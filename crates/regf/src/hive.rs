//! Offline hive reader.
//!
//! Registry on-disk format:
//! ```text
//! +0x0000  Base block ("regf", 4096 bytes)
//! +0x1000  HBIN #0 ("hbin" signature, 32-byte header)
//!   Then cells: each cell is |size(i32)|data...|
//!     - Allocated cells have negative size (absolute value = cell size)
//!     - Free cells have positive size
//!   Cell types identified by 2-byte signature:
//!     "nk" - key node
//!     "vk" - key value
//!     "lf"/"lh" - fast-leaf / hash-leaf subkey list
//!     "ri" - index root (list of subkey lists)
//!     "li" - leaf index
//!     "db" - big data header
//! ```
//!
//! All cell offsets are relative to the first hbin. The file is memory-mapped
//! and cells are decoded on demand; nothing beyond the base block is parsed
//! up front.

use crate::error::{HiveError, HiveResult};
use crate::header::{read_u16, read_u32, BaseBlock, BASE_BLOCK_SIZE};
use crate::value::{read_utf16le_string, ValueType};
use memmap2::Mmap;
use std::fs::File;
use std::ops::Deref;
use std::path::Path;
use tracing::{debug, warn};

// ── Constants ────────────────────────────────────────────────────────

const HBIN_SIGNATURE: &[u8; 4] = b"hbin";
const NK_SIGNATURE: &[u8; 2] = b"nk";
const VK_SIGNATURE: &[u8; 2] = b"vk";
const LF_SIGNATURE: &[u8; 2] = b"lf";
const LH_SIGNATURE: &[u8; 2] = b"lh";
const RI_SIGNATURE: &[u8; 2] = b"ri";
const LI_SIGNATURE: &[u8; 2] = b"li";
const DB_SIGNATURE: &[u8; 2] = b"db";

/// Offset value meaning "no cell".
pub const NO_CELL: u32 = 0xFFFF_FFFF;

// NK cell offsets (relative to the signature, after the 4-byte size)
pub(crate) const NK_FLAGS: usize = 2;
pub(crate) const NK_SUBKEY_COUNT: usize = 20;
pub(crate) const NK_SUBKEY_LIST: usize = 28;
pub(crate) const NK_VALUE_COUNT: usize = 36;
pub(crate) const NK_VALUE_LIST: usize = 40;
pub(crate) const NK_NAME_LENGTH: usize = 72;
pub(crate) const NK_NAME_START: usize = 76;

/// NK flag: name is stored as Latin-1, not UTF-16.
pub(crate) const KEY_COMP_NAME: u16 = 0x0020;

// VK cell offsets (relative to the signature)
pub(crate) const VK_NAME_LENGTH: usize = 2;
pub(crate) const VK_DATA_LENGTH: usize = 4;
pub(crate) const VK_DATA_OFFSET: usize = 8;
pub(crate) const VK_TYPE: usize = 12;
pub(crate) const VK_FLAGS: usize = 16;
pub(crate) const VK_NAME_START: usize = 20;

/// VK flag: value name is Latin-1 (compressed).
pub(crate) const VALUE_COMP_NAME: u16 = 0x0001;

/// Bit 31 of the VK data length: data is stored inline in the offset field.
const VK_DATA_RESIDENT: u32 = 0x8000_0000;

/// Largest payload a single data cell holds before big data is used.
pub(crate) const BIG_DATA_SEGMENT_SIZE: usize = 16344;

/// Minor version from which big data (`db`) cells exist.
const BIG_DATA_MIN_MINOR: u32 = 4;

// ── Backing storage ──────────────────────────────────────────────────

/// Bytes backing a hive: a read-only file mapping or an owned buffer.
pub enum HiveBytes {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl Deref for HiveBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            HiveBytes::Mapped(map) => map,
            HiveBytes::Owned(buf) => buf,
        }
    }
}

// ── Parsed records ───────────────────────────────────────────────────

/// A parsed registry key node.
#[derive(Debug, Clone)]
pub struct KeyNode {
    /// Cell offset (relative to hive data).
    pub cell_offset: u32,
    pub name: String,
    /// NK flags.
    pub flags: u16,
    pub subkey_count: u32,
    pub subkey_list_offset: u32,
    pub value_count: u32,
    pub value_list_offset: u32,
}

/// A parsed registry value.
#[derive(Debug, Clone)]
pub struct ValueRecord {
    /// Cell offset of the VK record.
    pub cell_offset: u32,
    /// Value name (empty string = "(Default)" value).
    pub name: String,
    pub value_type: ValueType,
    /// Raw value data bytes.
    pub data: Vec<u8>,
}

/// One entry of a key's subkey list; the child may fail to parse on its own.
#[derive(Debug)]
pub struct SubkeyEntry {
    pub cell_offset: u32,
    pub key: HiveResult<KeyNode>,
}

// ── Reader ───────────────────────────────────────────────────────────

/// A read-only offline registry hive.
pub struct Hive {
    data: HiveBytes,
    header: BaseBlock,
    /// Usable length of the hive bins area, clamped to the file size.
    bins_len: u32,
}

impl Hive {
    /// Memory-map and validate a hive file.
    pub fn open(path: impl AsRef<Path>) -> HiveResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| HiveError::Io(format!("opening {}: {}", path.display(), e)))?;
        let size = file
            .metadata()
            .map_err(|e| HiveError::Io(format!("reading {}: {}", path.display(), e)))?
            .len();
        if size == 0 {
            return Err(HiveError::Format(format!("{} is empty", path.display())));
        }
        // SAFETY: the mapping is read-only and the hive is never written through it.
        let map = unsafe { Mmap::map(&file) }
            .map_err(|e| HiveError::Io(format!("mapping {}: {}", path.display(), e)))?;
        debug!("regf: mapped {} ({} bytes)", path.display(), size);
        Self::parse(HiveBytes::Mapped(map))
    }

    /// Parse a hive held in memory.
    pub fn from_bytes(bytes: Vec<u8>) -> HiveResult<Self> {
        Self::parse(HiveBytes::Owned(bytes))
    }

    fn parse(data: HiveBytes) -> HiveResult<Self> {
        let header = BaseBlock::parse(&data)?;

        let first_bin = BASE_BLOCK_SIZE;
        if data.len() < first_bin + 32 || &data[first_bin..first_bin + 4] != HBIN_SIGNATURE {
            return Err(HiveError::Format("first hbin missing at 0x1000".into()));
        }

        let available = (data.len() - first_bin).min(u32::MAX as usize) as u32;
        let bins_len = if header.hive_bins_size > available {
            warn!(
                "regf: hive bins size {:#x} exceeds file ({:#x} available), hive is truncated",
                header.hive_bins_size, available
            );
            available
        } else {
            header.hive_bins_size
        };

        if !header.checksum_valid {
            warn!("regf: base block checksum mismatch ({:#x})", header.checksum);
        }
        if header.is_dirty() {
            warn!(
                "regf: hive is dirty (sequence {} != {}), reading primary file only",
                header.primary_sequence, header.secondary_sequence
            );
        }
        debug!(
            "regf: version {}.{}, root cell {:#x}, bins {:#x}, name '{}', last written {:?}",
            header.major_version,
            header.minor_version,
            header.root_cell_offset,
            bins_len,
            header.file_name,
            header.last_written
        );

        Ok(Hive {
            data,
            header,
            bins_len,
        })
    }

    pub fn header(&self) -> &BaseBlock {
        &self.header
    }

    /// Read the root key node. Failure here makes the whole hive unusable.
    pub fn root_key(&self) -> HiveResult<KeyNode> {
        self.key_node(self.header.root_cell_offset)
            .map_err(|e| HiveError::Format(format!("root key unreadable: {}", e)))
    }

    /// Payload of the cell at `cell_offset`, without the 4-byte size prefix.
    fn cell(&self, cell_offset: u32) -> HiveResult<&[u8]> {
        if cell_offset == NO_CELL {
            return Err(HiveError::integrity(cell_offset, "reference to missing cell"));
        }
        let end_of_bins = self.bins_len as u64;
        if cell_offset as u64 + 4 > end_of_bins {
            return Err(HiveError::integrity(
                cell_offset,
                format!("offset exceeds hive bins length {:#x}", self.bins_len),
            ));
        }
        let start = BASE_BLOCK_SIZE + cell_offset as usize;
        let raw_size = i32::from_le_bytes([
            self.data[start],
            self.data[start + 1],
            self.data[start + 2],
            self.data[start + 3],
        ]);
        if raw_size > 0 {
            debug!("regf: cell {:#x} is marked free but still referenced", cell_offset);
        }
        let size = raw_size.unsigned_abs() as u64;
        if size < 4 {
            return Err(HiveError::integrity(cell_offset, format!("invalid cell size {}", raw_size)));
        }
        if cell_offset as u64 + size > end_of_bins {
            return Err(HiveError::integrity(
                cell_offset,
                format!("cell size {:#x} runs past end of hive bins", size),
            ));
        }
        Ok(&self.data[start + 4..start + size as usize])
    }

    /// Cell payload that must start with `signature` and hold at least `min_len` bytes.
    fn signed_cell(&self, cell_offset: u32, signature: &[u8; 2], min_len: usize) -> HiveResult<&[u8]> {
        let cell = self.cell(cell_offset)?;
        if cell.len() < 2 || &cell[0..2] != signature {
            let found = cell.get(0..2).map(|s| String::from_utf8_lossy(s).into_owned());
            return Err(HiveError::integrity(
                cell_offset,
                format!(
                    "expected '{}' cell, found {:?}",
                    String::from_utf8_lossy(signature),
                    found.unwrap_or_default()
                ),
            ));
        }
        if cell.len() < min_len {
            return Err(HiveError::integrity(
                cell_offset,
                format!("cell holds {} bytes, need {}", cell.len(), min_len),
            ));
        }
        Ok(cell)
    }

    /// Read a key node (NK record) at the given cell offset.
    pub fn key_node(&self, cell_offset: u32) -> HiveResult<KeyNode> {
        let nk = self.signed_cell(cell_offset, NK_SIGNATURE, NK_NAME_START)?;

        let flags = read_u16(nk, NK_FLAGS);
        let name_length = read_u16(nk, NK_NAME_LENGTH) as usize;
        let name_bytes = nk
            .get(NK_NAME_START..NK_NAME_START + name_length)
            .ok_or_else(|| {
                HiveError::integrity(cell_offset, format!("key name length {} exceeds cell", name_length))
            })?;
        let name = decode_name(name_bytes, flags & KEY_COMP_NAME != 0);

        Ok(KeyNode {
            cell_offset,
            name,
            flags,
            subkey_count: read_u32(nk, NK_SUBKEY_COUNT),
            subkey_list_offset: read_u32(nk, NK_SUBKEY_LIST),
            value_count: read_u32(nk, NK_VALUE_COUNT),
            value_list_offset: read_u32(nk, NK_VALUE_LIST),
        })
    }

    /// Enumerate subkeys of a key node.
    ///
    /// The outer error means the subkey list itself is unreadable; each entry
    /// carries its own result so one bad child does not hide its siblings.
    pub fn subkeys(&self, key: &KeyNode) -> HiveResult<Vec<SubkeyEntry>> {
        if key.subkey_count == 0 || key.subkey_list_offset == NO_CELL {
            return Ok(Vec::new());
        }
        let offsets = self.read_subkey_list(key.subkey_list_offset, true)?;
        if offsets.len() != key.subkey_count as usize {
            debug!(
                "regf: key '{}' declares {} subkeys, list holds {}",
                key.name,
                key.subkey_count,
                offsets.len()
            );
        }
        Ok(offsets
            .into_iter()
            .map(|off| SubkeyEntry {
                cell_offset: off,
                key: self.key_node(off),
            })
            .collect())
    }

    /// Read a subkey list (lf/lh/li/ri record) and return child cell offsets.
    fn read_subkey_list(&self, cell_offset: u32, allow_index_root: bool) -> HiveResult<Vec<u32>> {
        // Cell: u16 sig | u16 count | entries...
        let cell = self.cell(cell_offset)?;
        if cell.len() < 4 {
            return Err(HiveError::integrity(cell_offset, "subkey list header truncated"));
        }
        let sig: [u8; 2] = [cell[0], cell[1]];
        let count = read_u16(cell, 2) as usize;

        let entry_size = match &sig {
            s if s == LF_SIGNATURE || s == LH_SIGNATURE => 8,
            s if s == LI_SIGNATURE || s == RI_SIGNATURE => 4,
            _ => {
                return Err(HiveError::integrity(
                    cell_offset,
                    format!("unknown subkey list signature {:?}", String::from_utf8_lossy(&sig)),
                ))
            }
        };
        if 4 + count * entry_size > cell.len() {
            return Err(HiveError::integrity(
                cell_offset,
                format!("subkey list count {} exceeds cell size {}", count, cell.len()),
            ));
        }
        let entries = (0..count).map(|i| read_u32(cell, 4 + i * entry_size));

        if &sig != RI_SIGNATURE {
            return Ok(entries.collect());
        }
        if !allow_index_root {
            return Err(HiveError::integrity(cell_offset, "index root nested inside index root"));
        }
        let mut offsets = Vec::new();
        for sub_list in entries {
            match self.read_subkey_list(sub_list, false) {
                Ok(sub_offsets) => offsets.extend(sub_offsets),
                Err(e) => {
                    debug!("regf: skipping bad ri sub-list at {:#x}: {}", sub_list, e);
                }
            }
        }
        Ok(offsets)
    }

    /// Enumerate values of a key node.
    ///
    /// The outer error means the value list is unreadable; each value carries
    /// its own result.
    pub fn values(&self, key: &KeyNode) -> HiveResult<Vec<HiveResult<ValueRecord>>> {
        if key.value_count == 0 || key.value_list_offset == NO_CELL {
            return Ok(Vec::new());
        }
        // Value list is a cell containing an array of u32 cell offsets
        let list = self.cell(key.value_list_offset)?;
        let count = key.value_count as usize;
        if count.saturating_mul(4) > list.len() {
            return Err(HiveError::integrity(
                key.value_list_offset,
                format!("value count {} exceeds list cell size {}", count, list.len()),
            ));
        }
        Ok((0..count)
            .map(|i| self.value_record(read_u32(list, i * 4)))
            .collect())
    }

    /// Read a single value (VK record).
    pub fn value_record(&self, cell_offset: u32) -> HiveResult<ValueRecord> {
        let vk = self.signed_cell(cell_offset, VK_SIGNATURE, VK_NAME_START)?;

        let name_length = read_u16(vk, VK_NAME_LENGTH) as usize;
        let data_length_raw = read_u32(vk, VK_DATA_LENGTH);
        let data_offset = read_u32(vk, VK_DATA_OFFSET);
        let value_type = ValueType::from_raw(read_u32(vk, VK_TYPE));
        let flags = read_u16(vk, VK_FLAGS);

        let name_bytes = vk
            .get(VK_NAME_START..VK_NAME_START + name_length)
            .ok_or_else(|| {
                HiveError::integrity(cell_offset, format!("value name length {} exceeds cell", name_length))
            })?;
        let name = decode_name(name_bytes, flags & VALUE_COMP_NAME != 0);

        let data_length = (data_length_raw & !VK_DATA_RESIDENT) as usize;
        let data = if data_length == 0 {
            Vec::new()
        } else if data_length_raw & VK_DATA_RESIDENT != 0 {
            let inline_len = data_length.min(4);
            data_offset.to_le_bytes()[..inline_len].to_vec()
        } else {
            self.value_data(data_offset, data_length)?
        };

        Ok(ValueRecord {
            cell_offset,
            name,
            value_type,
            data,
        })
    }

    /// Read non-resident value data, following big data cells when present.
    fn value_data(&self, cell_offset: u32, length: usize) -> HiveResult<Vec<u8>> {
        let cell = self.cell(cell_offset)?;
        if length > BIG_DATA_SEGMENT_SIZE
            && self.header.minor_version >= BIG_DATA_MIN_MINOR
            && cell.len() >= 8
            && &cell[0..2] == DB_SIGNATURE
        {
            return self.big_data(cell_offset, length);
        }
        if cell.len() < length {
            return Err(HiveError::integrity(
                cell_offset,
                format!("value data needs {} bytes, cell holds {}", length, cell.len()),
            ));
        }
        Ok(cell[..length].to_vec())
    }

    /// Reassemble a value stored as a `db` record (u16 sig | u16 segments | u32 list).
    fn big_data(&self, cell_offset: u32, length: usize) -> HiveResult<Vec<u8>> {
        let db = self.signed_cell(cell_offset, DB_SIGNATURE, 8)?;
        let segments = read_u16(db, 2) as usize;
        let list_offset = read_u32(db, 4);

        let list = self.cell(list_offset)?;
        if segments * 4 > list.len() {
            return Err(HiveError::integrity(
                list_offset,
                format!("big data segment count {} exceeds list cell", segments),
            ));
        }

        if length > segments * BIG_DATA_SEGMENT_SIZE {
            return Err(HiveError::integrity(
                cell_offset,
                format!("big data length {} exceeds {} segments", length, segments),
            ));
        }

        let mut data = Vec::with_capacity(length);
        for i in 0..segments {
            if data.len() >= length {
                break;
            }
            let segment = self.cell(read_u32(list, i * 4))?;
            let take = (length - data.len()).min(BIG_DATA_SEGMENT_SIZE).min(segment.len());
            data.extend_from_slice(&segment[..take]);
        }
        if data.len() < length {
            return Err(HiveError::integrity(
                cell_offset,
                format!("big data holds {} of {} bytes", data.len(), length),
            ));
        }
        Ok(data)
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

/// Decode a key or value name stored either as Latin-1 or UTF-16LE.
fn decode_name(bytes: &[u8], compressed: bool) -> String {
    if compressed {
        bytes.iter().map(|&b| b as char).collect()
    } else {
        read_utf16le_string(bytes)
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::HiveBuilder;
    use crate::value::{encode_utf16le_string, ValueData};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample_hive() -> (Hive, crate::builder::BuiltHive) {
        let mut b = HiveBuilder::new("ROOT");
        let software = b.add_key(b.root(), "Software");
        let vendor = b.add_key(software, "Vendor");
        b.add_value(vendor, "Path", ValueType::Sz, encode_utf16le_string("C:\\Tools"));
        b.add_value(vendor, "Count", ValueType::Dword, 3u32.to_le_bytes().to_vec());
        b.add_value(vendor, "", ValueType::Binary, vec![0xAA; 40]);
        b.add_key(b.root(), "System");
        let built = b.build();
        let hive = Hive::from_bytes(built.bytes.clone()).unwrap();
        (hive, built)
    }

    #[test]
    fn test_root_key_and_subkeys() {
        let (hive, _) = sample_hive();
        let root = hive.root_key().unwrap();
        assert_eq!(root.name, "ROOT");
        assert_eq!(root.subkey_count, 2);

        let names: Vec<String> = hive
            .subkeys(&root)
            .unwrap()
            .into_iter()
            .map(|e| e.key.unwrap().name)
            .collect();
        assert_eq!(names, vec!["Software", "System"]);
    }

    #[test]
    fn test_values_resident_and_cell_data() {
        let (hive, built) = sample_hive();
        let vendor = hive.key_node(built.key_offset(2)).unwrap();
        assert_eq!(vendor.name, "Vendor");

        let values: Vec<ValueRecord> = hive
            .values(&vendor)
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap())
            .collect();
        assert_eq!(values.len(), 3);
        assert_eq!(values[0].name, "Path");
        assert_eq!(
            ValueData::decode(values[0].value_type, &values[0].data).unwrap(),
            ValueData::String("C:\\Tools".into())
        );
        // DWORD is stored resident in the offset field.
        assert_eq!(values[1].data, 3u32.to_le_bytes());
        assert_eq!(values[2].name, "");
        assert_eq!(values[2].data, vec![0xAA; 40]);
    }

    #[test]
    fn test_missing_signature_is_format_error() {
        let err = Hive::from_bytes(vec![0u8; 8192]).err().unwrap();
        assert!(matches!(err, HiveError::Format(_)));
    }

    #[test]
    fn test_missing_hbin_is_format_error() {
        let (_, built) = sample_hive();
        let mut bytes = built.bytes;
        bytes[BASE_BLOCK_SIZE..BASE_BLOCK_SIZE + 4].copy_from_slice(b"xxxx");
        let err = Hive::from_bytes(bytes).err().unwrap();
        assert!(err.to_string().contains("hbin"));
    }

    #[test]
    fn test_corrupt_root_is_format_error() {
        let (_, built) = sample_hive();
        let mut bytes = built.bytes.clone();
        built.corrupt_signature(&mut bytes, built.key_offset(0));
        let hive = Hive::from_bytes(bytes).unwrap();
        assert!(matches!(hive.root_key(), Err(HiveError::Format(_))));
    }

    #[test]
    fn test_corrupt_child_is_isolated() {
        let (_, built) = sample_hive();
        let mut bytes = built.bytes.clone();
        built.corrupt_signature(&mut bytes, built.key_offset(1));
        let hive = Hive::from_bytes(bytes).unwrap();
        let root = hive.root_key().unwrap();
        let entries = hive.subkeys(&root).unwrap();
        assert!(matches!(entries[0].key, Err(HiveError::Integrity { .. })));
        assert_eq!(entries[1].key.as_ref().unwrap().name, "System");
    }

    #[test]
    fn test_offset_past_end_is_integrity_error() {
        let (hive, _) = sample_hive();
        let err = hive.key_node(0x00FF_0000).unwrap_err();
        assert!(matches!(err, HiveError::Integrity { offset: 0x00FF_0000, .. }));
    }

    #[test]
    fn test_truncated_file_clamps_bins() {
        let (_, built) = sample_hive();
        let mut bytes = built.bytes.clone();
        let key = built.key_offset(3) as usize;
        bytes.truncate(BASE_BLOCK_SIZE + key + 8);
        let hive = Hive::from_bytes(bytes).unwrap();
        let root = hive.root_key().unwrap();
        let entries = hive.subkeys(&root).unwrap();
        assert!(entries[0].key.is_ok());
        assert!(matches!(entries[1].key, Err(HiveError::Integrity { .. })));
    }

    #[test]
    fn test_big_data_value() {
        let payload: Vec<u8> = (0..40_000u32).map(|i| (i % 251) as u8).collect();
        let mut b = HiveBuilder::new("ROOT");
        b.add_value(b.root(), "Blob", ValueType::Binary, payload.clone());
        let hive = Hive::from_bytes(b.build().bytes).unwrap();
        let root = hive.root_key().unwrap();
        let values = hive.values(&root).unwrap();
        assert_eq!(values[0].as_ref().unwrap().data, payload);
    }

    #[test]
    fn test_big_data_length_beyond_segments_is_integrity_error() {
        let mut b = HiveBuilder::new("ROOT");
        b.add_value(b.root(), "Blob", ValueType::Binary, vec![7u8; 40_000]);
        let built = b.build();
        let mut bytes = built.bytes.clone();
        let at = BASE_BLOCK_SIZE + built.value_offset(0, 0) as usize + 4 + VK_DATA_LENGTH;
        bytes[at..at + 4].copy_from_slice(&0x1000_0000u32.to_le_bytes());

        let hive = Hive::from_bytes(bytes).unwrap();
        let root = hive.root_key().unwrap();
        let values = hive.values(&root).unwrap();
        let err = values[0].as_ref().unwrap_err();
        assert!(matches!(err, HiveError::Integrity { .. }));
        assert!(err.to_string().contains("exceeds 3 segments"));
    }

    #[test]
    fn test_index_root_subkeys() {
        let mut b = HiveBuilder::new("ROOT");
        for i in 0..5 {
            b.add_key(b.root(), &format!("Key{}", i));
        }
        b.use_index_root(b.root(), 2);
        let hive = Hive::from_bytes(b.build().bytes).unwrap();
        let root = hive.root_key().unwrap();
        let names: Vec<String> = hive
            .subkeys(&root)
            .unwrap()
            .into_iter()
            .map(|e| e.key.unwrap().name)
            .collect();
        assert_eq!(names, vec!["Key0", "Key1", "Key2", "Key3", "Key4"]);
    }

    #[test]
    fn test_utf16_key_names() {
        let mut b = HiveBuilder::new("ROOT");
        b.add_key(b.root(), "Ünïcödé键");
        let hive = Hive::from_bytes(b.build().bytes).unwrap();
        let root = hive.root_key().unwrap();
        let child = hive.subkeys(&root).unwrap().remove(0).key.unwrap();
        assert_eq!(child.name, "Ünïcödé键");
    }

    #[test]
    fn test_open_from_file() {
        let (_, built) = sample_hive();
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(&built.bytes).unwrap();
        tmp.flush().unwrap();
        let hive = Hive::open(tmp.path()).unwrap();
        assert_eq!(hive.root_key().unwrap().name, "ROOT");
        assert_eq!(hive.header().file_name, "ROOT");
    }

    #[test]
    fn test_open_empty_file() {
        let tmp = NamedTempFile::new().unwrap();
        assert!(matches!(Hive::open(tmp.path()), Err(HiveError::Format(_))));
    }

    #[test]
    fn test_open_missing_file() {
        let err = Hive::open("/nonexistent/dir/NTUSER.DAT").err().unwrap();
        assert!(matches!(err, HiveError::Io(_)));
    }
}
