//! Hive image builder for test fixtures.
//!
//! Produces a minimal but well-formed hive: one base block and a single hbin
//! holding every cell. Cells are laid out key by key (NK, subkey list, value
//! list, then each value's VK and data), so a key declared last occupies the
//! tail of the file.

use crate::header::{compute_checksum, BASE_BLOCK_SIZE};
use crate::hive::{
    BIG_DATA_SEGMENT_SIZE, KEY_COMP_NAME, NK_FLAGS, NK_NAME_LENGTH, NK_NAME_START,
    NK_SUBKEY_COUNT, NK_SUBKEY_LIST, NK_VALUE_COUNT, NK_VALUE_LIST, NO_CELL, VALUE_COMP_NAME,
    VK_DATA_LENGTH, VK_DATA_OFFSET, VK_FLAGS, VK_NAME_LENGTH, VK_NAME_START, VK_TYPE,
};
use crate::value::ValueType;

/// Index of a key inside a [`HiveBuilder`]; the root is always 0.
pub type KeyId = usize;

const HBIN_HEADER_SIZE: u32 = 0x20;
const HBIN_ALIGN: u32 = 4096;
/// NK flags written for the root key (KEY_HIVE_ENTRY | KEY_NO_DELETE).
const ROOT_FLAGS: u16 = 0x0004 | 0x0008;

struct KeyDef {
    name: String,
    parent: Option<KeyId>,
    children: Vec<KeyId>,
    values: Vec<ValueDef>,
    index_root_chunk: Option<usize>,
}

struct ValueDef {
    name: String,
    value_type: ValueType,
    data: Vec<u8>,
}

/// Declarative builder for hive fixtures.
pub struct HiveBuilder {
    keys: Vec<KeyDef>,
}

/// A built hive image plus the cell offsets of everything it contains.
pub struct BuiltHive {
    pub bytes: Vec<u8>,
    key_offsets: Vec<u32>,
    value_offsets: Vec<Vec<u32>>,
}

impl BuiltHive {
    /// Cell offset of a key's NK record.
    pub fn key_offset(&self, key: KeyId) -> u32 {
        self.key_offsets[key]
    }

    /// Cell offset of the `index`-th value's VK record under `key`.
    pub fn value_offset(&self, key: KeyId, index: usize) -> u32 {
        self.value_offsets[key][index]
    }

    /// Overwrite the two-byte signature of the cell at `cell_offset`.
    pub fn corrupt_signature(&self, bytes: &mut [u8], cell_offset: u32) {
        let at = BASE_BLOCK_SIZE + cell_offset as usize + 4;
        bytes[at] = b'x';
        bytes[at + 1] = b'x';
    }

    /// Overwrite the size field of the cell at `cell_offset`.
    pub fn set_cell_size(&self, bytes: &mut [u8], cell_offset: u32, size: i32) {
        let at = BASE_BLOCK_SIZE + cell_offset as usize;
        bytes[at..at + 4].copy_from_slice(&size.to_le_bytes());
    }
}

/// Per-key cell offsets decided before anything is written.
struct KeyLayout {
    nk: u32,
    subkey_list: Option<u32>,
    leaf_lists: Vec<u32>,
    value_list: Option<u32>,
    values: Vec<ValueLayout>,
}

struct ValueLayout {
    vk: u32,
    data: DataLayout,
}

enum DataLayout {
    Resident,
    Cell(u32),
    Big {
        db: u32,
        segment_list: u32,
        segments: Vec<u32>,
    },
}

impl HiveBuilder {
    pub fn new(root_name: &str) -> Self {
        HiveBuilder {
            keys: vec![KeyDef {
                name: root_name.to_string(),
                parent: None,
                children: Vec::new(),
                values: Vec::new(),
                index_root_chunk: None,
            }],
        }
    }

    pub fn root(&self) -> KeyId {
        0
    }

    /// Add a new child key under `parent`.
    pub fn add_key(&mut self, parent: KeyId, name: &str) -> KeyId {
        let id = self.keys.len();
        self.keys.push(KeyDef {
            name: name.to_string(),
            parent: Some(parent),
            children: Vec::new(),
            values: Vec::new(),
            index_root_chunk: None,
        });
        self.keys[parent].children.push(id);
        id
    }

    /// List an existing key as an additional child of `parent`.
    /// Linking a key under itself or a descendant produces a cyclic hive.
    pub fn link_key(&mut self, parent: KeyId, existing: KeyId) {
        self.keys[parent].children.push(existing);
    }

    pub fn add_value(&mut self, key: KeyId, name: &str, value_type: ValueType, data: Vec<u8>) {
        self.keys[key].values.push(ValueDef {
            name: name.to_string(),
            value_type,
            data,
        });
    }

    /// Store `key`'s subkeys behind an `ri` index root with leaves of `chunk` entries.
    pub fn use_index_root(&mut self, key: KeyId, chunk: usize) {
        self.keys[key].index_root_chunk = Some(chunk.max(1));
    }

    pub fn build(&self) -> BuiltHive {
        let mut cursor = HBIN_HEADER_SIZE;
        let mut alloc = |payload: usize| -> u32 {
            let offset = cursor;
            cursor += cell_size(payload);
            offset
        };

        // Pass 1: decide every cell offset.
        let mut layouts = Vec::with_capacity(self.keys.len());
        for key in &self.keys {
            let nk = alloc(NK_NAME_START + encode_name(&key.name).0.len());
            let mut leaf_lists = Vec::new();
            let subkey_list = if key.children.is_empty() {
                None
            } else if let Some(chunk) = key.index_root_chunk {
                let chunks = key.children.chunks(chunk).count();
                let ri = alloc(4 + chunks * 4);
                for leaf in key.children.chunks(chunk) {
                    leaf_lists.push(alloc(4 + leaf.len() * 8));
                }
                Some(ri)
            } else {
                Some(alloc(4 + key.children.len() * 8))
            };
            let value_list = if key.values.is_empty() {
                None
            } else {
                Some(alloc(key.values.len() * 4))
            };
            let values = key
                .values
                .iter()
                .map(|v| {
                    let vk = alloc(VK_NAME_START + encode_name(&v.name).0.len());
                    let data = if v.data.len() <= 4 {
                        DataLayout::Resident
                    } else if v.data.len() > BIG_DATA_SEGMENT_SIZE {
                        let count = v.data.len().div_ceil(BIG_DATA_SEGMENT_SIZE);
                        let db = alloc(8);
                        let segment_list = alloc(count * 4);
                        let segments = v
                            .data
                            .chunks(BIG_DATA_SEGMENT_SIZE)
                            .map(|s| alloc(s.len()))
                            .collect();
                        DataLayout::Big {
                            db,
                            segment_list,
                            segments,
                        }
                    } else {
                        DataLayout::Cell(alloc(v.data.len()))
                    };
                    ValueLayout { vk, data }
                })
                .collect();
            layouts.push(KeyLayout {
                nk,
                subkey_list,
                leaf_lists,
                value_list,
                values,
            });
        }

        let used = cursor;
        let bins_size = used.div_ceil(HBIN_ALIGN).max(1) * HBIN_ALIGN;
        let mut bins = vec![0u8; bins_size as usize];

        // hbin header
        bins[0..4].copy_from_slice(b"hbin");
        put_u32(&mut bins, 8, bins_size);
        if bins_size - used >= 8 {
            put_i32(&mut bins, used as usize, (bins_size - used) as i32);
        }

        // Pass 2: write cells.
        for (key, layout) in self.keys.iter().zip(&layouts) {
            let (name_bytes, compressed) = encode_name(&key.name);
            let nk = open_cell(&mut bins, layout.nk, NK_NAME_START + name_bytes.len());
            nk[0..2].copy_from_slice(b"nk");
            let mut flags = if compressed { KEY_COMP_NAME } else { 0 };
            if key.parent.is_none() {
                flags |= ROOT_FLAGS;
            }
            put_u16(nk, NK_FLAGS, flags);
            let parent = key.parent.map(|p| layouts[p].nk).unwrap_or(NO_CELL);
            put_u32(nk, 16, parent);
            put_u32(nk, NK_SUBKEY_COUNT, key.children.len() as u32);
            put_u32(nk, NK_SUBKEY_LIST, layout.subkey_list.unwrap_or(NO_CELL));
            put_u32(nk, 32, NO_CELL);
            put_u32(nk, NK_VALUE_COUNT, key.values.len() as u32);
            put_u32(nk, NK_VALUE_LIST, layout.value_list.unwrap_or(NO_CELL));
            put_u32(nk, 44, NO_CELL);
            put_u32(nk, 48, NO_CELL);
            put_u16(nk, NK_NAME_LENGTH, name_bytes.len() as u16);
            nk[NK_NAME_START..NK_NAME_START + name_bytes.len()].copy_from_slice(&name_bytes);

            if let Some(list) = layout.subkey_list {
                match key.index_root_chunk {
                    Some(chunk) => {
                        let ri = open_cell(&mut bins, list, 4 + layout.leaf_lists.len() * 4);
                        write_list_header(ri, b"ri", layout.leaf_lists.len());
                        for (i, leaf) in layout.leaf_lists.iter().enumerate() {
                            put_u32(ri, 4 + i * 4, *leaf);
                        }
                        for (leaf, ids) in layout.leaf_lists.iter().zip(key.children.chunks(chunk)) {
                            self.write_fast_leaf(&mut bins, *leaf, ids, &layouts);
                        }
                    }
                    None => self.write_fast_leaf(&mut bins, list, &key.children, &layouts),
                }
            }

            if let Some(list) = layout.value_list {
                let cell = open_cell(&mut bins, list, key.values.len() * 4);
                for (i, v) in layout.values.iter().enumerate() {
                    put_u32(cell, i * 4, v.vk);
                }
            }

            for (value, vl) in key.values.iter().zip(&layout.values) {
                write_value(&mut bins, value, vl);
            }
        }

        let mut bytes = vec![0u8; BASE_BLOCK_SIZE];
        bytes[0..4].copy_from_slice(b"regf");
        put_u32(&mut bytes, 0x04, 1);
        put_u32(&mut bytes, 0x08, 1);
        put_u32(&mut bytes, 0x14, 1);
        put_u32(&mut bytes, 0x18, 5);
        put_u32(&mut bytes, 0x20, 1);
        put_u32(&mut bytes, 0x24, layouts[0].nk);
        put_u32(&mut bytes, 0x28, bins_size);
        put_u32(&mut bytes, 0x2C, 1);
        for (i, unit) in self.keys[0].name.encode_utf16().take(31).enumerate() {
            put_u16(&mut bytes, 0x30 + i * 2, unit);
        }
        let checksum = compute_checksum(&bytes);
        put_u32(&mut bytes, 0x1FC, checksum);
        bytes.extend_from_slice(&bins);

        BuiltHive {
            bytes,
            key_offsets: layouts.iter().map(|l| l.nk).collect(),
            value_offsets: layouts
                .iter()
                .map(|l| l.values.iter().map(|v| v.vk).collect())
                .collect(),
        }
    }

    fn write_fast_leaf(&self, bins: &mut [u8], offset: u32, ids: &[KeyId], layouts: &[KeyLayout]) {
        let cell = open_cell(bins, offset, 4 + ids.len() * 8);
        write_list_header(cell, b"lf", ids.len());
        for (i, id) in ids.iter().enumerate() {
            put_u32(cell, 4 + i * 8, layouts[*id].nk);
            let mut hint = [0u8; 4];
            for (slot, b) in hint.iter_mut().zip(self.keys[*id].name.bytes()) {
                *slot = b;
            }
            cell[8 + i * 8..12 + i * 8].copy_from_slice(&hint);
        }
    }
}

fn write_value(bins: &mut [u8], value: &ValueDef, layout: &ValueLayout) {
    let (name_bytes, compressed) = encode_name(&value.name);
    let vk = open_cell(bins, layout.vk, VK_NAME_START + name_bytes.len());
    vk[0..2].copy_from_slice(b"vk");
    put_u16(vk, VK_NAME_LENGTH, name_bytes.len() as u16);
    put_u32(vk, VK_TYPE, value.value_type.to_raw());
    put_u16(vk, VK_FLAGS, if compressed { VALUE_COMP_NAME } else { 0 });
    vk[VK_NAME_START..VK_NAME_START + name_bytes.len()].copy_from_slice(&name_bytes);

    let len = value.data.len() as u32;
    match &layout.data {
        DataLayout::Resident => {
            put_u32(vk, VK_DATA_LENGTH, len | 0x8000_0000);
            vk[VK_DATA_OFFSET..VK_DATA_OFFSET + value.data.len()].copy_from_slice(&value.data);
        }
        DataLayout::Cell(offset) => {
            put_u32(vk, VK_DATA_LENGTH, len);
            put_u32(vk, VK_DATA_OFFSET, *offset);
            let cell = open_cell(bins, *offset, value.data.len());
            cell[..value.data.len()].copy_from_slice(&value.data);
        }
        DataLayout::Big {
            db,
            segment_list,
            segments,
        } => {
            put_u32(vk, VK_DATA_LENGTH, len);
            put_u32(vk, VK_DATA_OFFSET, *db);
            let cell = open_cell(bins, *db, 8);
            write_list_header(cell, b"db", segments.len());
            put_u32(cell, 4, *segment_list);
            let list = open_cell(bins, *segment_list, segments.len() * 4);
            for (i, s) in segments.iter().enumerate() {
                put_u32(list, i * 4, *s);
            }
            for (s, chunk) in segments.iter().zip(value.data.chunks(BIG_DATA_SEGMENT_SIZE)) {
                let cell = open_cell(bins, *s, chunk.len());
                cell[..chunk.len()].copy_from_slice(chunk);
            }
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

/// Allocated cell size for a payload: 4-byte header, rounded up to 8.
fn cell_size(payload: usize) -> u32 {
    ((4 + payload as u32) + 7) & !7
}

/// Write the allocated-cell header and return the cell payload.
fn open_cell(bins: &mut [u8], offset: u32, payload: usize) -> &mut [u8] {
    let size = cell_size(payload);
    let start = offset as usize;
    put_i32(bins, start, -(size as i32));
    &mut bins[start + 4..start + size as usize]
}

fn write_list_header(cell: &mut [u8], sig: &[u8; 2], count: usize) {
    cell[0..2].copy_from_slice(sig);
    put_u16(cell, 2, count as u16);
}

/// Latin-1 names are stored compressed, anything else as UTF-16LE.
fn encode_name(name: &str) -> (Vec<u8>, bool) {
    if name.chars().all(|c| (c as u32) < 0x100) {
        (name.chars().map(|c| c as u8).collect(), true)
    } else {
        (name.encode_utf16().flat_map(|u| u.to_le_bytes()).collect(), false)
    }
}

fn put_u16(buf: &mut [u8], at: usize, v: u16) {
    buf[at..at + 2].copy_from_slice(&v.to_le_bytes());
}

fn put_u32(buf: &mut [u8], at: usize, v: u32) {
    buf[at..at + 4].copy_from_slice(&v.to_le_bytes());
}

fn put_i32(buf: &mut [u8], at: usize, v: i32) {
    buf[at..at + 4].copy_from_slice(&v.to_le_bytes());
}
