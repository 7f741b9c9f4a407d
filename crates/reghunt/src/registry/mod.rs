//! Source-agnostic registry tree model.
//!
//! A [`RegistrySource`] exposes one root key and, for any key it handed out,
//! that key's values and children. Offline hives ([`HiveFileSource`]) and live
//! registries ([`LiveSource`]) both implement it, so the walker never knows
//! which one it is traversing.
//!
//! Failures are reported per entry: a value or child that cannot be read is
//! returned as an `Err` next to its readable siblings. Children are opened one
//! at a time through [`RegistrySource::open_child`], so a walk holds at most
//! one open key per level.

pub mod hive_source;
pub mod live;
pub mod memory;
#[cfg(windows)]
pub mod windows;

pub use hive_source::HiveFileSource;
pub use live::{LiveKey, LiveRegistry, LiveRoot, LiveSource};
pub use memory::MemoryRegistry;

use crate::error::NodeError;
use regf::{ValueData, ValueType};
use std::fmt;

/// A named, typed datum attached to a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryValue {
    /// Value name; empty for the default value.
    pub name: String,
    pub value_type: ValueType,
    /// Raw payload as stored by the source.
    pub raw: Vec<u8>,
}

impl RegistryValue {
    pub fn new(name: impl Into<String>, value_type: ValueType, raw: Vec<u8>) -> Self {
        RegistryValue {
            name: name.into(),
            value_type,
            raw,
        }
    }

    /// `REG_SZ` value from text.
    pub fn string(name: impl Into<String>, text: &str) -> Self {
        Self::new(name, ValueType::Sz, regf::value::encode_utf16le_string(text))
    }

    /// `REG_DWORD` value.
    pub fn dword(name: impl Into<String>, n: u32) -> Self {
        Self::new(name, ValueType::Dword, n.to_le_bytes().to_vec())
    }

    /// `REG_QWORD` value.
    pub fn qword(name: impl Into<String>, n: u64) -> Self {
        Self::new(name, ValueType::Qword, n.to_le_bytes().to_vec())
    }

    /// `REG_MULTI_SZ` value.
    pub fn multi_string<S: AsRef<str>>(name: impl Into<String>, items: &[S]) -> Self {
        Self::new(
            name,
            ValueType::MultiSz,
            regf::value::encode_utf16le_multi_string(items),
        )
    }

    /// `REG_BINARY` value.
    pub fn binary(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::new(name, ValueType::Binary, bytes)
    }

    /// Decode the payload according to its type tag.
    pub fn data(&self) -> regf::HiveResult<ValueData> {
        ValueData::decode(self.value_type, &self.raw)
    }

    /// Canonical text for matching and display; `None` if the payload does
    /// not decode as its declared type.
    pub fn textual_form(&self) -> Option<String> {
        self.data().ok().map(|d| d.to_text())
    }
}

/// A child key as listed by its parent, not yet opened.
///
/// `entry` is the source's reference to the child, or the error that kept
/// the child from being listed.
pub struct Child<R> {
    /// Child name, or a placeholder when the name itself is unreadable.
    pub name: String,
    pub entry: Result<R, NodeError>,
}

/// Per-value results of enumerating one key.
pub type ValueList = Vec<Result<RegistryValue, NodeError>>;

/// Capability contract shared by every registry source.
pub trait RegistrySource {
    /// Handle to one key of this source.
    type Node;

    /// Unopened reference to a child key, produced by [`children`](Self::children).
    type ChildRef;

    /// Label identifying the root in reports (e.g. `HKLM` or a file path).
    fn label(&self) -> &str;

    /// Open the root key; returns its display name and handle.
    fn root(&self) -> Result<(String, Self::Node), NodeError>;

    /// Stable identity of a key within this source, used to detect cycles.
    /// Sources that cannot alias keys return `None`.
    fn node_id(&self, _node: &Self::Node) -> Option<u64> {
        None
    }

    /// Values of a key, in source order.
    fn values(&self, node: &Self::Node) -> Result<ValueList, NodeError>;

    /// Children of a key, in source order. Children are listed, not opened.
    fn children(&self, node: &Self::Node) -> Result<Vec<Child<Self::ChildRef>>, NodeError>;

    /// Open one child listed by `children(parent)`.
    fn open_child(&self, parent: &Self::Node, child: Self::ChildRef) -> Result<Self::Node, NodeError>;
}

/// Backslash-separated key path from the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    pub fn root(name: impl Into<String>) -> Self {
        KeyPath {
            segments: vec![name.into()],
        }
    }

    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        KeyPath { segments }
    }

    /// Leaf segment.
    pub fn name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments below the root.
    pub fn depth(&self) -> usize {
        self.segments.len().saturating_sub(1)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("\\"))
    }
}
