//! Registry source backed by an offline hive file.

use super::{Child, RegistrySource, RegistryValue, ValueList};
use crate::error::NodeError;
use regf::{Hive, KeyNode};
use std::path::Path;
use tracing::debug;

/// Root name used when the hive's root key has no name.
const UNNAMED_ROOT: &str = "ROOT";

/// A hive file opened for searching.
pub struct HiveFileSource {
    label: String,
    hive: Hive,
}

impl HiveFileSource {
    /// Open and validate a hive file. Any failure here is file-scoped.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, NodeError> {
        let path = path.as_ref();
        let hive = Hive::open(path)?;
        debug!(
            "hive: opened {} (embedded name '{}')",
            path.display(),
            hive.header().file_name
        );
        Ok(HiveFileSource {
            label: path.display().to_string(),
            hive,
        })
    }

    /// Wrap an already-parsed hive.
    pub fn from_hive(label: impl Into<String>, hive: Hive) -> Self {
        HiveFileSource {
            label: label.into(),
            hive,
        }
    }
}

impl RegistrySource for HiveFileSource {
    type Node = KeyNode;
    type ChildRef = KeyNode;

    fn label(&self) -> &str {
        &self.label
    }

    fn root(&self) -> Result<(String, KeyNode), NodeError> {
        let root = self.hive.root_key()?;
        let name = if root.name.is_empty() {
            UNNAMED_ROOT.to_string()
        } else {
            root.name.clone()
        };
        Ok((name, root))
    }

    fn node_id(&self, node: &KeyNode) -> Option<u64> {
        Some(node.cell_offset as u64)
    }

    fn values(&self, node: &KeyNode) -> Result<ValueList, NodeError> {
        let records = self.hive.values(node)?;
        Ok(records
            .into_iter()
            .map(|record| {
                record
                    .map(|r| RegistryValue::new(r.name, r.value_type, r.data))
                    .map_err(NodeError::from)
            })
            .collect())
    }

    fn children(&self, node: &KeyNode) -> Result<Vec<Child<KeyNode>>, NodeError> {
        let entries = self.hive.subkeys(node)?;
        Ok(entries
            .into_iter()
            .map(|entry| match entry.key {
                Ok(key) => Child {
                    name: key.name.clone(),
                    entry: Ok(key),
                },
                Err(e) => Child {
                    name: format!("<cell {:#x}>", entry.cell_offset),
                    entry: Err(e.into()),
                },
            })
            .collect())
    }

    /// Child cells are decoded while listing; there is no handle to open.
    fn open_child(&self, _parent: &KeyNode, child: KeyNode) -> Result<KeyNode, NodeError> {
        Ok(child)
    }
}
