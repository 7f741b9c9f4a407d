//! In-memory implementation of the live registry capability.
//!
//! Used to embed reghunt where no OS registry exists and to exercise the
//! live-source path in tests. Keys keep insertion order.

use super::live::{LiveKey, LiveRegistry, LiveRoot};
use super::RegistryValue;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
struct MemoryNode {
    values: Vec<RegistryValue>,
    children: Vec<(String, Arc<MemoryNode>)>,
    denied: bool,
}

impl MemoryNode {
    /// Find or create the descendant at `segments`.
    fn descend_mut(&mut self, segments: &[&str]) -> &mut MemoryNode {
        let Some((first, rest)) = segments.split_first() else {
            return self;
        };
        let index = match self.children.iter().position(|(name, _)| name == first) {
            Some(i) => i,
            None => {
                self.children
                    .push((first.to_string(), Arc::new(MemoryNode::default())));
                self.children.len() - 1
            }
        };
        Arc::make_mut(&mut self.children[index].1).descend_mut(rest)
    }
}

/// A registry held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    roots: HashMap<LiveRoot, Arc<MemoryNode>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn node_mut(&mut self, root: LiveRoot, path: &str) -> &mut MemoryNode {
        let segments: Vec<&str> = path.split('\\').filter(|s| !s.is_empty()).collect();
        let root_node = self.roots.entry(root).or_default();
        Arc::make_mut(root_node).descend_mut(&segments)
    }

    /// Create the key at `path` (and any missing parents).
    pub fn add_key(&mut self, root: LiveRoot, path: &str) {
        self.node_mut(root, path);
    }

    /// Append a value to the key at `path`, creating the key if needed.
    pub fn add_value(&mut self, root: LiveRoot, path: &str, value: RegistryValue) {
        self.node_mut(root, path).values.push(value);
    }

    /// Make opening the key at `path` fail with `PermissionDenied`.
    /// An empty path denies the root itself.
    pub fn deny(&mut self, root: LiveRoot, path: &str) {
        self.node_mut(root, path).denied = true;
    }
}

impl LiveRegistry for MemoryRegistry {
    fn open_root(&self, root: LiveRoot) -> io::Result<Box<dyn LiveKey>> {
        let node = self
            .roots
            .get(&root)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{} is not present", root)))?;
        open(node)
    }
}

fn open(node: &Arc<MemoryNode>) -> io::Result<Box<dyn LiveKey>> {
    if node.denied {
        return Err(io::Error::new(io::ErrorKind::PermissionDenied, "access is denied"));
    }
    Ok(Box::new(MemoryKey {
        node: Arc::clone(node),
    }))
}

struct MemoryKey {
    node: Arc<MemoryNode>,
}

impl LiveKey for MemoryKey {
    fn enumerate_values(&self) -> io::Result<Vec<io::Result<RegistryValue>>> {
        Ok(self.node.values.iter().cloned().map(Ok).collect())
    }

    fn enumerate_subkey_names(&self) -> io::Result<Vec<io::Result<String>>> {
        Ok(self.node.children.iter().map(|(name, _)| Ok(name.clone())).collect())
    }

    fn open_subkey(&self, name: &str) -> io::Result<Box<dyn LiveKey>> {
        let (_, child) = self
            .node
            .children
            .iter()
            .find(|(n, _)| n == name)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("subkey '{}' not found", name)))?;
        open(child)
    }
}
