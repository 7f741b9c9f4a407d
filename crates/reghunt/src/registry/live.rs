//! Live registry capability and its adapter to [`RegistrySource`].
//!
//! The live registry API itself is supplied by the caller through
//! [`LiveRegistry`]; this module never checks which platform it runs on.

use super::{Child, KeyPath, RegistrySource, RegistryValue, ValueList};
use crate::error::NodeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::str::FromStr;

/// Top-level live hive roots that can be searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiveRoot {
    #[serde(rename = "HKLM")]
    LocalMachine,
    #[serde(rename = "HKCU")]
    CurrentUser,
    #[serde(rename = "HKU")]
    Users,
}

impl LiveRoot {
    /// Default search order.
    pub const ALL: [LiveRoot; 3] = [LiveRoot::LocalMachine, LiveRoot::CurrentUser, LiveRoot::Users];

    /// Short label used as the first path segment.
    pub fn label(self) -> &'static str {
        match self {
            LiveRoot::LocalMachine => "HKLM",
            LiveRoot::CurrentUser => "HKCU",
            LiveRoot::Users => "HKU",
        }
    }
}

impl fmt::Display for LiveRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LiveRoot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HKLM" | "HKEY_LOCAL_MACHINE" => Ok(LiveRoot::LocalMachine),
            "HKCU" | "HKEY_CURRENT_USER" => Ok(LiveRoot::CurrentUser),
            "HKU" | "HKEY_USERS" => Ok(LiveRoot::Users),
            other => Err(format!("unknown live root '{}' (expected HKLM, HKCU or HKU)", other)),
        }
    }
}

/// An opened live key.
pub trait LiveKey {
    /// Enumerate values; each value may fail individually.
    fn enumerate_values(&self) -> io::Result<Vec<io::Result<RegistryValue>>>;

    /// Enumerate subkey names; each name may fail individually.
    fn enumerate_subkey_names(&self) -> io::Result<Vec<io::Result<String>>>;

    /// Open a subkey for reading.
    fn open_subkey(&self, name: &str) -> io::Result<Box<dyn LiveKey>>;
}

/// Read-only access to a live registry.
pub trait LiveRegistry: Send + Sync {
    fn open_root(&self, root: LiveRoot) -> io::Result<Box<dyn LiveKey>>;
}

/// One live root adapted to the tree model.
pub struct LiveSource<'r> {
    registry: &'r dyn LiveRegistry,
    root: LiveRoot,
}

impl<'r> LiveSource<'r> {
    pub fn new(registry: &'r dyn LiveRegistry, root: LiveRoot) -> Self {
        LiveSource { registry, root }
    }
}

impl RegistrySource for LiveSource<'_> {
    type Node = Box<dyn LiveKey>;
    type ChildRef = String;

    fn label(&self) -> &str {
        self.root.label()
    }

    fn root(&self) -> Result<(String, Box<dyn LiveKey>), NodeError> {
        let key = self
            .registry
            .open_root(self.root)
            .map_err(|e| NodeError::access(format!("cannot open {}: {}", self.root, e)))?;
        Ok((KeyPath::root(self.root.label()).to_string(), key))
    }

    fn values(&self, node: &Box<dyn LiveKey>) -> Result<ValueList, NodeError> {
        let values = node
            .enumerate_values()
            .map_err(|e| NodeError::access(format!("cannot enumerate values: {}", e)))?;
        Ok(values
            .into_iter()
            .map(|v| v.map_err(|e| NodeError::access(format!("cannot read value: {}", e))))
            .collect())
    }

    fn children(&self, node: &Box<dyn LiveKey>) -> Result<Vec<Child<String>>, NodeError> {
        let names = node
            .enumerate_subkey_names()
            .map_err(|e| NodeError::access(format!("cannot enumerate subkeys: {}", e)))?;
        Ok(names
            .into_iter()
            .enumerate()
            .map(|(index, name)| match name {
                Ok(name) => Child {
                    entry: Ok(name.clone()),
                    name,
                },
                Err(e) => Child {
                    name: format!("<subkey #{}>", index),
                    entry: Err(NodeError::access(format!("cannot read subkey name: {}", e))),
                },
            })
            .collect())
    }

    fn open_child(&self, parent: &Box<dyn LiveKey>, name: String) -> Result<Box<dyn LiveKey>, NodeError> {
        parent
            .open_subkey(&name)
            .map_err(|e| NodeError::access(format!("cannot open key: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::registry::MemoryRegistry;

    #[test]
    fn test_parse_live_root() {
        assert_eq!("hklm".parse::<LiveRoot>().unwrap(), LiveRoot::LocalMachine);
        assert_eq!("HKEY_USERS".parse::<LiveRoot>().unwrap(), LiveRoot::Users);
        assert!("HKCR".parse::<LiveRoot>().is_err());
    }

    #[test]
    fn test_live_source_reads_memory_registry() {
        let mut reg = MemoryRegistry::new();
        reg.add_value(LiveRoot::CurrentUser, "Software\\App", RegistryValue::string("Home", "C:\\App"));
        let source = LiveSource::new(&reg, LiveRoot::CurrentUser);

        let (name, root) = source.root().unwrap();
        assert_eq!(name, "HKCU");
        let children = source.children(&root).unwrap();
        assert_eq!(children[0].name, "Software");
        let software_ref = children.into_iter().next().unwrap().entry.unwrap();
        let software = source.open_child(&root, software_ref).unwrap();
        let app_ref = source.children(&software).unwrap().remove(0).entry.unwrap();
        let app = source.open_child(&software, app_ref).unwrap();
        let values = source.values(&app).unwrap();
        assert_eq!(values[0].as_ref().unwrap().name, "Home");
    }

    #[test]
    fn test_denied_subkey_is_scoped_error() {
        let mut reg = MemoryRegistry::new();
        reg.add_key(LiveRoot::LocalMachine, "SAM");
        reg.add_key(LiveRoot::LocalMachine, "Software");
        reg.deny(LiveRoot::LocalMachine, "SAM");
        let source = LiveSource::new(&reg, LiveRoot::LocalMachine);

        let (_, root) = source.root().unwrap();
        let mut children = source.children(&root).unwrap().into_iter();
        let sam = children.next().unwrap().entry.unwrap();
        let software = children.next().unwrap().entry.unwrap();
        assert!(children.next().is_none());
        let err = source.open_child(&root, sam).err().unwrap();
        assert_eq!(err.kind, ErrorKind::Access);
        assert!(source.open_child(&root, software).is_ok());
    }

    #[test]
    fn test_missing_root_is_access_error() {
        let reg = MemoryRegistry::new();
        let source = LiveSource::new(&reg, LiveRoot::Users);
        let err = source.root().err().unwrap();
        assert_eq!(err.kind, ErrorKind::Access);
        assert!(err.message.contains("HKU"));
    }
}
