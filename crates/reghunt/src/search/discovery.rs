//! Hive file discovery in a directory.

use crate::error::{ErrorKind, NodeError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Which directory entries are treated as hive files.
///
/// A file is accepted when its extension is one of `extensions`
/// (case-insensitive), or, with `uppercase_names`, when its name has at least
/// one cased letter and no lowercase ones (`SYSTEM`, `NTUSER.DAT`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HiveFileFilter {
    pub extensions: Vec<String>,
    pub uppercase_names: bool,
}

impl Default for HiveFileFilter {
    fn default() -> Self {
        HiveFileFilter {
            extensions: vec!["dat".to_string(), "hiv".to_string()],
            uppercase_names: true,
        }
    }
}

impl HiveFileFilter {
    pub fn accepts(&self, file_name: &str) -> bool {
        let lower = file_name.to_lowercase();
        let by_extension = self.extensions.iter().any(|ext| {
            let ext = ext.trim_start_matches('.').to_lowercase();
            !ext.is_empty() && lower.ends_with(&format!(".{}", ext))
        });
        by_extension || (self.uppercase_names && is_all_uppercase(file_name))
    }
}

fn is_all_uppercase(name: &str) -> bool {
    let mut cased = false;
    for c in name.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased
}

/// List the regular files in `dir` accepted by `filter`, sorted by name.
///
/// Only the directory itself failing to open is an error; unreadable entries
/// are skipped with a warning.
pub fn discover_hive_files(dir: &Path, filter: &HiveFileFilter) -> Result<Vec<PathBuf>, NodeError> {
    let entries = fs::read_dir(dir).map_err(|e| {
        NodeError::new(ErrorKind::Io, format!("cannot read directory {}: {}", dir.display(), e))
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("discovery: skipping entry in {}: {}", dir.display(), e);
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if filter.accepts(&name) {
            files.push(path);
        } else {
            debug!("discovery: ignoring {}", path.display());
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    debug!("discovery: {} hive candidates in {}", files.len(), dir.display());
    Ok(files)
}
