//! Search result types.

use crate::error::{ErrorKind, NodeError};
use serde::{Deserialize, Serialize};

/// A value whose textual form matched the keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchHit {
    /// Root the hit was found under (`HKLM`, or a hive file path).
    pub source: String,
    /// Key path, e.g. `HKLM\Software\Vendor`.
    pub path: String,
    /// Value name; empty for the default value.
    pub name: String,
    #[serde(rename = "value")]
    pub textual_form: String,
}

/// A key, value or file that could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub source: String,
    /// Key path, or the file path for whole-file failures.
    pub path: String,
    pub kind: ErrorKind,
    #[serde(rename = "error")]
    pub error_message: String,
}

impl ErrorRecord {
    pub fn new(source: impl Into<String>, path: impl Into<String>, err: &NodeError) -> Self {
        ErrorRecord {
            source: source.into(),
            path: path.into(),
            kind: err.kind,
            error_message: err.message.clone(),
        }
    }
}

/// One entry of a result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchEntry {
    Hit(MatchHit),
    Error(ErrorRecord),
}

/// Ordered hits and errors across every searched root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchResultSet {
    entries: Vec<SearchEntry>,
}

impl SearchResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_hit(&mut self, hit: MatchHit) {
        self.entries.push(SearchEntry::Hit(hit));
    }

    pub fn push_error(&mut self, record: ErrorRecord) {
        self.entries.push(SearchEntry::Error(record));
    }

    /// Append another set, keeping its order after ours.
    pub fn append(&mut self, mut other: SearchResultSet) {
        self.entries.append(&mut other.entries);
    }

    pub fn entries(&self) -> &[SearchEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> impl Iterator<Item = &MatchHit> {
        self.entries.iter().filter_map(|e| match e {
            SearchEntry::Hit(h) => Some(h),
            SearchEntry::Error(_) => None,
        })
    }

    pub fn errors(&self) -> impl Iterator<Item = &ErrorRecord> {
        self.entries.iter().filter_map(|e| match e {
            SearchEntry::Error(r) => Some(r),
            SearchEntry::Hit(_) => None,
        })
    }
}

impl FromIterator<SearchEntry> for SearchResultSet {
    fn from_iter<I: IntoIterator<Item = SearchEntry>>(iter: I) -> Self {
        SearchResultSet {
            entries: iter.into_iter().collect(),
        }
    }
}
