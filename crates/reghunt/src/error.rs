//! Error types for registry searches.
//!
//! [`NodeError`] is scoped to one key, value or hive file and always ends up
//! as an [`ErrorRecord`](crate::search::ErrorRecord) in the results.
//! [`HuntError`] is run-scoped and aborts the run.

use regf::HiveError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Category of a node-scoped failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// A hive file's signature or top-level structure is invalid.
    Format,
    /// A cell inside an otherwise valid hive is inconsistent.
    Integrity,
    /// A live key could not be opened or enumerated.
    Access,
    /// A file or directory could not be read.
    Io,
    /// The maximum traversal depth was reached.
    Depth,
    /// A key is listed as its own descendant.
    Cycle,
    /// A key already walked is listed again under another parent.
    Alias,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Format => "format",
            ErrorKind::Integrity => "integrity",
            ErrorKind::Access => "access",
            ErrorKind::Io => "io",
            ErrorKind::Depth => "depth",
            ErrorKind::Cycle => "cycle",
            ErrorKind::Alias => "alias",
        };
        f.write_str(s)
    }
}

/// A failure confined to a single node, value or file.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct NodeError {
    pub kind: ErrorKind,
    pub message: String,
}

impl NodeError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        NodeError {
            kind,
            message: message.into(),
        }
    }

    pub fn access(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Access, message)
    }
}

impl From<HiveError> for NodeError {
    fn from(err: HiveError) -> Self {
        let kind = match &err {
            HiveError::Io(_) => ErrorKind::Io,
            HiveError::Format(_) => ErrorKind::Format,
            HiveError::Integrity { .. } | HiveError::Decode { .. } => ErrorKind::Integrity,
        };
        NodeError::new(kind, err.to_string())
    }
}

impl From<std::io::Error> for NodeError {
    fn from(err: std::io::Error) -> Self {
        NodeError::access(err.to_string())
    }
}

/// Errors that abort the whole run.
#[derive(Debug, Error)]
pub enum HuntError {
    /// The search pattern is not a valid regular expression.
    #[error("invalid search pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("no search roots: provide --live and/or --directory")]
    NoRoots,

    #[error("unknown output format '{0}' (expected json, csv, xml or txt)")]
    UnknownFormat(String),

    /// The report could not be written; collected results are still in memory.
    #[error("failed to write report to {}: {source}", path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: ReportError,
    },
}

/// Errors raised by individual report writers.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}

pub type HuntResult<T> = Result<T, HuntError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hive_error_kind_mapping() {
        let err: NodeError = HiveError::Format("missing regf signature".into()).into();
        assert_eq!(err.kind, ErrorKind::Format);
        assert!(err.to_string().contains("regf"));

        let err: NodeError = HiveError::Integrity {
            offset: 0x20,
            msg: "bad".into(),
        }
        .into();
        assert_eq!(err.kind, ErrorKind::Integrity);
        assert_eq!(err.to_string(), "corrupt cell at 0x20: bad");
    }

    #[test]
    fn test_io_error_is_access() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: NodeError = io.into();
        assert_eq!(err.kind, ErrorKind::Access);
    }

    #[test]
    fn test_error_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ErrorKind::Cycle).unwrap(), "\"cycle\"");
        assert_eq!(ErrorKind::Integrity.to_string(), "integrity");
    }
}
