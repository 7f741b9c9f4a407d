//! Error types for the hive reader.

use thiserror::Error;

/// Hive parsing/reading errors.
#[derive(Debug, Error)]
pub enum HiveError {
    /// The file could not be opened or read.
    #[error("I/O error: {0}")]
    Io(String),

    /// The file is not a usable hive (bad signature, missing bins, bad root).
    #[error("invalid hive: {0}")]
    Format(String),

    /// A single cell is inconsistent with the rest of the hive.
    #[error("corrupt cell at {offset:#x}: {msg}")]
    Integrity { offset: u32, msg: String },

    /// A value's payload does not fit its declared type.
    #[error("cannot decode {value_type} data: {msg}")]
    Decode { value_type: String, msg: String },
}

impl HiveError {
    pub(crate) fn integrity(offset: u32, msg: impl Into<String>) -> Self {
        HiveError::Integrity {
            offset,
            msg: msg.into(),
        }
    }
}

pub type HiveResult<T> = Result<T, HiveError>;
