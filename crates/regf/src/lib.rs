//! Read-only parser for offline Windows registry hive files.
//!
//! This crate decodes the `regf` on-disk format into key nodes and value
//! records. It provides:
//!
//! - [`Hive`]: memory-maps a hive file, validates the base block and the first
//!   hbin, and decodes NK/VK cells and subkey lists on demand
//! - [`ValueType`] / [`ValueData`]: the `REG_*` type tags and typed decoding of
//!   value payloads, shared with live registry sources
//! - `HiveBuilder` (feature `testing`): writes hive images for test fixtures
//!
//! Failures are scoped: a bad base block is a [`HiveError::Format`], a bad
//! cell is a [`HiveError::Integrity`] that only affects the key or value that
//! references it.
//!
//! # Example
//!
//! ```rust,ignore
//! use regf::Hive;
//!
//! let hive = Hive::open("NTUSER.DAT")?;
//! let root = hive.root_key()?;
//! for entry in hive.subkeys(&root)? {
//!     println!("{}", entry.key?.name);
//! }
//! ```

pub mod error;
pub mod header;
pub mod hive;
pub mod value;

#[cfg(any(test, feature = "testing"))]
pub mod builder;

// Re-export key types at crate root.
pub use error::{HiveError, HiveResult};
pub use header::BaseBlock;
pub use hive::{Hive, KeyNode, SubkeyEntry, ValueRecord};
pub use value::{ValueData, ValueType};

#[cfg(any(test, feature = "testing"))]
pub use builder::{BuiltHive, HiveBuilder, KeyId};
