//! reghunt: keyword search over live registries and offline hive files.
//!
//! - [`registry`]: the source-agnostic key/value tree and its hive-file and
//!   live implementations
//! - [`search`]: matcher, depth-first walker, hive discovery and the
//!   multi-root [`Searcher`](search::Searcher)
//! - [`report`]: JSON, CSV, XML and text serialization of results
//!
//! Failures while reading a key, value or file are recorded next to the hits
//! as [`ErrorRecord`](search::ErrorRecord)s; only run-level problems surface
//! as [`HuntError`](error::HuntError).

pub mod cli;
pub mod config;
pub mod error;
pub mod registry;
pub mod report;
pub mod search;

pub use config::{ReportOptions, SearchOptions};
pub use error::{ErrorKind, HuntError, HuntResult, NodeError, ReportError};
pub use report::{save_report, ReportFormat, SaveOutcome};
pub use search::{SearchResultSet, SearchRoot, Searcher};
