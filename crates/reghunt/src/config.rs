//! Run configuration.

use crate::report::ReportFormat;
use crate::search::{HiveFileFilter, MatchMode, DEFAULT_MAX_DEPTH};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default output file stem.
pub const DEFAULT_OUTPUT_STEM: &str = "registry_results";

/// What to search for and how to walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub keyword: String,
    pub mode: MatchMode,
    pub max_depth: usize,
    /// Walk roots on the rayon pool; output order is unchanged.
    pub parallel: bool,
    pub hive_filter: HiveFileFilter,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            keyword: String::new(),
            mode: MatchMode::Literal,
            max_depth: DEFAULT_MAX_DEPTH,
            parallel: false,
            hive_filter: HiveFileFilter::default(),
        }
    }
}

/// Where and how results are saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportOptions {
    /// Output path without extension.
    pub output_stem: String,
    pub format: ReportFormat,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            output_stem: DEFAULT_OUTPUT_STEM.to_string(),
            format: ReportFormat::Text,
        }
    }
}

impl ReportOptions {
    /// `<stem>.<extension>`.
    pub fn destination(&self) -> PathBuf {
        PathBuf::from(format!("{}.{}", self.output_stem, self.format.extension()))
    }
}
