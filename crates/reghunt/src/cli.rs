//! Command-line arguments.

use crate::config::{ReportOptions, SearchOptions, DEFAULT_OUTPUT_STEM};
use crate::error::HuntResult;
use crate::registry::LiveRoot;
use crate::search::{HiveFileFilter, MatchMode, SearchRoot, DEFAULT_MAX_DEPTH};
use clap::Parser;
use std::path::PathBuf;

/// Search the Windows registry and offline hive files for a keyword
#[derive(Parser, Debug)]
#[command(name = "reghunt")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Keyword to search for in value data
    #[arg(short = 'i', long = "input", value_name = "KEYWORD")]
    pub keyword: String,

    /// Directory of hive files
    #[arg(short, long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Search the live registry (Windows only)
    #[arg(long)]
    pub live: bool,

    /// Output format: txt, csv, json, xml
    #[arg(short, long, default_value = "txt")]
    pub format: String,

    /// Output file name, without extension
    #[arg(short, long, value_name = "STEM", default_value = DEFAULT_OUTPUT_STEM)]
    pub output: String,

    /// Treat the keyword as a case-insensitive regular expression
    #[arg(long)]
    pub regex: bool,

    /// Maximum key depth below each root
    #[arg(long, env = "REGHUNT_MAX_DEPTH", default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Live root to search (repeatable; default HKLM, HKCU and HKU)
    #[arg(long = "live-root", value_name = "ROOT")]
    pub live_roots: Vec<LiveRoot>,

    /// Hive file extension to accept in --directory (repeatable; default dat, hiv)
    #[arg(long = "hive-ext", value_name = "EXT")]
    pub hive_extensions: Vec<String>,

    /// Do not treat all-uppercase file names as hives
    #[arg(long)]
    pub no_uppercase_names: bool,

    /// Walk roots in parallel
    #[arg(long, env = "REGHUNT_PARALLEL")]
    pub parallel: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    pub fn search_options(&self) -> SearchOptions {
        let mut hive_filter = HiveFileFilter {
            uppercase_names: !self.no_uppercase_names,
            ..Default::default()
        };
        if !self.hive_extensions.is_empty() {
            hive_filter.extensions = self.hive_extensions.clone();
        }
        SearchOptions {
            keyword: self.keyword.clone(),
            mode: if self.regex { MatchMode::Regex } else { MatchMode::Literal },
            max_depth: self.max_depth,
            parallel: self.parallel,
            hive_filter,
        }
    }

    /// Fails on an unknown format tag.
    pub fn report_options(&self) -> HuntResult<ReportOptions> {
        Ok(ReportOptions {
            output_stem: self.output.clone(),
            format: self.format.parse()?,
        })
    }

    /// Live roots to search when `--live` is given.
    pub fn selected_live_roots(&self) -> Vec<LiveRoot> {
        if self.live_roots.is_empty() {
            LiveRoot::ALL.to_vec()
        } else {
            self.live_roots.clone()
        }
    }

    /// Roots in search order: live roots first, then the directory.
    pub fn roots(&self, live_available: bool) -> Vec<SearchRoot> {
        let mut roots = Vec::new();
        if self.live && live_available {
            roots.extend(self.selected_live_roots().into_iter().map(SearchRoot::Live));
        }
        if let Some(dir) = &self.directory {
            roots.push(SearchRoot::Directory(dir.clone()));
        }
        roots
    }
}
