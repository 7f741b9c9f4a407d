//! Keyword search across live roots and hive files.
//!
//! [`Searcher`] expands the requested roots (a directory becomes its hive
//! files), walks each one with a [`Walker`], and concatenates the per-root
//! results in the order the roots were given.

pub mod discovery;
pub mod matcher;
pub mod results;
pub mod walker;

pub use discovery::{discover_hive_files, HiveFileFilter};
pub use matcher::{MatchMode, Matcher};
pub use results::{ErrorRecord, MatchHit, SearchEntry, SearchResultSet};
pub use walker::{Walker, DEFAULT_MAX_DEPTH};

use crate::config::SearchOptions;
use crate::error::{HuntError, HuntResult, NodeError};
use crate::registry::{HiveFileSource, LiveRegistry, LiveRoot, LiveSource};
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One requested search root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchRoot {
    /// A live top-level hive.
    Live(LiveRoot),
    /// A single offline hive file.
    HiveFile(PathBuf),
    /// Every hive file in a directory, filtered by [`HiveFileFilter`].
    Directory(PathBuf),
}

/// A root after directory expansion.
enum Task {
    Live(LiveRoot),
    File(PathBuf),
    Failed(ErrorRecord),
}

pub struct Searcher {
    matcher: Matcher,
    options: SearchOptions,
    live: Option<Arc<dyn LiveRegistry>>,
}

impl Searcher {
    /// Compile the keyword. Fails on an invalid pattern, before any I/O.
    pub fn new(options: SearchOptions) -> HuntResult<Self> {
        let matcher = Matcher::new(&options.keyword, options.mode)?;
        Ok(Searcher {
            matcher,
            options,
            live: None,
        })
    }

    /// Supply the live registry used for [`SearchRoot::Live`] roots.
    pub fn with_live_registry(mut self, registry: Arc<dyn LiveRegistry>) -> Self {
        self.live = Some(registry);
        self
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Search every root. Node- and file-level failures are recorded in the
    /// result set; only an empty root list is an error.
    pub fn run(&self, roots: &[SearchRoot]) -> HuntResult<SearchResultSet> {
        if roots.is_empty() {
            return Err(HuntError::NoRoots);
        }
        let tasks = self.expand(roots);
        debug!("search: {} roots expanded to {} tasks", roots.len(), tasks.len());

        let per_task: Vec<SearchResultSet> = if self.options.parallel {
            tasks.par_iter().map(|t| self.run_task(t)).collect()
        } else {
            tasks.iter().map(|t| self.run_task(t)).collect()
        };

        let mut results = SearchResultSet::new();
        for set in per_task {
            results.append(set);
        }
        info!(
            "search: {} hits, {} errors across {} tasks",
            results.hits().count(),
            results.errors().count(),
            tasks.len()
        );
        Ok(results)
    }

    fn expand(&self, roots: &[SearchRoot]) -> Vec<Task> {
        let mut tasks = Vec::new();
        for root in roots {
            match root {
                SearchRoot::Live(r) => tasks.push(Task::Live(*r)),
                SearchRoot::HiveFile(p) => tasks.push(Task::File(p.clone())),
                SearchRoot::Directory(dir) if !dir.is_dir() => {
                    // Reported to the user by the caller; there is nothing to search.
                    warn!("search: directory not found: {}", dir.display());
                }
                SearchRoot::Directory(dir) => {
                    match discover_hive_files(dir, &self.options.hive_filter) {
                        Ok(files) => tasks.extend(files.into_iter().map(Task::File)),
                        Err(e) => {
                            let label = dir.display().to_string();
                            tasks.push(Task::Failed(ErrorRecord::new(&label, &label, &e)));
                        }
                    }
                }
            }
        }
        tasks
    }

    fn run_task(&self, task: &Task) -> SearchResultSet {
        let walker = Walker::new(&self.matcher, self.options.max_depth);
        let mut results = SearchResultSet::new();
        match task {
            Task::Live(root) => match &self.live {
                Some(registry) => walker.walk(&LiveSource::new(registry.as_ref(), *root), &mut results),
                None => {
                    let e = NodeError::access("no live registry is available");
                    results.push_error(ErrorRecord::new(root.label(), root.label(), &e));
                }
            },
            Task::File(path) => match HiveFileSource::open(path) {
                Ok(source) => walker.walk(&source, &mut results),
                Err(e) => {
                    debug!("search: cannot open {}: {}", path.display(), e);
                    let label = path.display().to_string();
                    results.push_error(ErrorRecord::new(&label, &label, &e));
                }
            },
            Task::Failed(record) => results.push_error(record.clone()),
        }
        results
    }
}
