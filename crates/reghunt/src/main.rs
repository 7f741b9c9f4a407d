//! reghunt: search live registry roots and offline hive files for a keyword.
//!
//! Logs go to stderr; stdout carries only the user-facing status lines.

use reghunt::cli::Cli;
use reghunt::registry::LiveRegistry;
use reghunt::{save_report, SaveOutcome, SearchResultSet, Searcher};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();

    let default_level = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Format tag and pattern are checked before any root is opened.
    let report = cli.report_options()?;
    let options = cli.search_options();
    tracing::debug!("reghunt: {:?}, {:?}", options, report);
    let mut searcher = Searcher::new(options)?;

    let live = if cli.live { live_registry() } else { None };
    if cli.live && live.is_none() {
        println!("[!] Live registry search is only supported on Windows. Skipping live search.");
    }
    let roots = cli.roots(live.is_some());
    if let Some(registry) = live {
        searcher = searcher.with_live_registry(registry);
    }
    if let Some(dir) = &cli.directory {
        if !dir.is_dir() {
            println!("[!] Directory not found: {}", dir.display());
        }
    }

    // A skipped --live with nothing else to search is an empty run, not an error.
    let results = if roots.is_empty() && cli.live {
        SearchResultSet::new()
    } else {
        searcher.run(&roots)?
    };

    match save_report(&results, &report.destination(), report.format)? {
        SaveOutcome::Saved(path) => println!("[+] Results saved to {}", path.display()),
        SaveOutcome::NothingToSave => println!("[!] No results found. Nothing was saved."),
    }
    Ok(())
}

#[cfg(windows)]
fn live_registry() -> Option<Arc<dyn LiveRegistry>> {
    Some(Arc::new(reghunt::registry::windows::WindowsRegistry))
}

#[cfg(not(windows))]
fn live_registry() -> Option<Arc<dyn LiveRegistry>> {
    None
}
