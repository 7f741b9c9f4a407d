//! Plain-text report, one line per entry.

use super::ReportWriter;
use crate::error::ReportError;
use crate::search::{SearchEntry, SearchResultSet};
use std::io::Write;

pub struct TextReport;

impl ReportWriter for TextReport {
    fn write_report(&self, results: &SearchResultSet, out: &mut dyn Write) -> Result<(), ReportError> {
        for entry in results.entries() {
            match entry {
                SearchEntry::Hit(h) => writeln!(
                    out,
                    "[+] [{}] {} :: {} = {}",
                    h.source,
                    h.path,
                    display_name(&h.name),
                    h.textual_form
                )?,
                SearchEntry::Error(e) => {
                    writeln!(out, "[!] [{}] {} :: {} error: {}", e.source, e.path, e.kind, e.error_message)?
                }
            }
        }
        Ok(())
    }
}

fn display_name(name: &str) -> &str {
    if name.is_empty() {
        "(Default)"
    } else {
        name
    }
}
