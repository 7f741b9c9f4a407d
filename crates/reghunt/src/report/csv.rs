//! CSV report with one row per hit or error.
//!
//! Columns are `source,path,name,value,kind,error`; a hit leaves `kind` and
//! `error` empty, an error leaves `name` and `value` empty.

use super::ReportWriter;
use crate::error::ReportError;
use crate::search::{SearchEntry, SearchResultSet};
use serde::Serialize;
use std::io::Write;

pub struct CsvReport;

#[derive(Serialize)]
struct CsvRow<'a> {
    source: &'a str,
    path: &'a str,
    name: Option<&'a str>,
    value: Option<&'a str>,
    kind: Option<String>,
    error: Option<&'a str>,
}

impl ReportWriter for CsvReport {
    fn write_report(&self, results: &SearchResultSet, out: &mut dyn Write) -> Result<(), ReportError> {
        let mut writer = ::csv::Writer::from_writer(out);
        for entry in results.entries() {
            let row = match entry {
                SearchEntry::Hit(h) => CsvRow {
                    source: &h.source,
                    path: &h.path,
                    name: Some(&h.name),
                    value: Some(&h.textual_form),
                    kind: None,
                    error: None,
                },
                SearchEntry::Error(e) => CsvRow {
                    source: &e.source,
                    path: &e.path,
                    name: None,
                    value: None,
                    kind: Some(e.kind.to_string()),
                    error: Some(&e.error_message),
                },
            };
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}
