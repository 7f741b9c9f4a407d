//! Serialization of result sets to files.
//!
//! Four formats are supported, each behind [`ReportWriter`]. [`save_report`]
//! writes through a temporary file in the destination directory and renames
//! it into place, so a failed write leaves any existing file untouched.

pub mod csv;
pub mod json;
pub mod text;
pub mod xml;

use crate::error::{HuntError, HuntResult, ReportError};
use crate::search::SearchResultSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tempfile::NamedTempFile;
use tracing::debug;

/// Output format tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Json,
    Csv,
    Xml,
    #[serde(alias = "txt")]
    Text,
}

impl ReportFormat {
    /// File extension written for this format.
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
            ReportFormat::Xml => "xml",
            ReportFormat::Text => "txt",
        }
    }

    pub fn writer(self) -> Box<dyn ReportWriter> {
        match self {
            ReportFormat::Json => Box::new(json::JsonReport),
            ReportFormat::Csv => Box::new(csv::CsvReport),
            ReportFormat::Xml => Box::new(xml::XmlReport),
            ReportFormat::Text => Box::new(text::TextReport),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ReportFormat {
    type Err = HuntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "csv" => Ok(ReportFormat::Csv),
            "xml" => Ok(ReportFormat::Xml),
            "txt" | "text" => Ok(ReportFormat::Text),
            _ => Err(HuntError::UnknownFormat(s.to_string())),
        }
    }
}

/// Serializes a result set to a byte stream.
pub trait ReportWriter {
    fn write_report(&self, results: &SearchResultSet, out: &mut dyn Write) -> Result<(), ReportError>;
}

/// What [`save_report`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(PathBuf),
    /// The result set was empty; no file was created.
    NothingToSave,
}

/// Write `results` to `destination` in `format`.
pub fn save_report(results: &SearchResultSet, destination: &Path, format: ReportFormat) -> HuntResult<SaveOutcome> {
    if results.is_empty() {
        return Ok(SaveOutcome::NothingToSave);
    }
    write_atomically(results, destination, format).map_err(|source| HuntError::Serialization {
        path: destination.to_path_buf(),
        source,
    })?;
    debug!("report: wrote {} entries to {}", results.len(), destination.display());
    Ok(SaveOutcome::Saved(destination.to_path_buf()))
}

fn write_atomically(results: &SearchResultSet, destination: &Path, format: ReportFormat) -> Result<(), ReportError> {
    let dir = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let tmp = NamedTempFile::new_in(dir)?;
    {
        let mut out = BufWriter::new(tmp.as_file());
        format.writer().write_report(results, &mut out)?;
        out.flush()?;
    }
    tmp.persist(destination).map_err(|e| e.error)?;
    Ok(())
}
