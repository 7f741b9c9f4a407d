//! JSON report: an array of hit and error objects.

use super::ReportWriter;
use crate::error::ReportError;
use crate::search::SearchResultSet;
use std::io::Write;

pub struct JsonReport;

impl ReportWriter for JsonReport {
    fn write_report(&self, results: &SearchResultSet, out: &mut dyn Write) -> Result<(), ReportError> {
        serde_json::to_writer_pretty(&mut *out, results)?;
        out.write_all(b"\n")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::MatchHit;

    #[test]
    fn test_json_is_array_of_objects() {
        let mut set = SearchResultSet::new();
        set.push_hit(MatchHit {
            source: "HKCU".into(),
            path: "HKCU\\Environment".into(),
            name: "Path".into(),
            textual_form: "C:\\tools".into(),
        });
        let mut buf = Vec::new();
        JsonReport.write_report(&set, &mut buf).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed[0]["path"], "HKCU\\Environment");
        assert_eq!(parsed[0]["value"], "C:\\tools");
    }
}
