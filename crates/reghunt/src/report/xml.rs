//! XML report.
//!
//! ```xml
//! <RegistryResults>
//!   <Entry><source>..</source><path>..</path><name>..</name><value>..</value></Entry>
//!   <Entry><source>..</source><path>..</path><kind>..</kind><error>..</error></Entry>
//! </RegistryResults>
//! ```
//!
//! Registry strings may hold control characters that XML 1.0 cannot carry
//! even escaped; those are dropped from element text. Reading a report back
//! therefore gives each field exactly, minus those characters. The JSON and
//! CSV reports keep them.

use super::ReportWriter;
use crate::error::ReportError;
use crate::search::{SearchEntry, SearchResultSet};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;

pub struct XmlReport;

pub const ROOT_ELEMENT: &str = "RegistryResults";
pub const ENTRY_ELEMENT: &str = "Entry";

impl ReportWriter for XmlReport {
    fn write_report(&self, results: &SearchResultSet, out: &mut dyn Write) -> Result<(), ReportError> {
        let mut writer = Writer::new_with_indent(out, b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::Start(BytesStart::new(ROOT_ELEMENT)))?;
        for entry in results.entries() {
            writer.write_event(Event::Start(BytesStart::new(ENTRY_ELEMENT)))?;
            match entry {
                SearchEntry::Hit(h) => {
                    write_field(&mut writer, "source", &h.source)?;
                    write_field(&mut writer, "path", &h.path)?;
                    write_field(&mut writer, "name", &h.name)?;
                    write_field(&mut writer, "value", &h.textual_form)?;
                }
                SearchEntry::Error(e) => {
                    write_field(&mut writer, "source", &e.source)?;
                    write_field(&mut writer, "path", &e.path)?;
                    write_field(&mut writer, "kind", &e.kind.to_string())?;
                    write_field(&mut writer, "error", &e.error_message)?;
                }
            }
            writer.write_event(Event::End(BytesEnd::new(ENTRY_ELEMENT)))?;
        }
        writer.write_event(Event::End(BytesEnd::new(ROOT_ELEMENT)))?;
        writer.get_mut().write_all(b"\n")?;
        Ok(())
    }
}

fn write_field<W: Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> Result<(), ReportError> {
    let clean = xml_safe(text);
    if clean.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new(tag)))?;
        return Ok(());
    }
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(&clean)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

/// Drop characters outside the XML 1.0 `Char` production.
pub fn xml_safe(text: &str) -> String {
    text.chars()
        .filter(|&c| matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}'))
        .collect()
}
