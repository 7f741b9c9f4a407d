//! Keyword matching over the textual form of values.

use crate::error::HuntError;
use crate::registry::RegistryValue;
use memchr::memmem;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// How the keyword is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Case-insensitive substring.
    #[default]
    Literal,
    /// Case-insensitive regular expression, matched anywhere in the text.
    Regex,
}

/// A keyword compiled once per run.
#[derive(Debug, Clone)]
pub enum Matcher {
    Literal(memmem::Finder<'static>),
    Regex(Regex),
}

impl Matcher {
    /// Compile `keyword`. An invalid regular expression fails here, before any
    /// source is opened.
    pub fn new(keyword: &str, mode: MatchMode) -> Result<Self, HuntError> {
        match mode {
            MatchMode::Literal => {
                let folded = keyword.to_lowercase();
                Ok(Matcher::Literal(memmem::Finder::new(folded.as_bytes()).into_owned()))
            }
            MatchMode::Regex => RegexBuilder::new(keyword)
                .case_insensitive(true)
                .build()
                .map(Matcher::Regex)
                .map_err(|source| HuntError::Pattern {
                    pattern: keyword.to_string(),
                    source,
                }),
        }
    }

    /// Test already-stringified text.
    pub fn is_match(&self, text: &str) -> bool {
        match self {
            Matcher::Literal(finder) => finder.find(text.to_lowercase().as_bytes()).is_some(),
            Matcher::Regex(re) => re.is_match(text),
        }
    }

    /// Test a value; returns its textual form on a match. Values without a
    /// textual form never match.
    pub fn match_value(&self, value: &RegistryValue) -> Option<String> {
        let text = value.textual_form()?;
        self.is_match(&text).then_some(text)
    }
}
