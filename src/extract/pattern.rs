//! Count extraction strategies.

use regex::Regex;

use crate::page::Document;

/// Pulls a count out of a rendered document.
/// `None` means the marker is absent, which callers treat as zero.
pub trait CountStrategy {
    fn count(&self, document: &Document) -> Option<u32>;
}

/// Finds the first text node matching a phrase like `Show all (\d+) skills`
/// and reads the number from its first capture group.
#[derive(Debug, Clone)]
pub struct PhraseCount {
    pattern: Regex,
}

impl PhraseCount {
    pub fn new(pattern: &str) -> Result<Self, String> {
        let pattern = Regex::new(pattern).map_err(|e| e.to_string())?;
        if pattern.captures_len() < 2 {
            return Err(format!("pattern `{pattern}` has no capture group for the count"));
        }
        Ok(PhraseCount { pattern })
    }
}

impl CountStrategy for PhraseCount {
    fn count(&self, document: &Document) -> Option<u32> {
        document.text_nodes().iter().find_map(|text| {
            let captures = self.pattern.captures(text)?;
            captures.get(1)?.as_str().replace(',', "").parse().ok()
        })
    }
}
