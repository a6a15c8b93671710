//! Page automation surface.
//!
//! The extractor only talks to a page through [`PageAccessor`]. The real
//! implementation drives a browser over WebDriver; tests script one in memory.

pub mod webdriver;

use std::time::Duration;

use thiserror::Error;

pub use webdriver::WebDriverPage;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    /// A bounded wait ran past its deadline.
    #[error("timed out: {0}")]
    Timeout(String),

    /// An expected structural marker is missing from the page.
    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("{0}")]
    Other(String),
}

/// Opaque reference to an element on the current page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub String);

/// Rendered page content as returned by the browser.
#[derive(Debug, Clone, Default)]
pub struct Document {
    source: String,
}

impl Document {
    pub fn new(source: impl Into<String>) -> Self {
        Document { source: source.into() }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Text content between tags, whitespace-normalized, skipping empty runs
    /// and the bodies of `<script>`/`<style>` elements.
    pub fn text_nodes(&self) -> Vec<String> {
        let mut nodes = Vec::new();
        let mut text = String::new();
        let mut tag = String::new();
        let mut in_tag = false;
        let mut skipping = false;

        for ch in self.source.chars() {
            match ch {
                '<' if !in_tag => {
                    if !skipping {
                        push_text(&mut nodes, &text);
                    }
                    text.clear();
                    tag.clear();
                    in_tag = true;
                }
                '>' if in_tag => {
                    in_tag = false;
                    let name = tag_name(&tag);
                    if name == "script" || name == "style" {
                        skipping = true;
                    } else if name == "/script" || name == "/style" {
                        skipping = false;
                    }
                }
                _ if in_tag => tag.push(ch),
                _ => text.push(ch),
            }
        }
        if !skipping {
            push_text(&mut nodes, &text);
        }
        nodes
    }
}

fn tag_name(tag: &str) -> String {
    tag.trim()
        .split(|c: char| c.is_whitespace())
        .next()
        .unwrap_or("")
        .trim_end_matches('/')
        .to_ascii_lowercase()
}

fn push_text(nodes: &mut Vec<String>, raw: &str) {
    let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if !normalized.is_empty() {
        nodes.push(normalized);
    }
}

/// Capability surface the extractor consumes. Assumes an already
/// authenticated session; not safe for concurrent use.
pub trait PageAccessor {
    fn navigate(&mut self, target: &str) -> Result<(), PageError>;

    fn current_document(&mut self) -> Result<Document, PageError>;

    /// Scroll-to-bottom equivalent that provokes lazily loaded content.
    fn trigger_lazy_load(&mut self) -> Result<(), PageError>;

    fn find_all(&mut self, selector: &str) -> Result<Vec<ElementHandle>, PageError>;

    /// Waits until an element matching `selector` is visible.
    /// Returns [`PageError::Timeout`] once `timeout` has elapsed.
    fn wait_for_visible(&mut self, selector: &str, timeout: Duration)
        -> Result<ElementHandle, PageError>;

    fn attribute(&mut self, element: &ElementHandle, name: &str)
        -> Result<Option<String>, PageError>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_nodes_split_on_tags() {
        let doc = Document::new("<div><span>Show all 12 skills</span>\n<p>  About   me </p></div>");
        assert_eq!(doc.text_nodes(), vec!["Show all 12 skills", "About me"]);
    }

    #[test]
    fn text_nodes_skip_script_bodies() {
        let doc = Document::new(
            r#"<script type="text/javascript">var x = "Show all 9 skills";</script><b>visible</b>"#,
        );
        assert_eq!(doc.text_nodes(), vec!["visible"]);
    }

    #[test]
    fn empty_document_has_no_text() {
        assert!(Document::default().text_nodes().is_empty());
    }
}
