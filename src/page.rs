use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use scraper::{ElementRef, Html, Selector};

static TITLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());

/// A parsed snapshot of a rendered CRM page: the DOM plus the URL it
/// was captured from. All extraction runs against this, never against
/// a live document.
pub struct Page {
    doc: Html,
    url: String,
}

impl Page {
    pub fn parse(html: &str, url: &str) -> Self {
        Page {
            doc: Html::parse_document(html),
            url: url.to_string(),
        }
    }

    /// Load a saved page from disk. The URL is optional: detection
    /// falls back to the page title when it is missing.
    pub fn from_file(path: &Path, url: Option<&str>) -> Result<Self> {
        let html = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(Page::parse(&html, url.unwrap_or("")))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> String {
        self.doc
            .select(&TITLE_SEL)
            .next()
            .map(text_of)
            .unwrap_or_default()
    }

    pub fn select<'a>(&'a self, selector: &'a Selector) -> impl Iterator<Item = ElementRef<'a>> {
        self.doc.select(selector)
    }
}

/// Flatten an element's text nodes, one trimmed chunk per line.
/// The line structure matters: heuristic patterns use newlines as
/// value terminators.
pub fn text_of(el: ElementRef) -> String {
    let mut parts = Vec::new();
    for chunk in el.text() {
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            parts.push(chunk);
        }
    }
    parts.join("\n")
}

/// Text of the first descendant matching `selector`, or empty.
pub fn first_text(el: ElementRef, selector: &Selector) -> String {
    el.select(selector).next().map(text_of).unwrap_or_default()
}

/// Nearest enclosing row, list item, or block container.
pub fn closest_container(el: ElementRef) -> Option<ElementRef> {
    el.ancestors().find_map(|node| {
        let ancestor = ElementRef::wrap(node)?;
        matches!(ancestor.value().name(), "tr" | "li" | "div").then_some(ancestor)
    })
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_and_url() {
        let page = Page::parse(
            "<html><head><title>Leads | Salesforce</title></head><body></body></html>",
            "https://example.my.salesforce.com/lightning/o/Lead/list",
        );
        assert_eq!(page.title(), "Leads | Salesforce");
        assert!(page.url().contains("/lightning/o/Lead/"));
    }

    #[test]
    fn text_of_joins_chunks_per_line() {
        let page = Page::parse(
            "<div id='x'><span>Company: Acme</span><span>Status: Open</span></div>",
            "",
        );
        let sel = Selector::parse("#x").unwrap();
        let el = page.select(&sel).next().unwrap();
        assert_eq!(text_of(el), "Company: Acme\nStatus: Open");
    }

    #[test]
    fn closest_container_prefers_nearest() {
        let page = Page::parse(
            "<div><table><tr><td><li><a id='x' href='#'>link</a></li></td></tr></table></div>",
            "",
        );
        let sel = Selector::parse("a#x").unwrap();
        let el = page.select(&sel).next().unwrap();
        let container = closest_container(el).unwrap();
        assert_eq!(container.value().name(), "li");
    }

    #[test]
    fn closest_container_none_outside_known_tags() {
        let page = Page::parse("<html><body><section><a id='x' href='#'>x</a></section></body></html>", "");
        let sel = Selector::parse("a#x").unwrap();
        let el = page.select(&sel).next().unwrap();
        assert!(closest_container(el).is_none());
    }
}
