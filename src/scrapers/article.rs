//! Generic article page adapter.
//!
//! Reads the document `<title>` and the text of every `<p>` element. No
//! site-specific selectors: anything that is not paragraph text is ignored.

use scraper::{Html, Selector};

/// Title and paragraph text of one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageText {
    /// Document title, empty when the page has none.
    pub title: String,
    /// Text of each `<p>` element in document order.
    pub paragraphs: Vec<String>,
}

impl PageText {
    /// All paragraph text joined with single spaces (not yet normalized).
    pub fn joined(&self) -> String {
        self.paragraphs.join(" ")
    }
}

pub fn extract_title_and_paragraphs(html: &str) -> PageText {
    let document = Html::parse_document(html);
    let title_selector = Selector::parse("title").expect("valid selector");
    let paragraph_selector = Selector::parse("p").expect("valid selector");

    let title = document
        .select(&title_selector)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    let paragraphs = document
        .select(&paragraph_selector)
        .map(|p| p.text().collect::<String>())
        .collect();

    PageText { title, paragraphs }
}
