//! Small helpers for reading text out of parsed pages.

use scraper::{ElementRef, Html, Selector};

/// Parses a CSS selector known at compile time.
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {}: {:?}", css, e))
}

pub(crate) fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// All text below the element, whitespace collapsed.
pub(crate) fn element_text(element: ElementRef) -> String {
    normalize_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

/// Text of the first element matching the selector, or empty when absent.
pub(crate) fn select_text(doc: &Html, selector: &Selector) -> String {
    doc.select(selector)
        .next()
        .map(element_text)
        .unwrap_or_default()
}
