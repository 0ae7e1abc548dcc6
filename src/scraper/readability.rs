//! Readability-style scraper (§4.C "Readability-style"), the default
//! scraper when none is specified. Strips to plain text; no highlights.

use scraper::{Html, Selector};

use super::{normalize_whitespace, BodyExtractor, ExtractedBody};

pub struct ReadabilityScraper;

/// Tags stripped before reading the remaining body text, matching a
/// readability-style extractor's junk removal.
const STRIP_SELECTORS: &[&str] = &["script", "style", "nav", "header", "footer", "aside"];

impl BodyExtractor for ReadabilityScraper {
    fn extract_body(&self, document: &Html, _url: &str) -> ExtractedBody {
        let title = extract_title(document);
        let text = extract_readable_text(document);
        ExtractedBody {
            title,
            text: if text.is_empty() { Vec::new() } else { vec![text] },
            highlighted_strings: Vec::new(),
        }
    }
}

fn extract_title(document: &Html) -> String {
    if let Ok(selector) = Selector::parse("title") {
        if let Some(el) = document.select(&selector).next() {
            return normalize_whitespace(&el.text().collect::<String>());
        }
    }
    String::new()
}

fn extract_readable_text(document: &Html) -> String {
    let strip_selector = Selector::parse(&STRIP_SELECTORS.join(", ")).ok();
    let body_selector = Selector::parse("body").ok();

    let root = match body_selector.as_ref().and_then(|s| document.select(s).next()) {
        Some(body) => body,
        None => return String::new(),
    };

    let stripped_ids: std::collections::HashSet<String> = strip_selector
        .map(|s| {
            document
                .select(&s)
                .map(|el| format!("{:?}", el.id()))
                .collect()
        })
        .unwrap_or_default();

    let mut pieces = Vec::new();
    for node in root.descendants() {
        if let Some(text) = node.value().as_text() {
            let in_stripped = node
                .ancestors()
                .any(|a| stripped_ids.contains(&format!("{:?}", a.id())));
            if in_stripped {
                continue;
            }
            let normalized = normalize_whitespace(text);
            if !normalized.is_empty() {
                pieces.push(normalized);
            }
        }
    }
    pieces.join(" ")
}
