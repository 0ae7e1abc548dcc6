//! Newspaper-style scraper (§4.C "Newspaper-style"): delegates parsing to
//! an article-extraction heuristic and concatenates `title + ". " + body`
//! into a single text piece; no highlights.

use scraper::{Html, Selector};

use super::{normalize_whitespace, BodyExtractor, ExtractedBody};

pub struct NewspaperScraper;

/// Candidate article-container tags, tried in order; the first one with
/// non-trivial text content is treated as the article body.
const ARTICLE_SELECTORS: &[&str] = &["article", "main", "body"];

impl BodyExtractor for NewspaperScraper {
    fn extract_body(&self, document: &Html, _url: &str) -> ExtractedBody {
        let title = extract_title(document);
        let body_text = ARTICLE_SELECTORS
            .iter()
            .find_map(|tag| {
                let selector = Selector::parse(tag).ok()?;
                let el = document.select(&selector).next()?;
                let text = normalize_whitespace(&el.text().collect::<String>());
                if text.is_empty() {
                    None
                } else {
                    Some(text)
                }
            })
            .unwrap_or_default();

        let combined = if title.is_empty() {
            body_text
        } else {
            format!("{title}. {body_text}")
        };

        ExtractedBody {
            title,
            text: if combined.is_empty() {
                Vec::new()
            } else {
                vec![combined]
            },
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
