//! Soup-style scraper (§4.C "Soup-style"): DOM-walking extraction with
//! junk-cutoff and grouping-parent merging.

use scraper::{Html, Selector};

use super::{normalize_whitespace, BodyExtractor, ExtractedBody};
use crate::utils::constants::{
    SOUP_GROUPING_TAGS, SOUP_HIGHLIGHT_MAX_WORDS, SOUP_JUNK_CUTOFF_RATIO, SOUP_SEMANTIC_TAGS,
};

pub struct SoupScraper;

struct Piece {
    // Stringified node id of the element's DOM parent, used only to tell
    // whether two adjacent pieces share a grouping parent.
    parent_id: Option<String>,
    text: String,
}

impl BodyExtractor for SoupScraper {
    fn extract_body(&self, document: &Html, _url: &str) -> ExtractedBody {
        let title = extract_title(document);
        let text = extract_text_pieces(document);
        let highlighted_strings = extract_highlights(document);
        ExtractedBody {
            title,
            text,
            highlighted_strings,
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

fn grouping_selector() -> Selector {
    Selector::parse(&SOUP_GROUPING_TAGS.join(", ")).expect("static grouping selector is valid")
}

/// Walk grouping-parent tags in document order, merge adjacent pieces that
/// share a DOM parent, then discard pieces shorter than 30% of the
/// longest piece on the page (§4.C junk cutoff). As the source notes
/// (§9 Open Questions), if the longest piece is unique this can discard
/// everything else — preserved, not "fixed".
fn extract_text_pieces(document: &Html) -> Vec<String> {
    let selector = grouping_selector();
    let raw_pieces: Vec<Piece> = document
        .select(&selector)
        .filter_map(|el| {
            let text = normalize_whitespace(&el.text().collect::<String>());
            if text.is_empty() {
                return None;
            }
            Some(Piece {
                parent_id: el.parent().map(|p| format!("{:?}", p.id())),
                text,
            })
        })
        .collect();

    let mut merged: Vec<Piece> = Vec::new();
    for piece in raw_pieces {
        match merged.last_mut() {
            Some(last) if last.parent_id == piece.parent_id => {
                last.text.push(' ');
                last.text.push_str(&piece.text);
            }
            _ => merged.push(piece),
        }
    }

    let longest = merged.iter().map(|p| p.text.len()).max().unwrap_or(0);
    if longest == 0 {
        return Vec::new();
    }
    let cutoff = (longest as f64 * SOUP_JUNK_CUTOFF_RATIO) as usize;
    merged
        .into_iter()
        .filter(|p| p.text.len() >= cutoff)
        .map(|p| p.text)
        .collect()
}

/// Inline highlights (§4.C): text nodes whose parent is in the semantic
/// tag whitelist and whose word count is ≤ 5.
fn extract_highlights(document: &Html) -> Vec<String> {
    let semantic_selector = match Selector::parse(&SOUP_SEMANTIC_TAGS.join(", ")) {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };
    let mut seen = indexmap::IndexSet::new();
    for el in document.select(&semantic_selector) {
        let text = normalize_whitespace(&el.text().collect::<String>());
        if text.is_empty() {
            continue;
        }
        if text.split_whitespace().count() <= SOUP_HIGHLIGHT_MAX_WORDS {
            seen.insert(text);
        }
    }
    seen.into_iter().collect()
}
