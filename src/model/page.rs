use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{EntitySentiment, ScoredEntry};
use super::ids::PatternId;

/// Raw scrape output, the wire shape a `Scraper` guarantees (§4.C): the
/// literal key set {url, parser, html, date, metadata, links, text, title,
/// highlighted_strings}. Absence of any key is a scrape failure, so every
/// field here is non-optional except `publication_date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    pub parser: String,
    pub html: String,
    pub publication_date: Option<DateTime<Utc>>,
    pub metadata: BTreeMap<String, serde_json::Value>,
    pub links: Vec<String>,
    /// Per-piece body text, in document order.
    pub text: Vec<String>,
    pub title: String,
    pub highlighted_strings: Vec<String>,
}

impl PageRecord {
    pub fn keywords(&self) -> Vec<String> {
        match self.metadata.get("keywords") {
            Some(serde_json::Value::Array(values)) => values
                .iter()
                .filter_map(|v| v.as_str().map(str::to_owned))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Cache-like raw scrape record with TTL (`expires_at`); past `expires_at`
/// it's treated as absent by the frontier's age filter (§4.B).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawledPage {
    pub page: PageRecord,
    pub fetched_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CrawledPage {
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Durable, upserted-by-url extracted page document (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedPage {
    pub url: String,
    pub site: String,
    pub parser: String,
    pub extractor: String,
    pub extracted_at: DateTime<Utc>,
    pub title: String,
    pub text: String,
    pub keywords: Vec<String>,
    pub entities: Vec<ScoredEntry>,
    pub candidates: Vec<ScoredEntry>,
    pub suggested_entities: Vec<String>,
    pub url_pattern_id: Option<PatternId>,
    pub categories: Vec<String>,
    pub exclude_words: Vec<String>,
}

impl ExtractedPage {
    pub fn entity_sentiments(&self) -> impl Iterator<Item = (&str, &EntitySentiment)> {
        self.entities.iter().map(|e| (e.name.as_str(), &e.sentiment))
    }
}
