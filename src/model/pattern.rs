use serde::{Deserialize, Serialize};

use super::ids::{CrawlerId, PatternId};

/// A single labeled URL pattern owned by a crawler. `hostname` must match
/// the owning crawler's site hostname modulo a `www.` prefix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlPattern {
    pub id: PatternId,
    pub crawler_id: CrawlerId,
    pub hostname: String,
    pub regex_source: String,
    pub harvester_categories: Vec<String>,
    pub exclude_words: Vec<String>,
    pub ad_script: String,
    pub is_default: bool,
}

/// The tuple produced by matching a URL against a crawler's pattern set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternProfile {
    pub pattern_id: PatternId,
    pub categories: Vec<String>,
    pub exclude_words: Vec<String>,
    pub ad_script: String,
    pub is_default: bool,
}

impl From<&UrlPattern> for PatternProfile {
    fn from(p: &UrlPattern) -> Self {
        Self {
            pattern_id: p.id,
            categories: p.harvester_categories.clone(),
            exclude_words: p.exclude_words.clone(),
            ad_script: p.ad_script.clone(),
            is_default: p.is_default,
        }
    }
}
