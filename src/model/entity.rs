use serde::{Deserialize, Serialize};

/// Sentiment class derived purely from score sign (§4.E step 7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentClass {
    Positive,
    Neutral,
    Negative,
}

impl SentimentClass {
    pub fn from_score(score: f64) -> Self {
        if score > 0.0 {
            SentimentClass::Positive
        } else if score < 0.0 {
            SentimentClass::Negative
        } else {
            SentimentClass::Neutral
        }
    }
}

/// A running-mean sentiment triple attached to an entity or candidate
/// mention (§4.E.2).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EntitySentiment {
    pub score: f64,
    pub count: u64,
    pub class: SentimentClass,
}

impl EntitySentiment {
    pub fn first(score: f64) -> Self {
        Self {
            score,
            count: 1,
            class: SentimentClass::from_score(score),
        }
    }

    /// Fold a new sentence sentiment into the running mean. `keyword`
    /// replaces the mean instead of averaging, matching the source's
    /// entity-keyword branch (§4.E.2, REDESIGN/Open Questions).
    pub fn update(&self, sentiment: f64, keyword: bool) -> Self {
        let count = self.count + 1;
        let score = if keyword {
            sentiment
        } else {
            (self.score * (self.count as f64) + sentiment) / (count as f64)
        };
        Self {
            score,
            count,
            class: SentimentClass::from_score(score),
        }
    }
}

/// The on-wire shape for both entities and candidates (§4.E step 7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredEntry {
    pub name: String,
    pub sentiment: EntitySentiment,
}

/// A catalog entry in `entity_catalog`, looked up by case-folded name.
/// Disabled entries never match (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityCatalogEntry {
    pub name: String,
    pub normalized_name: String,
    pub category: String,
    pub source: String,
    pub occur: u64,
    pub disabled: bool,
}

/// A live (non-disabled) dictionary hit snapshot, as returned by
/// `EntityDictionary::check` and cached by folded name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub category: String,
}

impl Entity {
    /// `name.category`, the key used for per-sentence entity accumulation
    /// (§4.E.3) — two entities of the same name but different categories
    /// accumulate separately.
    pub fn key(&self) -> String {
        format!("{}.{}", self.name, self.category)
    }
}

/// Site-level or candidate-level aggregate, unique by (site, normalized
/// name) (§4.F).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteAggregate {
    pub site: String,
    pub name: String,
    pub count: u64,
    pub mean_sentiment: f64,
}
