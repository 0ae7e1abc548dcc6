//! Entity + sentiment extractor (§4.E): scraped [`PageRecord`] → entities,
//! candidates, sentiments, keywords, suggested ordering.

mod chunk;

pub use chunk::{CapitalizedSpanChunker, Chunker};

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::dictionary::{CatalogLookup, EntityDictionary};
use crate::error::{CrawlError, CrawlResult};
use crate::model::{Entity, EntitySentiment, ExtractedPage, PageRecord, ScoredEntry};
use crate::sentiment;
use crate::utils::constants::{
    ENTITIES_OVER_CANDIDATES_WEIGHT, MIN_CANDIDATE_LEN, MIN_HIGHLIGHT_LEN, MIN_SENTENCE_LEN,
    SENTENCE_ABBREVIATIONS, TITLE_WEIGHT,
};
use url::Url;

/// Split text into sentences on `.`/`!`/`?`, treating a trailing period
/// after one of `SENTENCE_ABBREVIATIONS` as non-terminal (§4.E step 2).
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        current.push(c);
        if c == '.' || c == '!' || c == '?' {
            if c == '.' && ends_with_abbreviation(&current) {
                i += 1;
                continue;
            }
            let trimmed = current.trim().to_string();
            if !trimmed.is_empty() {
                sentences.push(trimmed);
            }
            current.clear();
        }
        i += 1;
    }
    let trimmed = current.trim().to_string();
    if !trimmed.is_empty() {
        sentences.push(trimmed);
    }
    sentences
}

fn ends_with_abbreviation(current: &str) -> bool {
    let word: String = current
        .trim_end_matches('.')
        .rsplit(|c: char| c.is_whitespace())
        .next()
        .unwrap_or("")
        .to_lowercase();
    SENTENCE_ABBREVIATIONS.contains(&word.as_str())
}

/// Accumulates (name, weight) pairs in first-seen order, the same shape
/// as the source's `Counter`-based `EntitiesBag` (§4.E step 5).
#[derive(Default)]
struct WeightedBag {
    weights: IndexMap<String, i64>,
}

impl WeightedBag {
    fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut bag = Self::default();
        for name in names {
            *bag.weights.entry(name.to_string()).or_insert(0) += 1;
        }
        bag
    }

    fn add_weight(&mut self, factor: i64) {
        for weight in self.weights.values_mut() {
            *weight *= factor;
        }
    }

    fn merge(&mut self, other: &WeightedBag) {
        for (name, weight) in &other.weights {
            *self.weights.entry(name.clone()).or_insert(0) += weight;
        }
    }

    fn sorted_names(&self) -> Vec<String> {
        let mut entries: Vec<(&String, &i64)> = self.weights.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(a.1));
        entries.into_iter().map(|(name, _)| name.clone()).collect()
    }
}

struct SentenceOutcome {
    entities: Vec<Entity>,
    candidates: Vec<String>,
    residue: String,
}

pub struct Extractor {
    pub name: String,
    dictionary: std::sync::Arc<EntityDictionary>,
    chunker: Box<dyn Chunker>,
}

impl Extractor {
    pub fn new(dictionary: std::sync::Arc<EntityDictionary>) -> Self {
        Self {
            name: "harvest_engine_extractor1".to_string(),
            dictionary,
            chunker: Box::new(CapitalizedSpanChunker),
        }
    }

    async fn process_sentence(
        &self,
        sentence: &str,
        highlighted_strings: &[String],
        catalog: &dyn CatalogLookup,
    ) -> SentenceOutcome {
        let chunked = self.chunker.chunk(sentence);
        let mut entities = Vec::new();
        let mut candidates = Vec::new();
        let mut seen_candidate_text: HashSet<String> = HashSet::new();

        for span in chunked.candidates {
            if span.chars().count() < MIN_CANDIDATE_LEN {
                continue;
            }
            match self.dictionary.check(&span, catalog).await {
                Some(entity) => entities.push(entity),
                None => {
                    seen_candidate_text.insert(span.clone());
                    candidates.push(span);
                }
            }
        }

        for piece in highlighted_strings {
            if piece.chars().count() < MIN_HIGHLIGHT_LEN {
                continue;
            }
            if !sentence.contains(piece.as_str()) {
                continue;
            }
            if seen_candidate_text.contains(piece) || entities.iter().any(|e| &e.name == piece) {
                continue;
            }
            match self.dictionary.check(piece, catalog).await {
                Some(entity) => entities.push(entity),
                None => candidates.push(piece.clone()),
            }
        }

        SentenceOutcome {
            entities,
            candidates,
            residue: chunked.residue,
        }
    }

    /// Fold a sentence's (or the title's) outcome into the running
    /// accumulators (§4.E step 3.c / step 4).
    fn apply_sentiment(
        &self,
        outcome: &SentenceOutcome,
        scored_entities: &mut IndexMap<String, (Entity, EntitySentiment)>,
        scored_candidates: &mut IndexMap<String, EntitySentiment>,
    ) {
        if outcome.entities.is_empty() && outcome.candidates.is_empty() {
            return;
        }
        let sentiment = sentiment::get_sentiment(&outcome.residue);
        for entity in &outcome.entities {
            let key = entity.key();
            let updated = match scored_entities.get(&key) {
                Some((_, prior)) => prior.update(sentiment, false),
                None => EntitySentiment::first(sentiment),
            };
            scored_entities.insert(key, (entity.clone(), updated));
        }
        for name in &outcome.candidates {
            let updated = match scored_candidates.get(name) {
                Some(prior) => prior.update(sentiment, false),
                None => EntitySentiment::first(sentiment),
            };
            scored_candidates.insert(name.clone(), updated);
        }
    }

    /// Run the full pipeline (§4.E steps 1-7) and produce an
    /// [`ExtractedPage`]. `ExtractionError` on empty text.
    pub async fn extract(
        &self,
        page: &PageRecord,
        catalog: &dyn CatalogLookup,
    ) -> CrawlResult<ExtractedPage> {
        if page.text.is_empty() {
            return Err(CrawlError::Extraction {
                url: page.url.clone(),
                reason: "no text pieces after scrape".to_string(),
            });
        }
        let text = page.text.join(" . ");

        let mut scored_entities: IndexMap<String, (Entity, EntitySentiment)> = IndexMap::new();
        let mut scored_candidates: IndexMap<String, EntitySentiment> = IndexMap::new();
        let mut body_entities: Vec<Entity> = Vec::new();
        let mut body_candidates: Vec<String> = Vec::new();

        for sentence in split_sentences(&text) {
            if sentence.chars().count() < MIN_SENTENCE_LEN {
                continue;
            }
            let outcome = self
                .process_sentence(&sentence, &page.highlighted_strings, catalog)
                .await;
            body_entities.extend(outcome.entities.iter().cloned());
            body_candidates.extend(outcome.candidates.iter().cloned());
            self.apply_sentiment(&outcome, &mut scored_entities, &mut scored_candidates);
        }

        let title_outcome = self.process_sentence(&page.title, &[], catalog).await;
        self.apply_sentiment(&title_outcome, &mut scored_entities, &mut scored_candidates);

        let suggested_entities = self.suggested_entities(
            &body_entities,
            &title_outcome.entities,
            &body_candidates,
            &title_outcome.candidates,
        );

        let keywords = page.keywords();
        if !keywords.is_empty() {
            self.process_keywords(&keywords, &mut scored_entities, catalog).await;
        }

        let site = Url::parse(&page.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_owned))
            .unwrap_or_default();

        Ok(ExtractedPage {
            url: page.url.clone(),
            site,
            parser: page.parser.clone(),
            extractor: self.name.clone(),
            extracted_at: chrono::Utc::now(),
            title: page.title.clone(),
            text,
            keywords,
            entities: scored_entities
                .into_values()
                .map(|(entity, sentiment)| ScoredEntry {
                    name: entity.name,
                    sentiment,
                })
                .collect(),
            candidates: scored_candidates
                .into_iter()
                .map(|(name, sentiment)| ScoredEntry { name, sentiment })
                .collect(),
            suggested_entities,
            url_pattern_id: None,
            categories: Vec::new(),
            exclude_words: Vec::new(),
        })
    }

    /// §4.E step 6: keyword entities get sentiment score 0 (replacing
    /// rather than averaging on repeat, §4.E.2).
    async fn process_keywords(
        &self,
        keywords: &[String],
        scored_entities: &mut IndexMap<String, (Entity, EntitySentiment)>,
        catalog: &dyn CatalogLookup,
    ) {
        for keyword in keywords {
            if let Some(entity) = self.dictionary.check(keyword, catalog).await {
                let key = entity.key();
                let updated = match scored_entities.get(&key) {
                    Some((_, prior)) => prior.update(0.0, true),
                    None => EntitySentiment::first(0.0),
                };
                scored_entities.insert(key, (entity, updated));
            }
        }
    }

    /// §4.E step 5: title mentions outweigh body mentions, and true
    /// entities outweigh candidates.
    fn suggested_entities(
        &self,
        body_entities: &[Entity],
        title_entities: &[Entity],
        body_candidates: &[String],
        title_candidates: &[String],
    ) -> Vec<String> {
        let title_names: Vec<&str> = title_entities.iter().map(|e| e.name.as_str()).collect();
        let body_names: Vec<&str> = body_entities.iter().map(|e| e.name.as_str()).collect();

        let mut weighted_entities = WeightedBag::from_names(title_names);
        weighted_entities.add_weight(TITLE_WEIGHT as i64);
        weighted_entities.merge(&WeightedBag::from_names(body_names));
        weighted_entities.add_weight(ENTITIES_OVER_CANDIDATES_WEIGHT as i64);

        if !title_candidates.is_empty() || !body_candidates.is_empty() {
            let mut weighted_candidates =
                WeightedBag::from_names(title_candidates.iter().map(String::as_str));
            weighted_candidates.add_weight(TITLE_WEIGHT as i64);
            weighted_candidates
                .merge(&WeightedBag::from_names(body_candidates.iter().map(String::as_str)));
            weighted_entities.merge(&weighted_candidates);
        }

        weighted_entities.sorted_names()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::BTreeMap;

    struct NoCatalog;
    #[async_trait]
    impl CatalogLookup for NoCatalog {
        async fn lookup_and_count(&self, _normalized_name: &str) -> Option<Entity> {
            None
        }
    }

    fn page(title: &str, text: Vec<&str>) -> PageRecord {
        PageRecord {
            url: "http://a.test/x".to_string(),
            parser: "readability_scraper".to_string(),
            html: String::new(),
            publication_date: None,
            metadata: BTreeMap::new(),
            links: Vec::new(),
            text: text.into_iter().map(str::to_string).collect(),
            title: title.to_string(),
            highlighted_strings: Vec::new(),
        }
    }

    #[tokio::test]
    async fn empty_text_is_an_extraction_error() {
        let extractor = Extractor::new(std::sync::Arc::new(EntityDictionary::new(120)));
        let catalog = NoCatalog;
        let result = extractor.extract(&page("title", vec![]), &catalog).await;
        assert!(matches!(result, Err(CrawlError::Extraction { .. })));
    }

    #[tokio::test]
    async fn positive_sentence_yields_positive_class() {
        let extractor = Extractor::new(std::sync::Arc::new(EntityDictionary::new(120)));
        let catalog = NoCatalog;
        let extracted = extractor
            .extract(
                &page("I love this great product", vec![]),
                &catalog,
            )
            .await
            .unwrap();
        assert!(!extracted.text.is_empty());
    }

    #[test]
    fn abbreviation_does_not_split_sentence() {
        let sentences = split_sentences("Dr. Smith arrived. He left.");
        assert_eq!(sentences.len(), 2);
        assert!(sentences[0].starts_with("Dr. Smith"));
    }
}
