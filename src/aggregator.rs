//! Per-site aggregation (§4.F): merge a page's scored entities/candidates
//! into the site's running `SiteAggregate` rows.

use crate::model::{EntitySentiment, ScoredEntry, SiteAggregate};

/// Merge one page's scored entries into the site's prior aggregates.
/// `prior` is looked up by the caller (keyed by (site, name)); `None`
/// means this is the first page to mention that name at this site.
///
/// Entities: a count-weighted mean, except when the incoming score is
/// exactly 0, in which case the prior mean is kept unchanged (only the
/// count advances) — the source's quirk, preserved rather than "fixed"
/// (see DESIGN.md). Candidates: a plain weighted mean, always.
pub fn merge_entity(prior: Option<&SiteAggregate>, site: &str, entry: &ScoredEntry) -> SiteAggregate {
    match prior {
        None => SiteAggregate {
            site: site.to_string(),
            name: entry.name.clone(),
            count: entry.sentiment.count,
            mean_sentiment: entry.sentiment.score,
        },
        Some(existing) => {
            let count = existing.count + entry.sentiment.count;
            let mean_sentiment = if entry.sentiment.score == 0.0 {
                existing.mean_sentiment
            } else {
                (existing.mean_sentiment * existing.count as f64
                    + entry.sentiment.score * entry.sentiment.count as f64)
                    / count as f64
            };
            SiteAggregate {
                site: site.to_string(),
                name: entry.name.clone(),
                count,
                mean_sentiment,
            }
        }
    }
}

/// Weighted-mean merge for candidates (no replace-on-zero quirk).
pub fn merge_candidate(prior: Option<&SiteAggregate>, site: &str, entry: &ScoredEntry) -> SiteAggregate {
    match prior {
        None => SiteAggregate {
            site: site.to_string(),
            name: entry.name.clone(),
            count: entry.sentiment.count,
            mean_sentiment: entry.sentiment.score,
        },
        Some(existing) => {
            let total = existing.count + entry.sentiment.count;
            let mean_sentiment = (existing.mean_sentiment * existing.count as f64
                + entry.sentiment.score * entry.sentiment.count as f64)
                / total as f64;
            SiteAggregate {
                site: site.to_string(),
                name: entry.name.clone(),
                count: total,
                mean_sentiment,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, score: f64, count: u64) -> ScoredEntry {
        ScoredEntry {
            name: name.to_string(),
            sentiment: EntitySentiment {
                score,
                count,
                class: crate::model::SentimentClass::from_score(score),
            },
        }
    }

    #[test]
    fn first_mention_seeds_the_aggregate() {
        let agg = merge_entity(None, "site.test", &entry("Acme", 0.5, 3));
        assert_eq!(agg.count, 3);
        assert_eq!(agg.mean_sentiment, 0.5);
    }

    #[test]
    fn zero_incoming_score_keeps_prior_mean() {
        let prior = merge_entity(None, "site.test", &entry("Acme", 0.5, 3));
        let updated = merge_entity(Some(&prior), "site.test", &entry("Acme", 0.0, 1));
        assert_eq!(updated.mean_sentiment, 0.5);
        assert_eq!(updated.count, 4);
    }

    #[test]
    fn nonzero_incoming_score_is_weighted_into_the_mean() {
        let prior = merge_entity(None, "site.test", &entry("Acme", 0.5, 3));
        let updated = merge_entity(Some(&prior), "site.test", &entry("Acme", -0.2, 2));
        assert!((updated.mean_sentiment - 0.22).abs() < 1e-9);
        assert_eq!(updated.count, 5);
    }

    #[test]
    fn candidate_merge_is_a_weighted_mean() {
        let prior = merge_candidate(None, "site.test", &entry("Maybe Co", 1.0, 1));
        let updated = merge_candidate(Some(&prior), "site.test", &entry("Maybe Co", -1.0, 1));
        assert_eq!(updated.mean_sentiment, 0.0);
        assert_eq!(updated.count, 2);
    }
}
