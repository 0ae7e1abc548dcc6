//! Sentiment scoring (§4.E.1): AFINN-style lexicon + calibrated sigmoid.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::model::SentimentClass;
use crate::utils::constants::SENTIMENT_CALIBRATION_PARAMETER;

/// Embedded AFINN-111 lexicon. This is a representative subset (the data
/// file under `src/data/afinn111.tsv`), not the full 2,477-word table —
/// see DESIGN.md.
static LEXICON: Lazy<HashMap<&'static str, i32>> = Lazy::new(|| {
    include_str!("data/afinn111.tsv")
        .lines()
        .filter_map(|line| {
            let mut parts = line.splitn(2, '\t');
            let term = parts.next()?;
            let score: i32 = parts.next()?.trim().parse().ok()?;
            Some((term, score))
        })
        .collect()
});

static SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W+").unwrap());

fn sigmoid(x: f64) -> f64 {
    let x = x * SENTIMENT_CALIBRATION_PARAMETER;
    (1.0 / (1.0 + (-x).exp())) * 2.0 - 1.0
}

/// Compute sentiment for `text`: split on non-word characters, look up
/// each lower-cased token (miss = 0), drop zeros, average, then map
/// through `s(m) = 2*sigma(K*m) - 1`. Empty input (or all-zero tokens)
/// yields 0 (§4.E.1, §8 law 5).
pub fn get_sentiment(text: &str) -> f64 {
    let lower = text.to_lowercase();
    let scores: Vec<i32> = SPLIT_RE
        .split(&lower)
        .filter_map(|word| LEXICON.get(word).copied())
        .filter(|&s| s != 0)
        .collect();

    if scores.is_empty() {
        return 0.0;
    }
    let mean = scores.iter().sum::<i32>() as f64 / scores.len() as f64;
    sigmoid(mean)
}

pub fn classify(text: &str) -> (SentimentClass, f64) {
    let score = get_sentiment(text);
    (SentimentClass::from_score(score), score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_neutral() {
        assert_eq!(get_sentiment(""), 0.0);
    }

    #[test]
    fn positive_words_score_positive() {
        let score = get_sentiment("I love this great wonderful product");
        assert!(score > 0.0, "expected positive score, got {score}");
        assert!(score < 1.0);
    }

    #[test]
    fn negative_words_score_negative() {
        let score = get_sentiment("this is a terrible awful disaster");
        assert!(score < 0.0, "expected negative score, got {score}");
        assert!(score > -1.0);
    }

    #[test]
    fn range_is_bounded() {
        let score = get_sentiment("love love love excellent amazing wonderful fantastic great");
        assert!(score > -1.0 && score < 1.0);
    }
}
