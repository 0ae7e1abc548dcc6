//! Noun-phrase / named-entity chunking (§4.E step 3.a). `spec.md` treats
//! the tagger/chunker as an assumed library primitive; no such crate
//! exists in the retrieval pack, so this module supplies one concrete,
//! dependency-free implementation behind the [`Chunker`] trait (see
//! DESIGN.md for the grounding of this choice).

/// A sentence split into named-entity candidate spans and the residual
/// text used for sentiment scoring (the chunker's "non-chunk leaves",
/// §4.E step 3.a).
pub struct ChunkResult {
    pub candidates: Vec<String>,
    pub residue: String,
}

pub trait Chunker: Send + Sync {
    fn chunk(&self, sentence: &str) -> ChunkResult;
}

/// Words that commonly open a sentence without being proper-noun evidence;
/// capitalization of the sentence's first token is ignored when it's one
/// of these.
const SENTENCE_INITIAL_STOPWORDS: &[&str] = &[
    "the", "a", "an", "this", "that", "these", "those", "it", "they", "he", "she", "we", "i",
    "you", "his", "her", "their", "its", "in", "on", "at", "for", "with", "as", "but", "and",
    "or", "if", "when", "while", "after", "before", "since", "there",
];

fn tokenize(sentence: &str) -> Vec<&str> {
    sentence
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|t| !t.is_empty())
        .collect()
}

fn is_capitalized(token: &str) -> bool {
    token.chars().next().map(|c| c.is_uppercase()).unwrap_or(false)
}

/// Maximal runs of capitalized tokens (ignoring a stoplisted sentence-
/// initial token) are treated as named-entity candidates, mirroring the
/// "chunk is a span of leaves" shape `nltk.ne_chunk` hands back, without
/// depending on an actual POS tagger.
pub struct CapitalizedSpanChunker;

impl Chunker for CapitalizedSpanChunker {
    fn chunk(&self, sentence: &str) -> ChunkResult {
        let tokens = tokenize(sentence);
        let mut candidates = Vec::new();
        let mut residue_tokens: Vec<&str> = Vec::new();
        let mut run: Vec<&str> = Vec::new();

        let flush = |run: &mut Vec<&str>, candidates: &mut Vec<String>, residue: &mut Vec<&str>| {
            if run.is_empty() {
                return;
            }
            let span = run.join(" ");
            if span.chars().count() >= 2 {
                candidates.push(span);
            } else {
                residue.extend(run.iter());
            }
            run.clear();
        };

        for (idx, token) in tokens.iter().enumerate() {
            let sentence_initial_stopword =
                idx == 0 && SENTENCE_INITIAL_STOPWORDS.contains(&token.to_lowercase().as_str());
            if is_capitalized(token) && !sentence_initial_stopword {
                run.push(token);
            } else {
                flush(&mut run, &mut candidates, &mut residue_tokens);
                residue_tokens.push(token);
            }
        }
        flush(&mut run, &mut candidates, &mut residue_tokens);

        ChunkResult {
            candidates,
            residue: residue_tokens.join(" "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalized_run_is_a_candidate() {
        let result = CapitalizedSpanChunker.chunk("Barack Obama visited Paris yesterday");
        assert!(result.candidates.contains(&"Barack Obama".to_string()));
        assert!(result.candidates.contains(&"Paris".to_string()));
    }

    #[test]
    fn sentence_initial_stopword_is_not_a_candidate() {
        let result = CapitalizedSpanChunker.chunk("The cat sat on the mat");
        assert!(result.candidates.is_empty());
    }

    #[test]
    fn single_letter_spans_go_to_residue() {
        let result = CapitalizedSpanChunker.chunk("A B went home");
        assert!(result.candidates.is_empty() || !result.candidates.contains(&"A".to_string()));
    }
}
