//! Default values used across the engine, kept in one place to avoid magic
//! numbers scattered through the crawler/scheduler/extractor modules.

/// Fixed crawler user agent (§6 "HTTP fetching").
pub const DEFAULT_USER_AGENT: &str = "TrendIn";

/// HTTP fetch wall-clock timeout, in seconds (§5 "Timeouts").
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 180;

/// No retry at the scrape layer per §5; kept as a knob for embedders that
/// want one, default off.
pub const DEFAULT_FETCH_RETRIES: u8 = 0;

/// Scheduler main-tick interval, in seconds (§5 "Scheduling model").
pub const DEFAULT_WAIT_FOR_SECS: u64 = 1;

/// Rolling per-day write budget per scheduler (§4.H), carried over from the
/// source's `AsyncService` cadence constants.
pub const DEFAULT_TRANSACTIONS_LIMIT: u32 = 950;

/// Scheduler concurrency cap (§4.H "Concurrency limit").
pub const DEFAULT_CONCURRENT_REQUESTS_LIMIT: usize = 2;

/// Entity Dictionary hit/miss cache capacity before a flush-on-full clear
/// (§4.D).
pub const DEFAULT_DICTIONARY_CACHE_CAPACITY: usize = 120;

/// Title-mention weight in the suggested-entities ranking (§4.E step 5).
pub const TITLE_WEIGHT: u32 = 2;

/// Multiplier applied to true entities over mere candidates in the
/// suggested-entities ranking (§4.E step 5).
pub const ENTITIES_OVER_CANDIDATES_WEIGHT: u32 = 2;

/// AFINN sentiment calibration constant `K` in `s(m) = 2*sigma(K*m) - 1`
/// (§4.E.1).
pub const SENTIMENT_CALIBRATION_PARAMETER: f64 = 2.0;

/// Sentences shorter than this many characters are skipped entirely
/// (§4.E step 3).
pub const MIN_SENTENCE_LEN: usize = 3;

/// Minimum character length for a chunked entity candidate to be looked up
/// (§4.E step 3.a).
pub const MIN_CANDIDATE_LEN: usize = 2;

/// Minimum character length for a highlighted-string candidate to be looked
/// up (§4.E step 3.b).
pub const MIN_HIGHLIGHT_LEN: usize = 2;

/// Abbreviations the sentence splitter does not treat as sentence
/// boundaries (§4.E step 2).
pub const SENTENCE_ABBREVIATIONS: &[&str] = &["dr", "vs", "mr", "mrs", "prof", "inc"];

/// Content-types accepted as RSS/Atom feeds by `is_rss` (§4.C).
pub const FEED_CONTENT_TYPES: &[&str] = &[
    "application/rss+xml",
    "application/atom+xml",
    "application/rss",
    "application/atom",
    "application/rdf+xml",
    "application/rdf",
    "text/rss+xml",
    "text/atom+xml",
    "text/rss",
    "text/atom",
    "text/rdf",
    "text/xml",
    "application/xml",
];

/// Visible tags the Soup scraper pulls body text from (§4.C "Soup-style").
pub const SOUP_VISIBLE_TAGS: &[&str] = &[
    "p", "div", "article", "aside", "figcaption", "main", "nav", "section", "span", "li", "td",
    "blockquote", "h1", "h2", "h3", "h4", "h5", "h6",
];

/// Tags whose text pieces are tagged with their own identity as a
/// "grouping parent" so adjacent pieces under the same parent merge
/// (§4.C "Soup-style").
pub const SOUP_GROUPING_TAGS: &[&str] =
    &["p", "div", "article", "aside", "figcaption", "main", "nav", "section"];

/// Small whitelist of tags eligible to produce inline highlights, subject
/// to the ≤ 5 words cap (§4.C "Soup-style").
pub const SOUP_SEMANTIC_TAGS: &[&str] = &["strong", "em", "b", "i", "mark", "q"];

/// Junk-cutoff ratio: a text piece shorter than this fraction of the
/// longest piece on the page is discarded (§4.C "Soup-style").
pub const SOUP_JUNK_CUTOFF_RATIO: f64 = 0.30;

/// Max word count for a text node to qualify as an inline highlight
/// (§4.C "Soup-style").
pub const SOUP_HIGHLIGHT_MAX_WORDS: usize = 5;
