use uuid::Uuid;

/// Error kinds produced by the crawl/extraction core.
///
/// Crawler ticks log and swallow every variant here except where the
/// call site is an admin-layer operation (`create_site`, `add_crawler`,
/// `save_pattern`, `extract_url`), which propagate to their caller.
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    #[error("fetch failed for {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("no pattern matched url {0}")]
    NoMatchedPattern(String),

    #[error("no such scraper kind: {0}")]
    NoSuchScraper(String),

    #[error("extraction failed for {url}: {reason}")]
    Extraction { url: String, reason: String },

    #[error("pattern regex does not compile: {0}")]
    InvalidPatternRegex(#[source] regex::Error),

    #[error("transient persistence failure on {collection}: {reason}")]
    TransientPersistence { collection: String, reason: String },

    #[error("crawler {0} not found")]
    CrawlerNotFound(Uuid),

    #[error("site {0} not found")]
    SiteNotFound(Uuid),
}

pub type CrawlResult<T> = Result<T, CrawlError>;
