use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{CrawlerId, PatternId, SiteId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrawlerKind {
    Links,
    Sitemap,
    Rss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrawlerStatus {
    Disabled,
    Enabled,
}

/// Runtime state the fleet scheduler cycles a crawler instance through.
/// Distinct from `CrawlerStatus`, which is the operator-facing enabled flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuntimeStatus {
    Stopped,
    Running,
    Paused,
}

/// The scraper variant a crawler uses for its pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScraperKind {
    Soup,
    Newspaper,
    Readability,
}

impl Default for ScraperKind {
    fn default() -> Self {
        // Readability is the default when no scraper is specified (§4.C).
        ScraperKind::Readability
    }
}

/// Persisted crawler configuration. At most one `default_pattern_id` per
/// crawler; if set it must reference a `UrlPattern` owned by this crawler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crawler {
    pub id: CrawlerId,
    pub site_id: SiteId,
    pub start_url: String,
    pub scraper_kind: ScraperKind,
    pub crawler_kind: CrawlerKind,
    pub max_age_secs: i64,
    pub frequency_secs: i64,
    pub status: CrawlerStatus,
    pub runtime_status: RuntimeStatus,
    pub crawled_count: u64,
    pub default_pattern_id: Option<PatternId>,
}

/// Mutable per-tick runtime bookkeeping that lives alongside a `Crawler`
/// instance in the scheduler, not in the persisted record (§4.G).
#[derive(Debug, Clone, Default)]
pub struct CrawlerRuntime {
    pub start_url_last_crawled_at: Option<DateTime<Utc>>,
    pub on_pause: bool,
}

impl Crawler {
    pub fn new(
        site_id: SiteId,
        start_url: String,
        crawler_kind: CrawlerKind,
        scraper_kind: ScraperKind,
        frequency_secs: i64,
        max_age_secs: i64,
    ) -> Self {
        Self {
            id: CrawlerId::new(),
            site_id,
            start_url,
            scraper_kind,
            crawler_kind,
            max_age_secs,
            frequency_secs,
            status: CrawlerStatus::Enabled,
            runtime_status: RuntimeStatus::Stopped,
            crawled_count: 0,
            default_pattern_id: None,
        }
    }
}
