//! Per-site Crawler (§4.G): composition of the URL Pattern Set (§4.A), the
//! Frontier (§4.B), and a Scraper (§4.C) for one site, owning fetch cadence
//! and pause state. Three kinds (`links`, `sitemap`, `rss`) share this
//! composition and differ only in how the frontier is regenerated and how
//! discovered links are ingested, matching the shared-base/kind-specific
//! split in `original_source/.../crawlers/__init__.py::CrawlerClass`.

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::frontier::{AgeOracle, Frontier};
use crate::model::{Crawler, CrawlerKind, CrawlerRuntime, PageRecord, RuntimeStatus};
use crate::patterns::UrlPatternSet;
use crate::scraper::Scraper;

/// One running crawler instance in the fleet. `crawler` carries the
/// persisted config/counters; `runtime` is the in-scheduler-only
/// bookkeeping (§4.G "Mutable per-tick runtime bookkeeping").
pub struct CrawlerInstance {
    pub crawler: RwLock<Crawler>,
    pub frontier: Frontier,
    pub patterns: RwLock<UrlPatternSet>,
    pub scraper: Scraper,
    pub runtime: RwLock<CrawlerRuntime>,
}

impl CrawlerInstance {
    pub fn new(crawler: Crawler, patterns: UrlPatternSet, scraper: Scraper) -> Self {
        let frontier = Frontier::new(crawler.start_url.clone());
        Self {
            crawler: RwLock::new(crawler),
            frontier,
            patterns: RwLock::new(patterns),
            scraper,
            runtime: RwLock::new(CrawlerRuntime::default()),
        }
    }

    pub async fn id(&self) -> crate::model::CrawlerId {
        self.crawler.read().await.id
    }

    pub async fn is_on_pause(&self) -> bool {
        self.runtime.read().await.on_pause
    }

    pub async fn resume_if_due(&self, now: DateTime<Utc>) -> bool {
        let mut runtime = self.runtime.write().await;
        let mut crawler = self.crawler.write().await;
        if self.cadence_met(&runtime, &crawler, now) {
            runtime.on_pause = false;
            crawler.runtime_status = RuntimeStatus::Running;
            true
        } else {
            false
        }
    }

    fn cadence_met(&self, runtime: &CrawlerRuntime, crawler: &Crawler, now: DateTime<Utc>) -> bool {
        match runtime.start_url_last_crawled_at {
            None => true,
            Some(last) => now >= last + chrono::Duration::seconds(crawler.frequency_secs),
        }
    }

    /// The cadence gate shared by `generate()` (links/sitemap, and before
    /// RSS regenerates) and `crawl_page()`'s explicit start-url check
    /// (§4.G "Pause/resume and cadence"). On success, records
    /// `start_url_last_crawled_at = now`; on failure, pauses the crawler.
    async fn gate_on_cadence(&self, now: DateTime<Utc>) -> bool {
        let mut runtime = self.runtime.write().await;
        let mut crawler = self.crawler.write().await;
        if self.cadence_met(&runtime, &crawler, now) {
            runtime.start_url_last_crawled_at = Some(now);
            true
        } else {
            runtime.on_pause = true;
            crawler.runtime_status = RuntimeStatus::Paused;
            false
        }
    }

    /// Kind-specific regeneration, invoked by the Frontier when its set is
    /// empty (§4.B step 2, §4.G "generate()").
    async fn generate(&self, now: DateTime<Utc>) -> Option<String> {
        let kind = self.crawler.read().await.crawler_kind;
        match kind {
            CrawlerKind::Links | CrawlerKind::Sitemap => {
                // Both kinds return the start URL unconditionally; sitemap
                // is a structurally-identical placeholder in the source
                // (§4.G). The cadence gate lives solely in `crawl_page`'s
                // start-url check below — gating here too would fire twice
                // for the same `now` and always lose.
                Some(self.frontier.start_url.clone())
            }
            CrawlerKind::Rss => self.generate_rss(now).await,
        }
    }

    /// RSS `generate()` (§4.G): enforces cadence first, then fetches the
    /// feed, pops one entry as the immediate next URL and pushes the
    /// rest into the frontier. The popped entry is never re-inserted —
    /// preserved as-is (§9 Open Questions).
    async fn generate_rss(&self, now: DateTime<Utc>) -> Option<String> {
        if !self.gate_on_cadence(now).await {
            return None;
        }
        let feed_url = self.frontier.start_url.clone();
        let raw = self.scraper.fetch_raw(&feed_url).await.ok()?;
        let feed = feed_rs::parser::parse(raw.as_bytes()).ok()?;
        let mut links: Vec<String> = feed
            .entries
            .into_iter()
            .filter_map(|entry| entry.links.into_iter().next().map(|l| l.href))
            .collect();
        let first = links.pop()?;
        for link in links {
            self.frontier.push(&link).await;
        }
        Some(first)
    }

    /// `crawl_page()` state machine (§4.G): pull → cadence check on the
    /// start URL → html check → scrape → link ingestion.
    pub async fn crawl_page(&self, age_oracle: &dyn AgeOracle) -> Option<PageRecord> {
        let now = Utc::now();
        let url = self
            .frontier
            .get_next(age_oracle, now, || self.generate(now))
            .await?;

        let start_url = self.frontier.start_url.clone();
        if url == start_url {
            tracing::debug!(url = %url, "start url reached");
            if !self.gate_on_cadence(now).await {
                return None;
            }
        }

        if !self.scraper.is_html(&url).await {
            tracing::debug!(url = %url, "skipping non-html url");
            return None;
        }

        let kind = self.crawler.read().await.crawler_kind;
        let page = match kind {
            CrawlerKind::Rss => self.scraper.scrape_rss(&url).await,
            CrawlerKind::Links | CrawlerKind::Sitemap => self.scraper.scrape(&url).await,
        };
        let page = match page {
            Ok(page) => page,
            Err(err) => {
                tracing::warn!(url = %url, error = %err, "scrape failed, skipping");
                return None;
            }
        };

        if !matches!(kind, CrawlerKind::Rss) {
            self.process_links(&page.links).await;
        }

        {
            let mut crawler = self.crawler.write().await;
            crawler.crawled_count += 1;
        }

        Some(page)
    }

    /// Validate discovered links against the pattern set and push the
    /// valid ones into the frontier (§4.G `process-links`).
    async fn process_links(&self, links: &[String]) {
        let patterns = self.patterns.read().await;
        for link in links {
            if patterns.validate(link) {
                self.frontier.push(link).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PatternId, ScraperKind, UrlPattern};
    use async_trait::async_trait;
    use std::time::Duration;

    struct NeverFresh;
    #[async_trait]
    impl AgeOracle for NeverFresh {
        async fn is_fresh(&self, _url: &str, _now: DateTime<Utc>) -> Option<crate::model::CrawledPage> {
            None
        }
    }

    fn links_crawler(start_url: &str, frequency_secs: i64) -> CrawlerInstance {
        let crawler = Crawler::new(
            crate::model::SiteId::new(),
            start_url.to_string(),
            CrawlerKind::Links,
            ScraperKind::Readability,
            frequency_secs,
            300,
        );
        let crawler_id = crawler.id;
        let mut patterns = UrlPatternSet::new(crawler_id);
        patterns
            .save(
                UrlPattern {
                    id: PatternId::new(),
                    crawler_id,
                    hostname: "a.test".to_string(),
                    regex_source: r"^http://a\.test/articles/.*$".to_string(),
                    harvester_categories: vec!["news".to_string()],
                    exclude_words: vec![],
                    ad_script: String::new(),
                    is_default: false,
                },
                true,
            )
            .unwrap();
        let scraper = Scraper::new(ScraperKind::Readability, "test-agent", Duration::from_secs(5)).unwrap();
        CrawlerInstance::new(crawler, patterns, scraper)
    }

    #[tokio::test]
    async fn start_url_cadence_pauses_and_resumes() {
        let instance = links_crawler("http://a.test/", 60);
        let oracle = NeverFresh;

        // generate() is only reached once the frontier is empty; force
        // that here directly rather than via a live fetch.
        assert!(instance.gate_on_cadence(Utc::now()).await);
        assert!(!instance.gate_on_cadence(Utc::now()).await);
        assert!(instance.is_on_pause().await);

        let later = Utc::now() + chrono::Duration::seconds(61);
        assert!(instance.resume_if_due(later).await);
        assert!(!instance.is_on_pause().await);
    }

    #[tokio::test]
    async fn process_links_only_pushes_validated_urls() {
        let instance = links_crawler("http://a.test/", 60);
        instance
            .process_links(&[
                "http://a.test/articles/1".to_string(),
                "http://a.test/about".to_string(),
            ])
            .await;
        assert!(!instance.frontier.is_empty().await);
        let oracle = NeverFresh;
        let now = Utc::now();
        let mut seen = Vec::new();
        while let Some(url) = instance.frontier.get_next(&oracle, now, || async { None }).await {
            seen.push(url);
        }
        assert_eq!(seen, vec!["http://a.test/articles/1".to_string()]);
    }
}
