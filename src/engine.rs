//! Admin-facing facade (§6 "CLI / admin surface"). `Engine` owns a `Store`
//! and a `Scheduler` and exposes the four programmatic operations an admin
//! layer calls: `create_site`, `add_crawler`, `save_pattern`,
//! `extract_url`. These are the crate's only public write entry points
//! besides the scheduler's own tick loop.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{CrawlError, CrawlResult};
use crate::model::{
    Crawler, CrawlerId, CrawlerKind, CrawlerStatus, ExtractedPage, PatternId, ScraperKind, Site,
    SiteId, UrlPattern,
};
use crate::patterns::{self, UrlPatternSet};
use crate::scheduler::Scheduler;
use crate::scraper::Scraper;
use crate::store::Store;
use crate::utils::hostname_of;

/// Options accepted by `extract_url` (§6).
#[derive(Debug, Clone, Default)]
pub struct ExtractUrlOptions {
    pub save: bool,
    pub keep_candidates: bool,
    pub db_lookup: bool,
    pub must_match_pattern: bool,
}

pub struct Engine<S: Store> {
    store: Arc<S>,
    scheduler: Arc<Scheduler<S>>,
    user_agent: String,
    fetch_timeout: Duration,
}

impl<S: Store + 'static> Engine<S> {
    pub fn new(store: Arc<S>, scheduler: Arc<Scheduler<S>>, user_agent: String, fetch_timeout: Duration) -> Self {
        Self {
            store,
            scheduler,
            user_agent,
            fetch_timeout,
        }
    }

    /// `create-site` (§6): publisher, name, url, category → Site.
    pub async fn create_site(
        &self,
        publisher: &str,
        name: &str,
        url: &str,
        category: &str,
    ) -> CrawlResult<Site> {
        let hostname = hostname_of(url).ok_or_else(|| CrawlError::Extraction {
            url: url.to_string(),
            reason: "seed url has no hostname".to_string(),
        })?;
        let site = Site::new(publisher.to_string(), name.to_string(), hostname, category.to_string());
        self.store.save_site(site.clone()).await?;
        Ok(site)
    }

    /// `add-crawler` (§6): site-id, kind, start-url, url-pattern,
    /// categories, frequency, max-age, scraper-kind, status → Crawler, or
    /// a regex-compile error if `url_pattern` is given and invalid.
    #[allow(clippy::too_many_arguments)]
    pub async fn add_crawler(
        &self,
        site_id: SiteId,
        kind: CrawlerKind,
        start_url: &str,
        url_pattern: Option<&str>,
        categories: Vec<String>,
        frequency_secs: i64,
        max_age_secs: i64,
        scraper_kind: ScraperKind,
        status: CrawlerStatus,
    ) -> CrawlResult<Crawler> {
        let mut site = self
            .store
            .get_site(site_id)
            .await?
            .ok_or(CrawlError::SiteNotFound(site_id.0))?;

        let mut crawler = Crawler::new(site_id, start_url.to_string(), kind, scraper_kind, frequency_secs, max_age_secs);
        crawler.status = status;

        if let Some(regex_source) = url_pattern {
            let pattern = UrlPattern {
                id: PatternId::new(),
                crawler_id: crawler.id,
                hostname: site.hostname.clone(),
                regex_source: regex_source.to_string(),
                harvester_categories: categories,
                exclude_words: Vec::new(),
                ad_script: String::new(),
                is_default: true,
            };
            // Validates compilation before anything is persisted (§7
            // "InvalidPatternRegex ... no side effects").
            let mut probe = UrlPatternSet::new(crawler.id);
            let pattern_id = probe.save(pattern.clone(), true)?;
            self.store.save_pattern(pattern).await?;
            crawler.default_pattern_id = Some(pattern_id);
        }

        self.store.save_crawler(crawler.clone()).await?;
        site.crawler_ids.push(crawler.id);
        self.store.save_site(site).await?;

        if matches!(crawler.status, CrawlerStatus::Enabled) {
            self.scheduler.enroll(crawler.clone()).await?;
        }

        Ok(crawler)
    }

    /// `save-pattern` (§6): upsert a pattern for a crawler, returning its
    /// id; promotes to default per the crawler's current default state or
    /// an explicit request (§4.A `save`).
    pub async fn save_pattern(
        &self,
        crawler_id: CrawlerId,
        regex_source: &str,
        categories: Vec<String>,
        exclude_words: Vec<String>,
        ad_script: &str,
        is_default: bool,
    ) -> CrawlResult<PatternId> {
        let crawler = self
            .store
            .get_crawler(crawler_id)
            .await?
            .ok_or(CrawlError::CrawlerNotFound(crawler_id.0))?;
        let site = self
            .store
            .get_site(crawler.site_id)
            .await?
            .ok_or(CrawlError::SiteNotFound(crawler.site_id.0))?;

        let existing = self.store.patterns_for_crawler(crawler_id).await?;
        let mut set = UrlPatternSet::new(crawler_id);
        for pattern in existing {
            let is_default = pattern.is_default;
            set.save(pattern, is_default)?;
        }

        let pattern = UrlPattern {
            id: PatternId::new(),
            crawler_id,
            hostname: site.hostname,
            regex_source: regex_source.to_string(),
            harvester_categories: categories,
            exclude_words,
            ad_script: ad_script.to_string(),
            is_default,
        };
        let id = set.save(pattern.clone(), is_default)?;
        let mut persisted = pattern;
        persisted.is_default = set
            .patterns()
            .find(|p| p.id == id)
            .map(|p| p.is_default)
            .unwrap_or(is_default);
        self.store.save_pattern(persisted).await?;
        Ok(id)
    }

    /// `extract-url` (§6): ad-hoc extraction of an arbitrary URL, outside
    /// any crawler's own tick loop. `must_match_pattern` surfaces
    /// `NoMatchedPatternError` if no site's pattern set matches.
    pub async fn extract_url(
        &self,
        url: &str,
        options: ExtractUrlOptions,
    ) -> CrawlResult<ExtractedPage> {
        let all_patterns = self.store.all_patterns().await?;
        let mut sets: std::collections::HashMap<CrawlerId, UrlPatternSet> = std::collections::HashMap::new();
        for pattern in all_patterns {
            let set = sets.entry(pattern.crawler_id).or_insert_with(|| UrlPatternSet::new(pattern.crawler_id));
            let is_default = pattern.is_default;
            set.save(pattern, is_default)?;
        }
        let refs: Vec<&UrlPatternSet> = sets.values().collect();
        let profile = patterns::arbitrary_match(&refs, url);

        if options.must_match_pattern && profile.is_none() {
            return Err(CrawlError::NoMatchedPattern(url.to_string()));
        }

        let scraper = Scraper::new(ScraperKind::Readability, &self.user_agent, self.fetch_timeout)?;
        let page = scraper.scrape(url).await?;

        let extractor = crate::extractor::Extractor::new(self.scheduler.dictionary().clone());
        let mut extracted = extractor.extract(&page, self.store.as_ref()).await?;

        if let Some(profile) = profile {
            extracted.url_pattern_id = Some(profile.pattern_id);
            extracted.categories = profile.categories;
            extracted.exclude_words = profile.exclude_words;
        }
        if !options.keep_candidates {
            extracted.candidates.clear();
        }

        if options.save {
            self.store.upsert_extracted_page(extracted.clone()).await?;
        }

        Ok(extracted)
    }
}
