//! In-memory reference [`Store`](super::Store) implementation. Backs the
//! test suite and doubles as the simplest correct implementation of every
//! narrow store trait.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::CrawlResult;
use crate::model::{
    Crawler, CrawlerId, CrawledPage, EntityCatalogEntry, ExtractedPage, PatternId, Site, SiteId,
    SiteAggregate, UrlPattern,
};
use crate::utils::fold_name;

use super::{CrawlerStore, EntityCatalogStore, ExtractedPageStore, PageStore, PatternStore,
    SiteEntityStore, SiteStore};

#[derive(Default)]
struct Inner {
    pages: HashMap<String, CrawledPage>,
    extracted: HashMap<String, ExtractedPage>,
    entity_aggregates: HashMap<(String, String), SiteAggregate>,
    candidate_aggregates: HashMap<(String, String), SiteAggregate>,
    patterns: HashMap<PatternId, UrlPattern>,
    crawlers: HashMap<CrawlerId, Crawler>,
    sites: HashMap<SiteId, Site>,
    catalog: HashMap<String, EntityCatalogEntry>,
}

/// Reference store backed entirely by in-process `HashMap`s behind a
/// single `RwLock`. Not meant for production use; this is the store the
/// integration tests in `tests/scenarios.rs` run against.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PageStore for MemoryStore {
    async fn save_page(&self, page: CrawledPage) -> CrawlResult<()> {
        self.inner.write().await.pages.insert(page.page.url.clone(), page);
        Ok(())
    }

    async fn get_fresh_page(&self, url: &str, now: DateTime<Utc>) -> Option<CrawledPage> {
        let guard = self.inner.read().await;
        guard
            .pages
            .get(url)
            .filter(|page| page.is_fresh(now))
            .cloned()
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> CrawlResult<u64> {
        let mut guard = self.inner.write().await;
        let before = guard.pages.len();
        guard.pages.retain(|_, page| page.is_fresh(now));
        Ok((before - guard.pages.len()) as u64)
    }
}

#[async_trait]
impl ExtractedPageStore for MemoryStore {
    async fn upsert_extracted_page(&self, page: ExtractedPage) -> CrawlResult<()> {
        self.inner.write().await.extracted.insert(page.url.clone(), page);
        Ok(())
    }

    async fn get_extracted_page(&self, url: &str) -> CrawlResult<Option<ExtractedPage>> {
        Ok(self.inner.read().await.extracted.get(url).cloned())
    }

    async fn list_extracted_pages_for_site(&self, site: &str) -> CrawlResult<Vec<ExtractedPage>> {
        Ok(self
            .inner
            .read()
            .await
            .extracted
            .values()
            .filter(|p| p.site == site)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SiteEntityStore for MemoryStore {
    async fn get_entity_aggregate(&self, site: &str, name: &str) -> CrawlResult<Option<SiteAggregate>> {
        Ok(self
            .inner
            .read()
            .await
            .entity_aggregates
            .get(&(site.to_string(), name.to_string()))
            .cloned())
    }

    async fn upsert_entity_aggregate(&self, aggregate: SiteAggregate) -> CrawlResult<()> {
        let key = (aggregate.site.clone(), aggregate.name.clone());
        self.inner.write().await.entity_aggregates.insert(key, aggregate);
        Ok(())
    }

    async fn get_candidate_aggregate(&self, site: &str, name: &str) -> CrawlResult<Option<SiteAggregate>> {
        Ok(self
            .inner
            .read()
            .await
            .candidate_aggregates
            .get(&(site.to_string(), name.to_string()))
            .cloned())
    }

    async fn upsert_candidate_aggregate(&self, aggregate: SiteAggregate) -> CrawlResult<()> {
        let key = (aggregate.site.clone(), aggregate.name.clone());
        self.inner.write().await.candidate_aggregates.insert(key, aggregate);
        Ok(())
    }
}

#[async_trait]
impl PatternStore for MemoryStore {
    async fn save_pattern(&self, pattern: UrlPattern) -> CrawlResult<PatternId> {
        let id = pattern.id;
        self.inner.write().await.patterns.insert(id, pattern);
        Ok(id)
    }

    async fn patterns_for_crawler(&self, crawler_id: CrawlerId) -> CrawlResult<Vec<UrlPattern>> {
        Ok(self
            .inner
            .read()
            .await
            .patterns
            .values()
            .filter(|p| p.crawler_id == crawler_id)
            .cloned()
            .collect())
    }

    async fn patterns_for_hostname(&self, hostname: &str) -> CrawlResult<Vec<UrlPattern>> {
        let target = crate::utils::strip_www(hostname);
        Ok(self
            .inner
            .read()
            .await
            .patterns
            .values()
            .filter(|p| crate::utils::strip_www(&p.hostname) == target)
            .cloned()
            .collect())
    }

    async fn all_patterns(&self) -> CrawlResult<Vec<UrlPattern>> {
        Ok(self.inner.read().await.patterns.values().cloned().collect())
    }
}

#[async_trait]
impl CrawlerStore for MemoryStore {
    async fn save_crawler(&self, crawler: Crawler) -> CrawlResult<()> {
        self.inner.write().await.crawlers.insert(crawler.id, crawler);
        Ok(())
    }

    async fn get_crawler(&self, id: CrawlerId) -> CrawlResult<Option<Crawler>> {
        Ok(self.inner.read().await.crawlers.get(&id).cloned())
    }

    async fn crawlers_for_site(&self, site_id: SiteId) -> CrawlResult<Vec<Crawler>> {
        Ok(self
            .inner
            .read()
            .await
            .crawlers
            .values()
            .filter(|c| c.site_id == site_id)
            .cloned()
            .collect())
    }

    async fn all_enabled_crawlers(&self) -> CrawlResult<Vec<Crawler>> {
        Ok(self
            .inner
            .read()
            .await
            .crawlers
            .values()
            .filter(|c| matches!(c.status, crate::model::CrawlerStatus::Enabled))
            .cloned()
            .collect())
    }

    async fn delete_crawler(&self, id: CrawlerId) -> CrawlResult<()> {
        let mut guard = self.inner.write().await;
        guard.crawlers.remove(&id);
        guard.patterns.retain(|_, p| p.crawler_id != id);
        Ok(())
    }
}

#[async_trait]
impl SiteStore for MemoryStore {
    async fn save_site(&self, site: Site) -> CrawlResult<()> {
        self.inner.write().await.sites.insert(site.id, site);
        Ok(())
    }

    async fn get_site(&self, id: SiteId) -> CrawlResult<Option<Site>> {
        Ok(self.inner.read().await.sites.get(&id).cloned())
    }

    async fn delete_site(&self, id: SiteId) -> CrawlResult<()> {
        let mut guard = self.inner.write().await;
        if let Some(site) = guard.sites.remove(&id) {
            for crawler_id in site.crawler_ids {
                guard.crawlers.remove(&crawler_id);
                guard.patterns.retain(|_, p| p.crawler_id != crawler_id);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl EntityCatalogStore for MemoryStore {
    async fn lookup(&self, normalized_name: &str) -> CrawlResult<Option<EntityCatalogEntry>> {
        Ok(self.inner.read().await.catalog.get(normalized_name).cloned())
    }

    async fn upsert_catalog_entry(&self, entry: EntityCatalogEntry) -> CrawlResult<()> {
        let key = fold_name(&entry.normalized_name);
        self.inner.write().await.catalog.insert(key, entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PageRecord;
    use std::collections::BTreeMap;

    fn page(url: &str) -> PageRecord {
        PageRecord {
            url: url.to_string(),
            parser: "readability_scraper".to_string(),
            html: String::new(),
            publication_date: None,
            metadata: BTreeMap::new(),
            links: Vec::new(),
            text: vec!["hello".to_string()],
            title: "t".to_string(),
            highlighted_strings: Vec::new(),
        }
    }

    #[tokio::test]
    async fn fresh_page_round_trips() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store
            .save_page(CrawledPage {
                page: page("http://a.test/x"),
                fetched_at: now,
                expires_at: now + chrono::Duration::seconds(10),
            })
            .await
            .unwrap();
        assert!(store.get_fresh_page("http://a.test/x", now).await.is_some());
        assert!(store
            .get_fresh_page("http://a.test/x", now + chrono::Duration::seconds(20))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn deleting_a_site_cascades_to_crawlers_and_patterns() {
        let store = MemoryStore::new();
        let site = Site::new(
            "pub".to_string(),
            "name".to_string(),
            "a.test".to_string(),
            "news".to_string(),
        );
        let mut crawler = Crawler::new(
            site.id,
            "http://a.test/".to_string(),
            crate::model::CrawlerKind::Links,
            crate::model::ScraperKind::Readability,
            60,
            60,
        );
        let pattern = UrlPattern {
            id: PatternId::new(),
            crawler_id: crawler.id,
            hostname: "a.test".to_string(),
            regex_source: r"^http://a\.test/.*$".to_string(),
            harvester_categories: vec![],
            exclude_words: vec![],
            ad_script: String::new(),
            is_default: true,
        };
        let mut site = site;
        site.crawler_ids.push(crawler.id);
        crawler.default_pattern_id = Some(pattern.id);

        store.save_site(site.clone()).await.unwrap();
        store.save_crawler(crawler.clone()).await.unwrap();
        store.save_pattern(pattern).await.unwrap();

        store.delete_site(site.id).await.unwrap();
        assert!(store.get_crawler(crawler.id).await.unwrap().is_none());
        assert!(store.patterns_for_crawler(crawler.id).await.unwrap().is_empty());
    }
}
