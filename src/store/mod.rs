//! Persistent store seam (§6). `PersistentStore` is split into narrow
//! per-collection traits, the same decomposition
//! `fourthplaces-mntogether/packages/intelligent-crawler::traits::CrawlerStorage`
//! uses for its storage seam, so a caller can depend on only the slice it
//! needs. Two implementations are provided: an in-memory reference (used by
//! the test suite) and a Postgres-backed one (feature `postgres`).

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use async_trait::async_trait;

use crate::error::CrawlResult;
use crate::model::{
    Crawler, CrawlerId, CrawledPage, Entity, EntityCatalogEntry, ExtractedPage, Site, SiteId,
    SiteAggregate, UrlPattern, PatternId,
};

/// `pages_raw` (§6): TTL-indexed raw scrape cache, keyed by url.
#[async_trait]
pub trait PageStore: Send + Sync {
    async fn save_page(&self, page: CrawledPage) -> CrawlResult<()>;
    async fn get_fresh_page(&self, url: &str, now: chrono::DateTime<chrono::Utc>) -> Option<CrawledPage>;
    /// Physical cleanup of rows past `expires_at`. The core does not rely on
    /// this for correctness (the age filter checks `expires_at` at read
    /// time); it is offered for operators who want to reclaim storage.
    async fn purge_expired(&self, now: chrono::DateTime<chrono::Utc>) -> CrawlResult<u64>;
}

/// `pages_extracted` (§6): durable, upserted-by-url extracted documents.
#[async_trait]
pub trait ExtractedPageStore: Send + Sync {
    async fn upsert_extracted_page(&self, page: ExtractedPage) -> CrawlResult<()>;
    async fn get_extracted_page(&self, url: &str) -> CrawlResult<Option<ExtractedPage>>;
    async fn list_extracted_pages_for_site(&self, site: &str) -> CrawlResult<Vec<ExtractedPage>>;
}

/// `site_entities` / `site_candidates` (§6): per-site running aggregates.
#[async_trait]
pub trait SiteEntityStore: Send + Sync {
    async fn get_entity_aggregate(&self, site: &str, name: &str) -> CrawlResult<Option<SiteAggregate>>;
    async fn upsert_entity_aggregate(&self, aggregate: SiteAggregate) -> CrawlResult<()>;
    async fn get_candidate_aggregate(&self, site: &str, name: &str) -> CrawlResult<Option<SiteAggregate>>;
    async fn upsert_candidate_aggregate(&self, aggregate: SiteAggregate) -> CrawlResult<()>;
}

/// `url_patterns` (§6), secondary-indexed on crawler-id and hostname.
#[async_trait]
pub trait PatternStore: Send + Sync {
    async fn save_pattern(&self, pattern: UrlPattern) -> CrawlResult<PatternId>;
    async fn patterns_for_crawler(&self, crawler_id: CrawlerId) -> CrawlResult<Vec<UrlPattern>>;
    async fn patterns_for_hostname(&self, hostname: &str) -> CrawlResult<Vec<UrlPattern>>;
    async fn all_patterns(&self) -> CrawlResult<Vec<UrlPattern>>;
}

/// `crawlers` (§6).
#[async_trait]
pub trait CrawlerStore: Send + Sync {
    async fn save_crawler(&self, crawler: Crawler) -> CrawlResult<()>;
    async fn get_crawler(&self, id: CrawlerId) -> CrawlResult<Option<Crawler>>;
    async fn crawlers_for_site(&self, site_id: SiteId) -> CrawlResult<Vec<Crawler>>;
    async fn all_enabled_crawlers(&self) -> CrawlResult<Vec<Crawler>>;
    async fn delete_crawler(&self, id: CrawlerId) -> CrawlResult<()>;
}

/// `sites` (§6).
#[async_trait]
pub trait SiteStore: Send + Sync {
    async fn save_site(&self, site: Site) -> CrawlResult<()>;
    async fn get_site(&self, id: SiteId) -> CrawlResult<Option<Site>>;
    async fn delete_site(&self, id: SiteId) -> CrawlResult<()>;
}

/// `entity_catalog` (§6), keyed by normalized-name.
#[async_trait]
pub trait EntityCatalogStore: Send + Sync {
    async fn lookup(&self, normalized_name: &str) -> CrawlResult<Option<EntityCatalogEntry>>;
    async fn upsert_catalog_entry(&self, entry: EntityCatalogEntry) -> CrawlResult<()>;
}

/// The union of every narrow store trait, implemented once per backend.
/// Most callers should depend on the individual traits above; `Store` is a
/// convenience bound for the `Engine`/`Scheduler` facades that need the
/// whole surface.
pub trait Store:
    PageStore
    + ExtractedPageStore
    + SiteEntityStore
    + PatternStore
    + CrawlerStore
    + SiteStore
    + EntityCatalogStore
{
}

impl<T> Store for T where
    T: PageStore
        + ExtractedPageStore
        + SiteEntityStore
        + PatternStore
        + CrawlerStore
        + SiteStore
        + EntityCatalogStore
{
}

/// Adapts any [`Store`] as the [`crate::frontier::AgeOracle`] the Frontier
/// needs: a fresh `CrawledPage` means the URL is still within its TTL.
#[async_trait]
impl<T: PageStore> crate::frontier::AgeOracle for T {
    async fn is_fresh(
        &self,
        url: &str,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Option<CrawledPage> {
        self.get_fresh_page(url, now).await
    }
}

/// Adapts any [`Store`] as the [`crate::dictionary::CatalogLookup`] the
/// `EntityDictionary` needs.
#[async_trait]
impl<T: EntityCatalogStore> crate::dictionary::CatalogLookup for T {
    async fn lookup_and_count(&self, normalized_name: &str) -> Option<Entity> {
        match self.lookup(normalized_name).await {
            Ok(Some(entry)) if !entry.disabled => {
                let mut bumped = entry.clone();
                bumped.occur += 1;
                let _ = self.upsert_catalog_entry(bumped).await;
                Some(Entity {
                    name: entry.name,
                    category: entry.category,
                })
            }
            _ => None,
        }
    }
}
