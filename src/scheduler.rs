//! Fleet Scheduler (§4.H): cross-crawler dispatcher. Holds `active` and
//! `paused` registries plus a shared ready ring that orders crawler-ids
//! fairly; `tick()` pops the head, advances it to the tail, and drives one
//! `crawl_page → extract → persist` cycle for the selected crawler.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{RwLock, Semaphore};

use crate::config::EngineConfig;
use crate::crawlers::CrawlerInstance;
use crate::dictionary::EntityDictionary;
use crate::extractor::Extractor;
use crate::model::{Crawler, CrawlerId, CrawledPage, CrawlerStatus, RuntimeStatus, ScoredEntry};
use crate::patterns::UrlPatternSet;
use crate::ring::FleetRing;
use crate::scraper::Scraper;
use crate::store::Store;
use crate::{aggregator, error::CrawlResult};

/// Bounded wait for a ring pop before a tick gives up for this round
/// (§5 "Ring pop").
const RING_POP_TIMEOUT: Duration = Duration::from_secs(3);

pub struct Scheduler<S: Store> {
    store: Arc<S>,
    dictionary: Arc<EntityDictionary>,
    extractor: Extractor,
    ring: Arc<dyn FleetRing>,
    active: RwLock<HashMap<CrawlerId, Arc<CrawlerInstance>>>,
    paused: RwLock<HashMap<CrawlerId, Arc<CrawlerInstance>>>,
    concurrency: Semaphore,
    config: EngineConfig,
    transactions_today: AtomicU32,
}

impl<S: Store + 'static> Scheduler<S> {
    pub fn new(store: Arc<S>, ring: Arc<dyn FleetRing>, config: EngineConfig) -> Self {
        let dictionary = Arc::new(EntityDictionary::new(config.dictionary_cache_capacity));
        let extractor = Extractor::new(dictionary.clone());
        let concurrency = Semaphore::new(config.concurrent_requests_limit);
        Self {
            store,
            dictionary,
            extractor,
            ring,
            active: RwLock::new(HashMap::new()),
            paused: RwLock::new(HashMap::new()),
            concurrency,
            config,
            transactions_today: AtomicU32::new(0),
        }
    }

    async fn build_instance(&self, crawler: Crawler) -> CrawlResult<CrawlerInstance> {
        let mut patterns = UrlPatternSet::new(crawler.id);
        for pattern in self.store.patterns_for_crawler(crawler.id).await? {
            let is_default = pattern.is_default;
            patterns.save(pattern, is_default)?;
        }
        let scraper = Scraper::new(
            crawler.scraper_kind,
            &self.config.user_agent,
            Duration::from_secs(self.config.fetch_timeout_secs),
        )?;
        Ok(CrawlerInstance::new(crawler, patterns, scraper))
    }

    /// Enroll an enabled crawler: build (or revive) its instance, mark it
    /// running, and push its id onto the ready ring (§4.H "Enroll").
    pub async fn enroll(&self, crawler: Crawler) -> CrawlResult<()> {
        if !matches!(crawler.status, CrawlerStatus::Enabled) {
            return Ok(());
        }
        let id = crawler.id;
        let instance = Arc::new(self.build_instance(crawler).await?);
        instance.crawler.write().await.runtime_status = RuntimeStatus::Running;
        self.active.write().await.insert(id, instance);
        self.paused.write().await.remove(&id);
        self.ring.push_right(id).await;
        Ok(())
    }

    /// Disable/delete: stop the instance, drop it from both registries,
    /// and remove it from the ring (§4.H "Disable / delete").
    pub async fn stop(&self, id: CrawlerId) {
        if let Some(instance) = self.active.write().await.remove(&id) {
            instance.crawler.write().await.runtime_status = RuntimeStatus::Stopped;
        }
        if let Some(instance) = self.paused.write().await.remove(&id) {
            instance.crawler.write().await.runtime_status = RuntimeStatus::Stopped;
        }
        self.ring.remove(id).await;
    }

    /// One scheduler tick (§4.H "Tick"): pop the ring, dispatch the
    /// selected crawler's `crawl_page → extract → persist` cycle.
    /// Short-circuits when the concurrency cap or the daily transaction
    /// budget is exhausted.
    pub async fn tick(&self) {
        let Ok(permit) = self.concurrency.try_acquire() else {
            tracing::debug!("concurrency cap reached, skipping tick");
            return;
        };

        let Some(id) = self.ring.blocking_pop_rotate(RING_POP_TIMEOUT).await else {
            return;
        };

        if self.transactions_today.load(Ordering::SeqCst) >= self.config.transactions_limit {
            tracing::warn!("daily transaction budget exhausted, requeueing {id}");
            self.ring.push_left(id).await;
            return;
        }

        let instance = {
            let active = self.active.read().await;
            active.get(&id).cloned()
        };
        let Some(instance) = instance else {
            return;
        };

        if instance.is_on_pause().await {
            self.active.write().await.remove(&id);
            self.paused.write().await.insert(id, instance);
            return;
        }

        self.run_crawler_tick(id, instance).await;
        self.transactions_today.fetch_add(1, Ordering::SeqCst);
        drop(permit);
    }

    async fn run_crawler_tick(&self, id: CrawlerId, instance: Arc<CrawlerInstance>) {
        let page = instance.crawl_page(self.store.as_ref()).await;
        let Some(page) = page else {
            if instance.is_on_pause().await {
                self.active.write().await.remove(&id);
                self.paused.write().await.insert(id, instance);
            }
            return;
        };

        let now = Utc::now();
        let max_age = instance.crawler.read().await.max_age_secs;
        let crawled = CrawledPage {
            page: page.clone(),
            fetched_at: now,
            expires_at: now + chrono::Duration::seconds(max_age),
        };
        if let Err(err) = self.store.save_page(crawled).await {
            tracing::warn!(url = %page.url, error = %err, "failed to persist scraped page");
        }

        let extracted = match self.extractor.extract(&page, self.store.as_ref()).await {
            Ok(extracted) => extracted,
            Err(err) => {
                tracing::warn!(url = %page.url, error = %err, "extraction failed, skipping");
                return;
            }
        };

        if let Err(err) = self.store.upsert_extracted_page(extracted.clone()).await {
            tracing::warn!(url = %page.url, error = %err, "failed to persist extracted page");
        }

        self.persist_aggregates(&extracted.site, &extracted.entities, true).await;
        self.persist_aggregates(&extracted.site, &extracted.candidates, false).await;

        let crawler_snapshot = instance.crawler.read().await.clone();
        if let Err(err) = self.store.save_crawler(crawler_snapshot).await {
            tracing::warn!(crawler_id = %id, error = %err, "failed to persist crawler counters");
        }
    }

    /// Per-page bulk upsert of site aggregates (§4.F). Issued as an
    /// unordered sequence of upserts; within one page, repeated mentions
    /// of the same name were already collapsed by the extractor's
    /// per-sentence accumulation, so each name is upserted once here.
    async fn persist_aggregates(&self, site: &str, entries: &[ScoredEntry], is_entity: bool) {
        for entry in entries {
            let result = if is_entity {
                let prior = self.store.get_entity_aggregate(site, &entry.name).await.ok().flatten();
                let merged = aggregator::merge_entity(prior.as_ref(), site, entry);
                self.store.upsert_entity_aggregate(merged).await
            } else {
                let prior = self.store.get_candidate_aggregate(site, &entry.name).await.ok().flatten();
                let merged = aggregator::merge_candidate(prior.as_ref(), site, entry);
                self.store.upsert_candidate_aggregate(merged).await
            };
            if let Err(err) = result {
                tracing::warn!(site, name = %entry.name, error = %err, "failed to persist aggregate");
            }
        }
    }

    /// Per-minute reconciliation (§4.H "Pulse"): enroll newly-enabled
    /// crawlers, stop disabled ones, and resume any paused instance whose
    /// cadence window has elapsed.
    pub async fn pulse(&self) -> CrawlResult<()> {
        let enabled = self.store.all_enabled_crawlers().await?;
        let enabled_ids: std::collections::HashSet<CrawlerId> =
            enabled.iter().map(|c| c.id).collect();

        for crawler in enabled {
            let already_active = self.active.read().await.contains_key(&crawler.id);
            let already_paused = self.paused.read().await.contains_key(&crawler.id);
            if !already_active && !already_paused {
                self.enroll(crawler).await?;
            }
        }

        let stopped: Vec<CrawlerId> = {
            let active = self.active.read().await;
            let paused = self.paused.read().await;
            active
                .keys()
                .chain(paused.keys())
                .filter(|id| !enabled_ids.contains(id))
                .copied()
                .collect()
        };
        for id in stopped {
            self.stop(id).await;
        }

        let due: Vec<(CrawlerId, Arc<CrawlerInstance>)> = {
            let paused = self.paused.read().await;
            paused.iter().map(|(id, inst)| (*id, inst.clone())).collect()
        };
        let now = Utc::now();
        for (id, instance) in due {
            if instance.resume_if_due(now).await {
                self.paused.write().await.remove(&id);
                self.active.write().await.insert(id, instance);
                self.ring.push_right(id).await;
            }
        }

        Ok(())
    }

    /// Hourly midnight-UTC reset of the per-day transaction counter
    /// (§4.H "Per-day counter").
    pub fn reset_daily_counter(&self) {
        self.transactions_today.store(0, Ordering::SeqCst);
    }

    pub async fn active_count(&self) -> usize {
        self.active.read().await.len()
    }

    pub async fn paused_count(&self) -> usize {
        self.paused.read().await.len()
    }

    /// The shared entity dictionary backing this scheduler's extractor,
    /// exposed for admin-layer cache inspection.
    pub fn dictionary(&self) -> &Arc<EntityDictionary> {
        &self.dictionary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CrawlerKind, PatternId, ScraperKind, Site, UrlPattern};
    use crate::ring::InMemoryRing;
    use crate::store::memory::MemoryStore;

    async fn site_with_crawler(store: &MemoryStore) -> (Site, Crawler) {
        let mut site = Site::new(
            "pub".to_string(),
            "A Test".to_string(),
            "a.test".to_string(),
            "news".to_string(),
        );
        let crawler = Crawler::new(
            site.id,
            "http://a.test/".to_string(),
            CrawlerKind::Links,
            ScraperKind::Readability,
            60,
            300,
        );
        site.crawler_ids.push(crawler.id);
        use crate::store::{CrawlerStore, PatternStore, SiteStore};
        store.save_site(site.clone()).await.unwrap();
        store.save_crawler(crawler.clone()).await.unwrap();
        store
            .save_pattern(UrlPattern {
                id: PatternId::new(),
                crawler_id: crawler.id,
                hostname: "a.test".to_string(),
                regex_source: r"^http://a\.test/articles/.*$".to_string(),
                harvester_categories: vec!["news".to_string()],
                exclude_words: vec![],
                ad_script: String::new(),
                is_default: false,
            })
            .await
            .unwrap();
        (site, crawler)
    }

    #[tokio::test]
    async fn enroll_pushes_the_crawler_onto_the_ring() {
        let store = Arc::new(MemoryStore::new());
        let (_site, crawler) = site_with_crawler(&store).await;
        let ring = Arc::new(InMemoryRing::new());
        let scheduler = Scheduler::new(store, ring.clone(), EngineConfig::builder().database_url("postgres://localhost/test").build().unwrap());

        scheduler.enroll(crawler.clone()).await.unwrap();
        assert_eq!(scheduler.active_count().await, 1);
        assert!(ring.contains(crawler.id).await);
    }

    #[tokio::test]
    async fn stop_removes_from_every_registry() {
        let store = Arc::new(MemoryStore::new());
        let (_site, crawler) = site_with_crawler(&store).await;
        let ring = Arc::new(InMemoryRing::new());
        let scheduler = Scheduler::new(store, ring.clone(), EngineConfig::builder().database_url("postgres://localhost/test").build().unwrap());

        scheduler.enroll(crawler.clone()).await.unwrap();
        scheduler.stop(crawler.id).await;
        assert_eq!(scheduler.active_count().await, 0);
        assert!(!ring.contains(crawler.id).await);
    }
}
