//! Postgres-backed [`Store`](super::Store) implementation. JSONB columns
//! carry the unstructured parts (metadata, entities, candidates, links);
//! native columns back anything the core queries directly (site hostname,
//! `expires_at`, `crawler_id`), following the same `sqlx::query` + `.bind`
//! + manual row-mapping idiom as
//! `fourthplaces-mntogether/packages/intelligent-crawler/src/storage/postgres.rs`.
//!
//! Postgres has no TTL index, so `get_fresh_page` filters on `expires_at`
//! at read time (the age filter, §4.B); `purge_expired` is offered for
//! operators who want physical cleanup of `pages_raw`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::{CrawlError, CrawlResult};
use crate::model::{
    Crawler, CrawlerId, CrawlerKind, CrawlerStatus, CrawledPage, EntityCatalogEntry,
    ExtractedPage, PageRecord, PatternId, RuntimeStatus, ScoredEntry, ScraperKind, Site, SiteId,
    SiteAggregate, UrlPattern,
};

use super::{CrawlerStore, EntityCatalogStore, ExtractedPageStore, PageStore, PatternStore,
    SiteEntityStore, SiteStore};

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects and runs the crate's embedded schema migrations. Intended
    /// for startup in an embedding binary; the core itself never calls
    /// this implicitly.
    pub async fn connect(database_url: &str) -> CrawlResult<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| CrawlError::TransientPersistence {
                collection: "connect".to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self::new(pool))
    }
}

fn transient(collection: &str, err: sqlx::Error) -> CrawlError {
    CrawlError::TransientPersistence {
        collection: collection.to_string(),
        reason: err.to_string(),
    }
}

#[async_trait]
impl PageStore for PostgresStore {
    async fn save_page(&self, page: CrawledPage) -> CrawlResult<()> {
        sqlx::query(
            r#"
            INSERT INTO pages_raw (url, parser, html, date, metadata, links, text, title,
                                    highlighted_strings, fetched_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (url) DO UPDATE SET
                parser = EXCLUDED.parser,
                html = EXCLUDED.html,
                date = EXCLUDED.date,
                metadata = EXCLUDED.metadata,
                links = EXCLUDED.links,
                text = EXCLUDED.text,
                title = EXCLUDED.title,
                highlighted_strings = EXCLUDED.highlighted_strings,
                fetched_at = EXCLUDED.fetched_at,
                expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(&page.page.url)
        .bind(&page.page.parser)
        .bind(&page.page.html)
        .bind(page.page.publication_date)
        .bind(serde_json::to_value(&page.page.metadata).unwrap_or_default())
        .bind(serde_json::to_value(&page.page.links).unwrap_or_default())
        .bind(serde_json::to_value(&page.page.text).unwrap_or_default())
        .bind(&page.page.title)
        .bind(serde_json::to_value(&page.page.highlighted_strings).unwrap_or_default())
        .bind(page.fetched_at)
        .bind(page.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| transient("pages_raw", e))?;
        Ok(())
    }

    async fn get_fresh_page(&self, url: &str, now: DateTime<Utc>) -> Option<CrawledPage> {
        let row = sqlx::query(
            r#"
            SELECT url, parser, html, date, metadata, links, text, title,
                   highlighted_strings, fetched_at, expires_at
            FROM pages_raw
            WHERE url = $1 AND expires_at > $2
            "#,
        )
        .bind(url)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .ok()??;

        Some(CrawledPage {
            page: PageRecord {
                url: row.get("url"),
                parser: row.get("parser"),
                html: row.get("html"),
                publication_date: row.get("date"),
                metadata: serde_json::from_value(row.get("metadata")).unwrap_or_default(),
                links: serde_json::from_value(row.get("links")).unwrap_or_default(),
                text: serde_json::from_value(row.get("text")).unwrap_or_default(),
                title: row.get("title"),
                highlighted_strings: serde_json::from_value(row.get("highlighted_strings"))
                    .unwrap_or_default(),
            },
            fetched_at: row.get("fetched_at"),
            expires_at: row.get("expires_at"),
        })
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> CrawlResult<u64> {
        let result = sqlx::query("DELETE FROM pages_raw WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| transient("pages_raw", e))?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl ExtractedPageStore for PostgresStore {
    async fn upsert_extracted_page(&self, page: ExtractedPage) -> CrawlResult<()> {
        sqlx::query(
            r#"
            INSERT INTO pages_extracted (url, site, parser, extractor, extracted_at, title, text,
                                          keywords, entities, candidates, suggested_entities,
                                          url_pattern_id, categories, exclude_words)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (url) DO UPDATE SET
                site = EXCLUDED.site,
                parser = EXCLUDED.parser,
                extractor = EXCLUDED.extractor,
                extracted_at = EXCLUDED.extracted_at,
                title = EXCLUDED.title,
                text = EXCLUDED.text,
                keywords = EXCLUDED.keywords,
                entities = EXCLUDED.entities,
                candidates = EXCLUDED.candidates,
                suggested_entities = EXCLUDED.suggested_entities,
                url_pattern_id = EXCLUDED.url_pattern_id,
                categories = EXCLUDED.categories,
                exclude_words = EXCLUDED.exclude_words
            "#,
        )
        .bind(&page.url)
        .bind(&page.site)
        .bind(&page.parser)
        .bind(&page.extractor)
        .bind(page.extracted_at)
        .bind(&page.title)
        .bind(&page.text)
        .bind(serde_json::to_value(&page.keywords).unwrap_or_default())
        .bind(serde_json::to_value(&page.entities).unwrap_or_default())
        .bind(serde_json::to_value(&page.candidates).unwrap_or_default())
        .bind(serde_json::to_value(&page.suggested_entities).unwrap_or_default())
        .bind(page.url_pattern_id.map(|id| id.0))
        .bind(serde_json::to_value(&page.categories).unwrap_or_default())
        .bind(serde_json::to_value(&page.exclude_words).unwrap_or_default())
        .execute(&self.pool)
        .await
        .map_err(|e| transient("pages_extracted", e))?;
        Ok(())
    }

    async fn get_extracted_page(&self, url: &str) -> CrawlResult<Option<ExtractedPage>> {
        let row = sqlx::query(
            r#"
            SELECT url, site, parser, extractor, extracted_at, title, text, keywords, entities,
                   candidates, suggested_entities, url_pattern_id, categories, exclude_words
            FROM pages_extracted WHERE url = $1
            "#,
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| transient("pages_extracted", e))?;
        Ok(row.map(row_to_extracted_page))
    }

    async fn list_extracted_pages_for_site(&self, site: &str) -> CrawlResult<Vec<ExtractedPage>> {
        let rows = sqlx::query(
            r#"
            SELECT url, site, parser, extractor, extracted_at, title, text, keywords, entities,
                   candidates, suggested_entities, url_pattern_id, categories, exclude_words
            FROM pages_extracted WHERE site = $1
            "#,
        )
        .bind(site)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| transient("pages_extracted", e))?;
        Ok(rows.into_iter().map(row_to_extracted_page).collect())
    }
}

fn row_to_extracted_page(row: sqlx::postgres::PgRow) -> ExtractedPage {
    ExtractedPage {
        url: row.get("url"),
        site: row.get("site"),
        parser: row.get("parser"),
        extractor: row.get("extractor"),
        extracted_at: row.get("extracted_at"),
        title: row.get("title"),
        text: row.get("text"),
        keywords: serde_json::from_value(row.get("keywords")).unwrap_or_default(),
        entities: serde_json::from_value::<Vec<ScoredEntry>>(row.get("entities"))
            .unwrap_or_default(),
        candidates: serde_json::from_value::<Vec<ScoredEntry>>(row.get("candidates"))
            .unwrap_or_default(),
        suggested_entities: serde_json::from_value(row.get("suggested_entities"))
            .unwrap_or_default(),
        url_pattern_id: row.get::<Option<Uuid>, _>("url_pattern_id").map(PatternId::from),
        categories: serde_json::from_value(row.get("categories")).unwrap_or_default(),
        exclude_words: serde_json::from_value(row.get("exclude_words")).unwrap_or_default(),
    }
}

#[async_trait]
impl SiteEntityStore for PostgresStore {
    async fn get_entity_aggregate(&self, site: &str, name: &str) -> CrawlResult<Option<SiteAggregate>> {
        get_aggregate(&self.pool, "site_entities", site, name).await
    }

    async fn upsert_entity_aggregate(&self, aggregate: SiteAggregate) -> CrawlResult<()> {
        upsert_aggregate(&self.pool, "site_entities", aggregate).await
    }

    async fn get_candidate_aggregate(&self, site: &str, name: &str) -> CrawlResult<Option<SiteAggregate>> {
        get_aggregate(&self.pool, "site_candidates", site, name).await
    }

    async fn upsert_candidate_aggregate(&self, aggregate: SiteAggregate) -> CrawlResult<()> {
        upsert_aggregate(&self.pool, "site_candidates", aggregate).await
    }
}

async fn get_aggregate(
    pool: &PgPool,
    table: &str,
    site: &str,
    name: &str,
) -> CrawlResult<Option<SiteAggregate>> {
    let sql = format!("SELECT site, name, count, mean_sentiment FROM {table} WHERE site = $1 AND name = $2");
    let row = sqlx::query(&sql)
        .bind(site)
        .bind(name)
        .fetch_optional(pool)
        .await
        .map_err(|e| transient(table, e))?;
    Ok(row.map(|r| SiteAggregate {
        site: r.get("site"),
        name: r.get("name"),
        count: r.get::<i64, _>("count") as u64,
        mean_sentiment: r.get("mean_sentiment"),
    }))
}

async fn upsert_aggregate(pool: &PgPool, table: &str, aggregate: SiteAggregate) -> CrawlResult<()> {
    let sql = format!(
        r#"
        INSERT INTO {table} (site, name, count, mean_sentiment)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (site, name) DO UPDATE SET
            count = EXCLUDED.count,
            mean_sentiment = EXCLUDED.mean_sentiment
        "#
    );
    sqlx::query(&sql)
        .bind(&aggregate.site)
        .bind(&aggregate.name)
        .bind(aggregate.count as i64)
        .bind(aggregate.mean_sentiment)
        .execute(pool)
        .await
        .map_err(|e| transient(table, e))?;
    Ok(())
}

#[async_trait]
impl PatternStore for PostgresStore {
    async fn save_pattern(&self, pattern: UrlPattern) -> CrawlResult<PatternId> {
        sqlx::query(
            r#"
            INSERT INTO url_patterns (id, crawler_id, hostname, regex_source, harvester_categories,
                                       exclude_words, ad_script, is_default)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                hostname = EXCLUDED.hostname,
                regex_source = EXCLUDED.regex_source,
                harvester_categories = EXCLUDED.harvester_categories,
                exclude_words = EXCLUDED.exclude_words,
                ad_script = EXCLUDED.ad_script,
                is_default = EXCLUDED.is_default
            "#,
        )
        .bind(pattern.id.0)
        .bind(pattern.crawler_id.0)
        .bind(&pattern.hostname)
        .bind(&pattern.regex_source)
        .bind(serde_json::to_value(&pattern.harvester_categories).unwrap_or_default())
        .bind(serde_json::to_value(&pattern.exclude_words).unwrap_or_default())
        .bind(&pattern.ad_script)
        .bind(pattern.is_default)
        .execute(&self.pool)
        .await
        .map_err(|e| transient("url_patterns", e))?;
        Ok(pattern.id)
    }

    async fn patterns_for_crawler(&self, crawler_id: CrawlerId) -> CrawlResult<Vec<UrlPattern>> {
        let rows = sqlx::query(
            r#"
            SELECT id, crawler_id, hostname, regex_source, harvester_categories, exclude_words,
                   ad_script, is_default
            FROM url_patterns WHERE crawler_id = $1
            "#,
        )
        .bind(crawler_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| transient("url_patterns", e))?;
        Ok(rows.into_iter().map(row_to_pattern).collect())
    }

    async fn patterns_for_hostname(&self, hostname: &str) -> CrawlResult<Vec<UrlPattern>> {
        let rows = sqlx::query(
            r#"
            SELECT id, crawler_id, hostname, regex_source, harvester_categories, exclude_words,
                   ad_script, is_default
            FROM url_patterns WHERE hostname = $1
            "#,
        )
        .bind(hostname)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| transient("url_patterns", e))?;
        Ok(rows.into_iter().map(row_to_pattern).collect())
    }

    async fn all_patterns(&self) -> CrawlResult<Vec<UrlPattern>> {
        let rows = sqlx::query(
            r#"
            SELECT id, crawler_id, hostname, regex_source, harvester_categories, exclude_words,
                   ad_script, is_default
            FROM url_patterns
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| transient("url_patterns", e))?;
        Ok(rows.into_iter().map(row_to_pattern).collect())
    }
}

fn row_to_pattern(row: sqlx::postgres::PgRow) -> UrlPattern {
    UrlPattern {
        id: PatternId::from(row.get::<Uuid, _>("id")),
        crawler_id: CrawlerId::from(row.get::<Uuid, _>("crawler_id")),
        hostname: row.get("hostname"),
        regex_source: row.get("regex_source"),
        harvester_categories: serde_json::from_value(row.get("harvester_categories")).unwrap_or_default(),
        exclude_words: serde_json::from_value(row.get("exclude_words")).unwrap_or_default(),
        ad_script: row.get("ad_script"),
        is_default: row.get("is_default"),
    }
}

#[async_trait]
impl CrawlerStore for PostgresStore {
    async fn save_crawler(&self, crawler: Crawler) -> CrawlResult<()> {
        sqlx::query(
            r#"
            INSERT INTO crawlers (id, site_id, start_url, scraper_kind, crawler_kind, max_age_secs,
                                   frequency_secs, status, runtime_status, crawled_count,
                                   default_pattern_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id) DO UPDATE SET
                start_url = EXCLUDED.start_url,
                scraper_kind = EXCLUDED.scraper_kind,
                crawler_kind = EXCLUDED.crawler_kind,
                max_age_secs = EXCLUDED.max_age_secs,
                frequency_secs = EXCLUDED.frequency_secs,
                status = EXCLUDED.status,
                runtime_status = EXCLUDED.runtime_status,
                crawled_count = EXCLUDED.crawled_count,
                default_pattern_id = EXCLUDED.default_pattern_id
            "#,
        )
        .bind(crawler.id.0)
        .bind(crawler.site_id.0)
        .bind(&crawler.start_url)
        .bind(scraper_kind_str(crawler.scraper_kind))
        .bind(crawler_kind_str(crawler.crawler_kind))
        .bind(crawler.max_age_secs)
        .bind(crawler.frequency_secs)
        .bind(matches!(crawler.status, CrawlerStatus::Enabled))
        .bind(runtime_status_str(crawler.runtime_status))
        .bind(crawler.crawled_count as i64)
        .bind(crawler.default_pattern_id.map(|id| id.0))
        .execute(&self.pool)
        .await
        .map_err(|e| transient("crawlers", e))?;
        Ok(())
    }

    async fn get_crawler(&self, id: CrawlerId) -> CrawlResult<Option<Crawler>> {
        let row = sqlx::query(
            r#"
            SELECT id, site_id, start_url, scraper_kind, crawler_kind, max_age_secs,
                   frequency_secs, status, runtime_status, crawled_count, default_pattern_id
            FROM crawlers WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| transient("crawlers", e))?;
        Ok(row.map(row_to_crawler))
    }

    async fn crawlers_for_site(&self, site_id: SiteId) -> CrawlResult<Vec<Crawler>> {
        let rows = sqlx::query(
            r#"
            SELECT id, site_id, start_url, scraper_kind, crawler_kind, max_age_secs,
                   frequency_secs, status, runtime_status, crawled_count, default_pattern_id
            FROM crawlers WHERE site_id = $1
            "#,
        )
        .bind(site_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| transient("crawlers", e))?;
        Ok(rows.into_iter().map(row_to_crawler).collect())
    }

    async fn all_enabled_crawlers(&self) -> CrawlResult<Vec<Crawler>> {
        let rows = sqlx::query(
            r#"
            SELECT id, site_id, start_url, scraper_kind, crawler_kind, max_age_secs,
                   frequency_secs, status, runtime_status, crawled_count, default_pattern_id
            FROM crawlers WHERE status = true
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| transient("crawlers", e))?;
        Ok(rows.into_iter().map(row_to_crawler).collect())
    }

    async fn delete_crawler(&self, id: CrawlerId) -> CrawlResult<()> {
        sqlx::query("DELETE FROM url_patterns WHERE crawler_id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| transient("url_patterns", e))?;
        sqlx::query("DELETE FROM crawlers WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| transient("crawlers", e))?;
        Ok(())
    }
}

fn row_to_crawler(row: sqlx::postgres::PgRow) -> Crawler {
    Crawler {
        id: CrawlerId::from(row.get::<Uuid, _>("id")),
        site_id: SiteId::from(row.get::<Uuid, _>("site_id")),
        start_url: row.get("start_url"),
        scraper_kind: scraper_kind_from_str(row.get("scraper_kind")),
        crawler_kind: crawler_kind_from_str(row.get("crawler_kind")),
        max_age_secs: row.get("max_age_secs"),
        frequency_secs: row.get("frequency_secs"),
        status: if row.get("status") {
            CrawlerStatus::Enabled
        } else {
            CrawlerStatus::Disabled
        },
        runtime_status: runtime_status_from_str(row.get("runtime_status")),
        crawled_count: row.get::<i64, _>("crawled_count") as u64,
        default_pattern_id: row
            .get::<Option<Uuid>, _>("default_pattern_id")
            .map(PatternId::from),
    }
}

fn scraper_kind_str(kind: ScraperKind) -> &'static str {
    match kind {
        ScraperKind::Soup => "soup",
        ScraperKind::Newspaper => "newspaper",
        ScraperKind::Readability => "readability",
    }
}

fn scraper_kind_from_str(s: &str) -> ScraperKind {
    match s {
        "soup" => ScraperKind::Soup,
        "newspaper" => ScraperKind::Newspaper,
        _ => ScraperKind::Readability,
    }
}

fn crawler_kind_str(kind: CrawlerKind) -> &'static str {
    match kind {
        CrawlerKind::Links => "links",
        CrawlerKind::Sitemap => "sitemap",
        CrawlerKind::Rss => "rss",
    }
}

fn crawler_kind_from_str(s: &str) -> CrawlerKind {
    match s {
        "sitemap" => CrawlerKind::Sitemap,
        "rss" => CrawlerKind::Rss,
        _ => CrawlerKind::Links,
    }
}

fn runtime_status_str(status: RuntimeStatus) -> &'static str {
    match status {
        RuntimeStatus::Stopped => "stopped",
        RuntimeStatus::Running => "running",
        RuntimeStatus::Paused => "paused",
    }
}

fn runtime_status_from_str(s: &str) -> RuntimeStatus {
    match s {
        "running" => RuntimeStatus::Running,
        "paused" => RuntimeStatus::Paused,
        _ => RuntimeStatus::Stopped,
    }
}

#[async_trait]
impl SiteStore for PostgresStore {
    async fn save_site(&self, site: Site) -> CrawlResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sites (id, publisher, name, hostname, category, enabled, crawler_ids)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                publisher = EXCLUDED.publisher,
                name = EXCLUDED.name,
                hostname = EXCLUDED.hostname,
                category = EXCLUDED.category,
                enabled = EXCLUDED.enabled,
                crawler_ids = EXCLUDED.crawler_ids
            "#,
        )
        .bind(site.id.0)
        .bind(&site.publisher)
        .bind(&site.name)
        .bind(&site.hostname)
        .bind(&site.category)
        .bind(site.enabled)
        .bind(serde_json::to_value(&site.crawler_ids.iter().map(|c| c.0).collect::<Vec<_>>()).unwrap_or_default())
        .execute(&self.pool)
        .await
        .map_err(|e| transient("sites", e))?;
        Ok(())
    }

    async fn get_site(&self, id: SiteId) -> CrawlResult<Option<Site>> {
        let row = sqlx::query(
            "SELECT id, publisher, name, hostname, category, enabled, crawler_ids FROM sites WHERE id = $1",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| transient("sites", e))?;
        Ok(row.map(|r| Site {
            id: SiteId::from(r.get::<Uuid, _>("id")),
            publisher: r.get("publisher"),
            name: r.get("name"),
            hostname: r.get("hostname"),
            category: r.get("category"),
            enabled: r.get("enabled"),
            crawler_ids: serde_json::from_value::<Vec<Uuid>>(r.get("crawler_ids"))
                .unwrap_or_default()
                .into_iter()
                .map(CrawlerId::from)
                .collect(),
        }))
    }

    async fn delete_site(&self, id: SiteId) -> CrawlResult<()> {
        sqlx::query(
            "DELETE FROM url_patterns WHERE crawler_id IN (SELECT id FROM crawlers WHERE site_id = $1)",
        )
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| transient("url_patterns", e))?;
        sqlx::query("DELETE FROM crawlers WHERE site_id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| transient("crawlers", e))?;
        sqlx::query("DELETE FROM sites WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| transient("sites", e))?;
        Ok(())
    }
}

#[async_trait]
impl EntityCatalogStore for PostgresStore {
    async fn lookup(&self, normalized_name: &str) -> CrawlResult<Option<EntityCatalogEntry>> {
        let row = sqlx::query(
            "SELECT name, normalized_name, category, source, occur, disabled FROM entity_catalog WHERE normalized_name = $1",
        )
        .bind(normalized_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| transient("entity_catalog", e))?;
        Ok(row.map(|r| EntityCatalogEntry {
            name: r.get("name"),
            normalized_name: r.get("normalized_name"),
            category: r.get("category"),
            source: r.get("source"),
            occur: r.get::<i64, _>("occur") as u64,
            disabled: r.get("disabled"),
        }))
    }

    async fn upsert_catalog_entry(&self, entry: EntityCatalogEntry) -> CrawlResult<()> {
        sqlx::query(
            r#"
            INSERT INTO entity_catalog (name, normalized_name, category, source, occur, disabled)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (normalized_name) DO UPDATE SET
                name = EXCLUDED.name,
                category = EXCLUDED.category,
                source = EXCLUDED.source,
                occur = EXCLUDED.occur,
                disabled = EXCLUDED.disabled
            "#,
        )
        .bind(&entry.name)
        .bind(&entry.normalized_name)
        .bind(&entry.category)
        .bind(&entry.source)
        .bind(entry.occur as i64)
        .bind(entry.disabled)
        .execute(&self.pool)
        .await
        .map_err(|e| transient("entity_catalog", e))?;
        Ok(())
    }
}
