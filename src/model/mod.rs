mod crawler;
mod entity;
mod ids;
mod page;
mod pattern;
mod site;

pub use crawler::{Crawler, CrawlerKind, CrawlerRuntime, CrawlerStatus, RuntimeStatus, ScraperKind};
pub use entity::{
    Entity, EntityCatalogEntry, EntitySentiment, ScoredEntry, SentimentClass, SiteAggregate,
};
pub use ids::{CrawlerId, PatternId, SiteId};
pub use page::{CrawledPage, ExtractedPage, PageRecord};
pub use pattern::{PatternProfile, UrlPattern};
pub use site::Site;
