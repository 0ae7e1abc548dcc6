use serde::{Deserialize, Serialize};

use super::ids::{CrawlerId, SiteId};

/// A site exclusively owns its crawlers; deleting a site cascades to them
/// and to their URL patterns and frontier state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub id: SiteId,
    pub publisher: String,
    pub name: String,
    pub hostname: String,
    pub category: String,
    pub enabled: bool,
    pub crawler_ids: Vec<CrawlerId>,
}

impl Site {
    pub fn new(publisher: String, name: String, hostname: String, category: String) -> Self {
        Self {
            id: SiteId::new(),
            publisher,
            name,
            hostname,
            category,
            enabled: true,
            crawler_ids: Vec::new(),
        }
    }
}
