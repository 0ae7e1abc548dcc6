//! Entity Dictionary (§4.D): catalog lookup by case-folded name with two
//! bounded, flush-on-full (not LRU) process-local caches.

use std::collections::HashSet;

use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::Mutex;

use crate::model::Entity;
use crate::utils::fold_name;

/// The backing catalog lookup; a store implementation provides this.
/// Returns `None` for absent or disabled entries; on a live hit it also
/// increments the catalog's observational `occur` counter (§4.D step 2).
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    async fn lookup_and_count(&self, normalized_name: &str) -> Option<Entity>;
}

struct Caches {
    hits: IndexMap<String, Entity>,
    misses: HashSet<String>,
}

/// Process-wide entity dictionary. Guarded by a mutex per §9 design notes
/// ("guard with a mutex even under cooperative scheduling"); in practice
/// there is no contention because the cooperative scheduler never
/// interleaves within a single `check` call.
pub struct EntityDictionary {
    capacity: usize,
    caches: Mutex<Caches>,
}

impl EntityDictionary {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            caches: Mutex::new(Caches {
                hits: IndexMap::new(),
                misses: HashSet::new(),
            }),
        }
    }

    /// `check(name)` (§4.D): hit cache → candidate cache → catalog lookup.
    /// Cache eviction is a full clear on reaching capacity, intentionally
    /// not LRU (§4.D step 3, rationale: the catalog is read-only relative
    /// to the crawl).
    pub async fn check(&self, name: &str, catalog: &dyn CatalogLookup) -> Option<Entity> {
        let folded = fold_name(name);

        {
            let caches = self.caches.lock().await;
            if let Some(entity) = caches.hits.get(&folded) {
                return Some(entity.clone());
            }
            if caches.misses.contains(&folded) {
                return None;
            }
        }

        let result = catalog.lookup_and_count(&folded).await;
        let mut caches = self.caches.lock().await;
        match result {
            Some(entity) => {
                if caches.hits.len() >= self.capacity {
                    caches.hits.clear();
                }
                caches.hits.insert(folded, entity.clone());
                Some(entity)
            }
            None => {
                if caches.misses.len() >= self.capacity {
                    caches.misses.clear();
                }
                caches.misses.insert(folded);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingCatalog {
        calls: AtomicUsize,
        known: Vec<&'static str>,
    }

    #[async_trait]
    impl CatalogLookup for CountingCatalog {
        async fn lookup_and_count(&self, normalized_name: &str) -> Option<Entity> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.known.contains(&normalized_name) {
                Some(Entity {
                    name: normalized_name.to_string(),
                    category: "org".to_string(),
                })
            } else {
                None
            }
        }
    }

    #[tokio::test]
    async fn repeated_hit_uses_cache() {
        let dict = EntityDictionary::new(120);
        let catalog = CountingCatalog {
            calls: AtomicUsize::new(0),
            known: vec!["acme corp"],
        };
        assert!(dict.check("Acme Corp", &catalog).await.is_some());
        assert!(dict.check("acme corp", &catalog).await.is_some());
        assert_eq!(catalog.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn repeated_miss_uses_cache() {
        let dict = EntityDictionary::new(120);
        let catalog = CountingCatalog {
            calls: AtomicUsize::new(0),
            known: vec![],
        };
        assert!(dict.check("Nope", &catalog).await.is_none());
        assert!(dict.check("nope", &catalog).await.is_none());
        assert_eq!(catalog.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cache_flushes_on_full() {
        let dict = EntityDictionary::new(1);
        let catalog = CountingCatalog {
            calls: AtomicUsize::new(0),
            known: vec!["a", "b"],
        };
        dict.check("a", &catalog).await;
        dict.check("b", &catalog).await;
        // second lookup should have flushed cache for "a" and required a
        // fresh catalog call
        assert_eq!(catalog.calls.load(Ordering::SeqCst), 2);
    }
}
