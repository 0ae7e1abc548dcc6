//! Per-crawler URL Frontier (§4.B): a set (unique-membership) of URLs to
//! visit, plus the start URL and age-filtered re-fetch gating.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use tokio::sync::Mutex;

use crate::model::CrawledPage;
use crate::utils::strip_fragment;

/// Looks up whether a URL has a fresh (non-expired) `CrawledPage` record.
/// Kept as a trait so the frontier's age filter doesn't depend on a
/// concrete store implementation (it's a suspension point per §5).
#[async_trait]
pub trait AgeOracle: Send + Sync {
    async fn is_fresh(&self, url: &str, now: DateTime<Utc>) -> Option<CrawledPage>;
}

/// Set-semantics URL queue for one crawler. Adding the same URL (modulo
/// fragment) any number of times and then draining yields it at most once
/// (§8 law 4).
pub struct Frontier {
    urls: Mutex<IndexSet<String>>,
    pub start_url: String,
}

impl Frontier {
    pub fn new(start_url: impl Into<String>) -> Self {
        Self {
            urls: Mutex::new(IndexSet::new()),
            start_url: start_url.into(),
        }
    }

    /// Push a discovered URL, deduped by its fragment-stripped form.
    pub async fn push(&self, url: &str) {
        let key = strip_fragment(url).to_string();
        self.urls.lock().await.insert(key);
    }

    pub async fn is_empty(&self) -> bool {
        self.urls.lock().await.is_empty()
    }

    async fn pop_any(&self) -> Option<String> {
        let mut urls = self.urls.lock().await;
        urls.shift_remove_index(0)
    }

    /// `get-next()` (§4.B): pop from the set; if empty, let the caller
    /// regenerate (kind-specific, §4.G) and retry with the result; then
    /// filter out URLs whose crawl page is still fresh.
    ///
    /// `generate` is invoked with `&self` so crawler-kind logic (which may
    /// itself push into the frontier, e.g. RSS's "push the rest") can run
    /// before the retry.
    pub async fn get_next<F, Fut>(
        &self,
        age_oracle: &dyn AgeOracle,
        now: DateTime<Utc>,
        generate: F,
    ) -> Option<String>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Option<String>>,
    {
        loop {
            let candidate = match self.pop_any().await {
                Some(url) => url,
                None => match generate().await {
                    Some(url) => url,
                    None => return None,
                },
            };
            if age_oracle.is_fresh(&candidate, now).await.is_some() {
                continue;
            }
            return Some(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NeverFresh;

    #[async_trait]
    impl AgeOracle for NeverFresh {
        async fn is_fresh(&self, _url: &str, _now: DateTime<Utc>) -> Option<CrawledPage> {
            None
        }
    }

    #[tokio::test]
    async fn duplicate_pushes_drain_once() {
        let frontier = Frontier::new("http://a.test/");
        frontier.push("http://a.test/articles/1").await;
        frontier.push("http://a.test/articles/1#x").await;
        frontier.push("http://a.test/articles/1#y").await;

        let oracle = NeverFresh;
        let now = Utc::now();
        let mut seen = Vec::new();
        while let Some(url) = frontier
            .get_next(&oracle, now, || async { None })
            .await
        {
            seen.push(url);
        }
        assert_eq!(seen, vec!["http://a.test/articles/1".to_string()]);
    }

    #[tokio::test]
    async fn empty_frontier_regenerates() {
        let frontier = Frontier::new("http://a.test/");
        let oracle = NeverFresh;
        let now = Utc::now();
        let url = frontier
            .get_next(&oracle, now, || async { Some("http://a.test/".to_string()) })
            .await;
        assert_eq!(url, Some("http://a.test/".to_string()));
    }
}
