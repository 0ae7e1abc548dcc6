//! Fleet ring (§6 "Fleet ring"): the cross-crawler dispatch order. A shared
//! list of crawler-ids supporting push-right, remove-value, and a blocking
//! pop-right-then-push-left ("rotating read") that gives round-robin
//! service. This is the only required out-of-process primitive besides the
//! per-crawler frontier sets; the in-process implementation here is built
//! on `tokio::sync::Mutex` + `indexmap::IndexSet`, the same combination
//! `Frontier` uses (§4.B), plus a `Notify` so a bounded-wait pop doesn't
//! busy-loop.

use std::time::Duration;

use async_trait::async_trait;
use indexmap::IndexSet;
use tokio::sync::{Mutex, Notify};

use crate::model::CrawlerId;

/// The ready ring's contract (§4.H, §6). A future durable implementation
/// (e.g. Redis-backed) is a drop-in behind this trait.
#[async_trait]
pub trait FleetRing: Send + Sync {
    async fn push_right(&self, id: CrawlerId);
    /// Re-queue at the head, used by the scheduler's per-day throughput
    /// gate to return a not-yet-processed id to the front of the line
    /// rather than the back (§4.H "Per-day counter").
    async fn push_left(&self, id: CrawlerId);
    async fn remove(&self, id: CrawlerId);
    /// Pop the head, push it back to the tail (the "rotating read"), and
    /// return it. Waits up to `timeout` for an entry to become available;
    /// `None` on timeout (§5 "Ring pop").
    async fn blocking_pop_rotate(&self, timeout: Duration) -> Option<CrawlerId>;
    async fn contains(&self, id: CrawlerId) -> bool;
    async fn len(&self) -> usize;
}

/// In-process [`FleetRing`]. `IndexSet` preserves insertion order and
/// rejects duplicate pushes, which matches the ring's "ordered set" shape
/// (a crawler-id is either queued once or not at all).
#[derive(Default)]
pub struct InMemoryRing {
    ids: Mutex<IndexSet<CrawlerId>>,
    notify: Notify,
}

impl InMemoryRing {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FleetRing for InMemoryRing {
    async fn push_right(&self, id: CrawlerId) {
        let mut ids = self.ids.lock().await;
        ids.insert(id);
        drop(ids);
        self.notify.notify_waiters();
    }

    async fn push_left(&self, id: CrawlerId) {
        let mut ids = self.ids.lock().await;
        ids.shift_remove(&id);
        ids.shift_insert(0, id);
        drop(ids);
        self.notify.notify_waiters();
    }

    async fn remove(&self, id: CrawlerId) {
        self.ids.lock().await.shift_remove(&id);
    }

    async fn blocking_pop_rotate(&self, timeout: Duration) -> Option<CrawlerId> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            {
                let mut ids = self.ids.lock().await;
                if let Some(head) = ids.shift_remove_index(0) {
                    ids.insert(head);
                    return Some(head);
                }
            }
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return None;
            }
            let _ = tokio::time::timeout(remaining, self.notify.notified()).await;
            if tokio::time::Instant::now() >= deadline {
                return None;
            }
        }
    }

    async fn contains(&self, id: CrawlerId) -> bool {
        self.ids.lock().await.contains(&id)
    }

    async fn len(&self) -> usize {
        self.ids.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rotation_visits_every_id_in_round_robin_order() {
        let ring = InMemoryRing::new();
        let ids: Vec<CrawlerId> = (0..3).map(|_| CrawlerId::new()).collect();
        for id in &ids {
            ring.push_right(*id).await;
        }

        let mut popped = Vec::new();
        for _ in 0..ids.len() {
            popped.push(ring.blocking_pop_rotate(Duration::from_millis(50)).await.unwrap());
        }
        assert_eq!(popped, ids);
        // and the ring is back where it started
        assert_eq!(ring.len().await, 3);
    }

    #[tokio::test]
    async fn empty_ring_times_out() {
        let ring = InMemoryRing::new();
        let result = ring.blocking_pop_rotate(Duration::from_millis(20)).await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn remove_drops_an_entry_for_good() {
        let ring = InMemoryRing::new();
        let a = CrawlerId::new();
        let b = CrawlerId::new();
        ring.push_right(a).await;
        ring.push_right(b).await;
        ring.remove(a).await;
        assert!(!ring.contains(a).await);
        assert_eq!(ring.len().await, 1);
    }
}
