//! Bounded context cache — prior query/result pairs per session.
//!
//! One store shared process-wide, keyed by session id + a monotonic
//! sequence number. Eviction is strictly insertion-order FIFO: once
//! capacity is exceeded, the single oldest entry goes, regardless of which
//! session owns it and regardless of reads. Last access never refreshes an
//! entry (this is deliberately *not* LRU).
//!
//! Concurrent writers are serialized by an interior `tokio::sync::RwLock`;
//! `put` is append-then-maybe-evict under a single write guard, so the
//! size-never-exceeds-capacity invariant holds under any interleaving.

use inspectql_core::StructuredResponse;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tokio::sync::RwLock;
use tracing::debug;

/// Composite cache key: which session, and in what order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub session_id: String,
    pub sequence: u64,
}

/// One cached query/result pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub query: String,
    pub result: StructuredResponse,
}

/// The bounded store.
pub struct ContextCache {
    capacity: usize,
    inner: RwLock<Inner>,
}

struct Inner {
    entries: VecDeque<CacheEntry>,
    next_sequence: u64,
}

impl ContextCache {
    /// Create a cache bounded at `capacity` entries. Zero capacity is a
    /// misconfiguration callers must reject before construction; the cache
    /// itself clamps to 1 so `put` can never wedge.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: RwLock::new(Inner {
                entries: VecDeque::new(),
                next_sequence: 0,
            }),
        }
    }

    /// Append an entry, evicting the oldest if capacity is exceeded.
    pub async fn put(
        &self,
        session_id: impl Into<String>,
        query: impl Into<String>,
        result: StructuredResponse,
    ) -> CacheKey {
        let mut inner = self.inner.write().await;
        let key = CacheKey {
            session_id: session_id.into(),
            sequence: inner.next_sequence,
        };
        inner.next_sequence += 1;
        inner.entries.push_back(CacheEntry {
            key: key.clone(),
            query: query.into(),
            result,
        });
        if inner.entries.len() > self.capacity {
            if let Some(evicted) = inner.entries.pop_front() {
                debug!(
                    session = %evicted.key.session_id,
                    sequence = evicted.key.sequence,
                    "cache full; evicted oldest entry"
                );
            }
        }
        key
    }

    /// All entries for a session, oldest first.
    pub async fn get(&self, session_id: &str) -> Vec<CacheEntry> {
        self.inner
            .read()
            .await
            .entries
            .iter()
            .filter(|e| e.key.session_id == session_id)
            .cloned()
            .collect()
    }

    /// Whether a specific key is still cached.
    pub async fn contains(&self, key: &CacheKey) -> bool {
        self.inner.read().await.entries.iter().any(|e| &e.key == key)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.entries.is_empty()
    }

    pub async fn clear(&self) {
        self.inner.write().await.entries.clear();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
