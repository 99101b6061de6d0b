//! Time-bounded memoization of resolved streams.
//!
//! Pure TTL cache: expired entries are treated as absent on read and
//! overwritten on the next put. There is no single-flight guarantee —
//! two near-simultaneous misses for the same identifier both resolve,
//! which is accepted duplicate work. Key space is bounded by distinct
//! identifiers requested, so there is no eviction beyond TTL expiry.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::trace;

use crate::candidate::ResolvedStream;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: ResolvedStream,
    inserted_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant) -> bool {
        now.duration_since(self.inserted_at) < self.ttl
    }
}

/// Concurrent identifier → result cache.
#[derive(Debug, Default)]
pub struct ResultCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh entry for `key`, or `None` (expired counts as absent).
    pub async fn get(&self, key: &str) -> Option<ResolvedStream> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) if entry.is_fresh(Instant::now()) => {
                trace!(key, "cache hit");
                Some(entry.value.clone())
            }
            Some(_) => {
                trace!(key, "cache entry expired");
                None
            }
            None => None,
        }
    }

    /// Store a result; always overwrites.
    pub async fn put(&self, key: &str, value: ResolvedStream, ttl: Duration) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                inserted_at: Instant::now(),
                ttl,
            },
        );
    }

    /// Drop expired entries. Not called on the hot path; exposed for
    /// periodic sweeps by long-running hosts.
    pub async fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(now));
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
