// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Bounded, thread-safe store of previously produced results.
//!
//! The cache is an LRU map guarded by a single mutex, so every `put` commits a
//! whole entry and concurrent writers to the same key resolve to whichever
//! commits last. Entries may carry a time-to-live; an expired entry behaves
//! like a miss and is purged when it is next touched.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;

use crate::observability::messages::cache::{CacheEntryEvicted, CacheEntryExpired};
use crate::observability::messages::StructuredLog;
use crate::observability::metrics::EngineMetrics;
use crate::result::ProcessResult;

struct CacheEntry {
    result: Arc<ProcessResult>,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }
}

/// LRU cache from key (result id or derived cache key) to result.
///
/// # Example
/// ```
/// use std::num::NonZeroUsize;
/// use std::sync::Arc;
/// use process_engine::cache::ResourceCache;
/// use process_engine::result::{make_result, Metadata};
///
/// let cache = ResourceCache::new(NonZeroUsize::new(2).unwrap());
/// let result = Arc::new(make_result("HELLO", "text", Metadata::new()));
/// cache.put(result.result_id(), result.clone(), None);
///
/// assert_eq!(cache.get(result.result_id()), Some(result));
/// ```
pub struct ResourceCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
    capacity: NonZeroUsize,
    default_ttl: Option<Duration>,
    metrics: Arc<EngineMetrics>,
}

impl ResourceCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            capacity,
            default_ttl: None,
            metrics: Arc::new(EngineMetrics::new()),
        }
    }

    /// Report hits, misses and evictions into `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<EngineMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &Arc<EngineMetrics> {
        &self.metrics
    }

    /// TTL applied by `put` when the caller passes none.
    pub fn with_default_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Insert or replace `key`. Evicts the least-recently-used entry when full.
    pub fn put(&self, key: impl Into<String>, result: Arc<ProcessResult>, ttl: Option<Duration>) {
        self.put_if(key, result, ttl, || true);
    }

    /// Like [`put`](Self::put), but `admit` is evaluated under the cache lock
    /// and the entry is stored only when it returns `true`. A concurrent
    /// [`clear`](Self::clear) therefore lands either before the check or after
    /// the insert, never in between.
    pub fn put_if(
        &self,
        key: impl Into<String>,
        result: Arc<ProcessResult>,
        ttl: Option<Duration>,
        admit: impl FnOnce() -> bool,
    ) -> bool {
        let key = key.into();
        let expires_at = ttl.or(self.default_ttl).map(|ttl| Instant::now() + ttl);
        let entry = CacheEntry { result, expires_at };

        let displaced = {
            let mut entries = self.entries.lock();
            if !admit() {
                return false;
            }
            let displaced = entries.push(key.clone(), entry);
            self.metrics.set_cache_entries(entries.len());
            displaced
        };

        // `push` hands back either the old value for `key` or an evicted entry.
        if let Some((evicted_key, _)) = displaced {
            if evicted_key != key {
                self.metrics.record_eviction();
                CacheEntryEvicted {
                    key: &evicted_key,
                    capacity: self.capacity.get(),
                }
                .log();
            }
        }
        true
    }

    /// Fetch `key`, refreshing its recency. Expired entries are purged and miss.
    pub fn get(&self, key: &str) -> Option<Arc<ProcessResult>> {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        let (hit, expired) = match entries.get(key) {
            None => (None, false),
            Some(entry) if entry.is_expired(now) => (None, true),
            Some(entry) => (Some(entry.result.clone()), false),
        };

        if expired {
            entries.pop(key);
            self.metrics.set_cache_entries(entries.len());
            CacheEntryExpired { key }.log();
        }
        self.metrics.record_cache_lookup(hit.is_some());
        hit
    }

    /// Presence check that does not touch recency.
    pub fn contains_key(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries
            .lock()
            .peek(key)
            .is_some_and(|entry| !entry.is_expired(now))
    }

    pub fn remove(&self, key: &str) -> Option<Arc<ProcessResult>> {
        let mut entries = self.entries.lock();
        let removed = entries.pop(key).map(|entry| entry.result);
        self.metrics.set_cache_entries(entries.len());
        removed
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            entries.pop(key);
        }
        self.metrics.set_cache_entries(entries.len());
        expired.len()
    }

    /// Remove everything, returning how many entries were held.
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.lock();
        let count = entries.len();
        entries.clear();
        self.metrics.set_cache_entries(0);
        count
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }
}

impl std::fmt::Debug for ResourceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceCache")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}
