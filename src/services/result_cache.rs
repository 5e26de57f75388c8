//! Bounded LRU memoisation of lookup outcomes
//!
//! Values are stored as `Option<T>` so a "not found" answer can be cached
//! like any other. Errors never reach the cache.

use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::errors::AppResult;

/// Point-in-time counters for one cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub capacity: usize,
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

pub struct ResultCache<T> {
    name: &'static str,
    capacity: usize,
    entries: Option<Mutex<LruCache<String, Option<T>>>>,
    cache_negative: bool,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl<T: Clone + Send> ResultCache<T> {
    /// A `capacity` of 0 yields a cache that stores nothing
    pub fn new(name: &'static str, capacity: usize, cache_negative: bool) -> Self {
        Self {
            name,
            capacity,
            entries: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
            cache_negative,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_enabled(&self) -> bool {
        self.entries.is_some()
    }

    /// Cached outcome for `key`, refreshing its recency
    ///
    /// The outer `None` is a cache miss; `Some(None)` is a cached "not found".
    pub async fn get(&self, key: &str) -> Option<Option<T>> {
        let found = match &self.entries {
            Some(entries) => entries.lock().await.get(key).cloned(),
            None => None,
        };

        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!("{} cache hit for {}", self.name, key);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    /// Store an outcome, evicting the least recently used entry when full
    ///
    /// `None` outcomes are dropped unless negative caching is enabled.
    pub async fn insert(&self, key: String, value: Option<T>) {
        let Some(entries) = &self.entries else {
            return;
        };
        if value.is_none() && !self.cache_negative {
            return;
        }

        let displaced = entries.lock().await.push(key.clone(), value);
        if let Some((old_key, _)) = displaced
            && old_key != key
        {
            self.evictions.fetch_add(1, Ordering::Relaxed);
            debug!("{} cache evicted {}", self.name, old_key);
        }
    }

    /// Return the cached outcome or compute, store and return a fresh one
    ///
    /// The cache lock is not held while `compute` runs, so two racing misses
    /// on the same key may both compute; the later write wins.
    pub async fn get_or_compute<F, Fut>(&self, key: String, compute: F) -> AppResult<Option<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<Option<T>>>,
    {
        if let Some(cached) = self.get(&key).await {
            return Ok(cached);
        }

        let value = compute().await?;
        self.insert(key, value.clone()).await;
        Ok(value)
    }

    /// Membership test that leaves recency untouched
    pub async fn contains(&self, key: &str) -> bool {
        match &self.entries {
            Some(entries) => entries.lock().await.peek(key).is_some(),
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        match &self.entries {
            Some(entries) => entries.lock().await.len(),
            None => 0,
        }
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            capacity: self.capacity,
            entries: self.len().await,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}
