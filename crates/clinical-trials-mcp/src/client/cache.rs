//! Response cache with lazy TTL expiry and in-flight request coalescing.
//!
//! Entries carry their own deadline so a single cache can hold values with
//! different lifetimes. Concurrent fetches for the same key share one upstream
//! call; only successes are stored.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared, WeakShared};
use moka::future::Cache;
use serde::Serialize;
use serde_json::Value;
use tokio::time::Instant;

use crate::config::Config;
use crate::error::ToolResult;

type FetchFuture = BoxFuture<'static, ToolResult<Arc<Value>>>;

#[derive(Clone)]
struct CacheEntry {
    value: Arc<Value>,
    expires_at: Instant,
}

/// Counters reported by the readiness endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub disabled: bool,
    pub ttl_ms: u64,
    pub size: u64,
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub evictions: u64,
    pub in_flight: usize,
}

struct Inner {
    entries: Cache<String, CacheEntry>,
    in_flight: Mutex<HashMap<String, (u64, WeakShared<FetchFuture>)>>,
    next_id: AtomicU64,
    default_ttl: Duration,
    disabled: bool,
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
    evictions: AtomicU64,
}

impl Inner {
    fn finish(&self, key: &str, id: u64) {
        let mut map = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if map.get(key).is_some_and(|(current, _)| *current == id) {
            map.remove(key);
        }
    }
}

/// Removes an in-flight registration when its fetch completes or is dropped.
struct InFlightGuard {
    inner: Arc<Inner>,
    key: String,
    id: u64,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.inner.finish(&self.key, self.id);
    }
}

/// Shared response cache. Cloning is cheap and clones share state.
#[derive(Clone)]
pub struct ResponseCache {
    inner: Arc<Inner>,
}

impl ResponseCache {
    /// Create a cache holding at most `max_capacity` entries.
    #[must_use]
    pub fn new(max_capacity: u64, default_ttl: Duration, disabled: bool) -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: Cache::builder().max_capacity(max_capacity).build(),
                in_flight: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(0),
                default_ttl,
                disabled,
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
                sets: AtomicU64::new(0),
                evictions: AtomicU64::new(0),
            }),
        }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.cache_max_size, config.cache_ttl, config.cache_disabled)
    }

    /// True when caching and coalescing are bypassed.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.inner.disabled
    }

    /// Look up a live entry. Expired entries are evicted on read.
    pub async fn get(&self, key: &str) -> Option<Arc<Value>> {
        if self.inner.disabled {
            return None;
        }

        match self.inner.entries.get(key).await {
            Some(entry) if entry.expires_at > Instant::now() => {
                self.inner.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.value)
            }
            Some(_) => {
                self.inner.entries.invalidate(key).await;
                self.inner.evictions.fetch_add(1, Ordering::Relaxed);
                self.inner.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            None => {
                self.inner.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a value. `ttl` overrides the default lifetime for this entry.
    pub async fn set(&self, key: String, value: Arc<Value>, ttl: Option<Duration>) {
        if self.inner.disabled {
            return;
        }

        let expires_at = Instant::now() + ttl.unwrap_or(self.inner.default_ttl);
        self.inner.entries.insert(key, CacheEntry { value, expires_at }).await;
        self.inner.sets.fetch_add(1, Ordering::Relaxed);
    }

    /// Drop every entry. Counters are kept.
    pub async fn clear(&self) {
        self.inner.entries.invalidate_all();
        self.inner.entries.run_pending_tasks().await;
    }

    pub async fn stats(&self) -> CacheStats {
        self.inner.entries.run_pending_tasks().await;
        let in_flight =
            self.inner.in_flight.lock().unwrap_or_else(PoisonError::into_inner).len();

        CacheStats {
            disabled: self.inner.disabled,
            ttl_ms: u64::try_from(self.inner.default_ttl.as_millis()).unwrap_or(u64::MAX),
            size: self.inner.entries.entry_count(),
            hits: self.inner.hits.load(Ordering::Relaxed),
            misses: self.inner.misses.load(Ordering::Relaxed),
            sets: self.inner.sets.load(Ordering::Relaxed),
            evictions: self.inner.evictions.load(Ordering::Relaxed),
            in_flight,
        }
    }

    /// Return a cached value or run `fetch`, sharing one execution between
    /// concurrent callers with the same key.
    ///
    /// A successful result is stored before any waiter observes it. Failures
    /// reach every waiter and are never stored.
    ///
    /// # Errors
    ///
    /// Returns whatever error `fetch` produced.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        key: String,
        ttl: Option<Duration>,
        fetch: F,
    ) -> ToolResult<Arc<Value>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ToolResult<Value>> + Send + 'static,
    {
        if self.inner.disabled {
            return fetch().await.map(Arc::new);
        }

        if let Some(value) = self.get(&key).await {
            return Ok(value);
        }

        let shared = self.join_or_start(key, ttl, fetch);
        shared.await
    }

    fn join_or_start<F, Fut>(
        &self,
        key: String,
        ttl: Option<Duration>,
        fetch: F,
    ) -> Shared<FetchFuture>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ToolResult<Value>> + Send + 'static,
    {
        let mut map = self.inner.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = map.get(&key).and_then(|(_, weak)| weak.upgrade()) {
            tracing::debug!(key = %key, "joining in-flight request");
            return existing;
        }

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let guard = InFlightGuard { inner: Arc::clone(&self.inner), key: key.clone(), id };
        let cache = self.clone();
        let store_key = key.clone();
        let upstream = fetch();

        let shared = async move {
            let _guard = guard;
            let value = Arc::new(upstream.await?);
            cache.set(store_key, Arc::clone(&value), ttl).await;
            Ok(value)
        }
        .boxed()
        .shared();

        if let Some(weak) = shared.downgrade() {
            map.insert(key, (id, weak));
        }
        shared
    }
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("disabled", &self.inner.disabled)
            .field("default_ttl", &self.inner.default_ttl)
            .finish_non_exhaustive()
    }
}
