//! Generic in-memory cache with TTL expiration and single-flight write-through loading.
//!
//! This is the trust-plane primitive every other module in this crate builds on: the
//! [`crate::secret::caching::CachingProvider`] decorator keys it by secret name, and
//! service code elsewhere in the tree fronts API configuration lookups with it. It
//! backstops expensive remote lookups so that a herd of concurrent callers arriving at
//! the same TTL boundary collapses into a single upstream call.
//!
//! # Example
//!
//! ```
//! use key_server_secrets::cache::Cache;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let cache: Cache<String> = Cache::new(Duration::from_secs(300));
//!     cache.set("greeting", "hello".to_string());
//!     assert_eq!(cache.lookup("greeting"), Some("hello".to_string()));
//! }
//! ```

use crate::error::{Error, Result};
use dashmap::DashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;

/// A single cached value plus the absolute instant at which it stops being valid.
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at <= now
    }
}

/// Thread-safe, TTL-bounded, single-flight write-through cache.
///
/// Keyed by `String`, holding a value of any `V: Clone + Send + Sync`. Per the source
/// crate's own design notes, a language with generics instantiates one `Cache<V>` per
/// value type at the call site rather than storing `Box<dyn Any>`.
///
/// Readers proceed concurrently via `dashmap`'s sharded locking; a per-key
/// `tokio::sync::Mutex` coalesces concurrent loaders for the same key into one call,
/// the finer-grained substitute for the source's single exclusive lock that the
/// source's design notes explicitly permit.
pub struct Cache<V> {
    ttl: Duration,
    entries: DashMap<String, CacheEntry<V>>,
    inflight: DashMap<String, Arc<AsyncMutex<()>>>,
    stopped: Arc<AtomicBool>,
    sweeper: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl<V> Cache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a cache with the given TTL. Infallible: `Duration` cannot be negative.
    ///
    /// A zero `ttl` is legal - every entry is immediately expired on the next lookup.
    pub fn new(ttl: Duration) -> Arc<Self> {
        let cache = Arc::new(Cache {
            ttl,
            entries: DashMap::new(),
            inflight: DashMap::new(),
            stopped: Arc::new(AtomicBool::new(false)),
            sweeper: std::sync::Mutex::new(None),
        });
        cache.clone().spawn_sweeper();
        cache
    }

    /// Create a cache from a signed millisecond TTL, failing with
    /// [`Error::InvalidConfig`] when negative.
    ///
    /// This is the literal equivalent of the source's `New(ttl)` boundary check
    /// (`New(-1)` fails with `ErrInvalidDuration`); it exists for configuration paths
    /// that parse a possibly-hostile duration, while [`Cache::new`] stays infallible
    /// for ordinary Rust call sites that already hold a `Duration`.
    pub fn try_new_millis(ttl_millis: i64) -> Result<Arc<Self>> {
        if ttl_millis < 0 {
            return Err(Error::InvalidConfig(format!(
                "cache TTL must not be negative, got {}ms",
                ttl_millis
            )));
        }
        Ok(Self::new(Duration::from_millis(ttl_millis as u64)))
    }

    fn spawn_sweeper(self: Arc<Self>) {
        // Wake at half the TTL (bounded below so a zero/short TTL doesn't spin) and
        // drop anything that expired since it was sampled. The CAS against the
        // sampled `expires_at` guards against a concurrent `Set`/reload racing the
        // sweep: if the entry was refreshed after we sampled it, we must not evict
        // the fresher value.
        let interval = (self.ttl / 2).max(Duration::from_millis(50));
        let stopped = self.stopped.clone();
        let weak = Arc::downgrade(&self);
        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                if stopped.load(Ordering::Acquire) {
                    return;
                }
                let Some(cache) = weak.upgrade() else {
                    return;
                };
                let now = Instant::now();
                let expired: Vec<(String, Instant)> = cache
                    .entries
                    .iter()
                    .filter(|e| e.is_expired(now))
                    .map(|e| (e.key().clone(), e.expires_at))
                    .collect();
                for (key, sampled_expiry) in expired {
                    cache
                        .entries
                        .remove_if(&key, |_, entry| entry.expires_at == sampled_expiry);
                }
            }
        });
        *self.sweeper.lock().unwrap() = Some(handle);
    }

    /// Unconditionally store `value`, expiring at `now + ttl`.
    pub fn set(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + self.ttl,
        };
        trace!("cache SET {}", key);
        self.entries.insert(key, entry);
    }

    /// Return the cached value iff an unexpired entry exists.
    ///
    /// An observed-expired entry is removed as a side effect (lazy expiration).
    pub fn lookup(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired(now) {
                trace!("cache GET {} -> HIT", key);
                return Some(entry.value.clone());
            }
        } else {
            return None;
        }
        // Expired: drop it. A racing refresh between the read above and this remove
        // is resolved by the CAS-style remove_if used by the sweeper; a plain lookup
        // removal here is best-effort and a lost race just means the entry survives
        // one extra lookup cycle.
        trace!("cache GET {} -> EXPIRED", key);
        self.entries.remove(key);
        None
    }

    /// Number of map entries, including any not yet swept past their TTL.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// Empty the map. Does not affect in-flight loaders: one may still store its own
    /// result shortly after `clear()` returns, which is an accepted race per the
    /// source's own contract.
    pub fn clear(&self) {
        warn!("cache CLEAR: {} entries dropped", self.entries.len());
        self.entries.clear();
    }

    /// Halt the background sweeper. Idempotent.
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(handle) = self.sweeper.lock().unwrap().take() {
            handle.abort();
        }
    }

    /// Return the cached value if present and unexpired; otherwise run `loader` at
    /// most once across all concurrent callers racing on the same `key`, store its
    /// success (including a "cached absence" empty/default value), and return it to
    /// every waiter. A loader error is never cached - the next call re-attempts.
    pub async fn write_thru_lookup<F, Fut>(&self, key: &str, loader: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        if let Some(value) = self.lookup(key) {
            return Ok(value);
        }

        let lock = self
            .inflight
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // Double-check: the leader that held the lock before us may already have
        // populated the cache.
        if let Some(value) = self.lookup(key) {
            return Ok(value);
        }

        let result = loader().await;
        if let Ok(ref value) = result {
            self.set(key, value.clone());
        }
        // The inflight entry is left in place intentionally: removing it here would
        // race a new waiter inserting a fresh lock for the same key mid-load, which
        // is harmless but needlessly reallocates. It is bounded by key cardinality,
        // not by call volume.
        result
    }
}

impl<V> Drop for Cache<V> {
    fn drop(&mut self) {
        if let Some(handle) = self.sweeper.lock().unwrap().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use std::time::Duration;

    #[tokio::test]
    async fn test_set_then_lookup_within_ttl() {
        let cache: Arc<Cache<String>> = Cache::new(Duration::from_secs(60));
        cache.set("foo", "bar".to_string());
        assert_eq!(cache.lookup("foo"), Some("bar".to_string()));
    }

    #[tokio::test]
    async fn test_lookup_miss() {
        let cache: Arc<Cache<String>> = Cache::new(Duration::from_secs(60));
        assert_eq!(cache.lookup("missing"), None);
    }

    #[tokio::test]
    async fn test_expiry() {
        let cache: Arc<Cache<String>> = Cache::new(Duration::from_millis(50));
        cache.set("foo", "bar".to_string());
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(cache.lookup("foo"), None);
    }

    #[tokio::test]
    async fn test_zero_ttl_is_immediately_expired() {
        let cache: Arc<Cache<String>> = Cache::new(Duration::ZERO);
        cache.set("foo", "bar".to_string());
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(cache.lookup("foo"), None);
    }

    #[tokio::test]
    async fn test_try_new_millis_rejects_negative() {
        let err = Cache::<String>::try_new_millis(-1).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn test_try_new_millis_accepts_zero() {
        assert!(Cache::<String>::try_new_millis(0).is_ok());
    }

    #[tokio::test]
    async fn test_clear_resets_size() {
        let cache: Arc<Cache<String>> = Cache::new(Duration::from_secs(60));
        cache.set("a", "1".to_string());
        cache.set("b", "2".to_string());
        assert_eq!(cache.size(), 2);
        cache.clear();
        assert_eq!(cache.size(), 0);
    }

    #[tokio::test]
    async fn test_write_thru_lookup_caches_successful_value() {
        let cache: Arc<Cache<String>> = Cache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();
        let value = cache
            .write_thru_lookup("k", || async move {
                calls_clone.fetch_add(1, Ordering::SeqCst);
                Ok("loaded".to_string())
            })
            .await
            .unwrap();
        assert_eq!(value, "loaded");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Second call should hit the cache, not the loader.
        let value = cache
            .write_thru_lookup("k", || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok("should-not-run".to_string())
            })
            .await
            .unwrap();
        assert_eq!(value, "loaded");
    }

    #[tokio::test]
    async fn test_write_thru_lookup_does_not_cache_errors() {
        let cache: Arc<Cache<String>> = Cache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicU32::new(0));

        let calls_clone = calls.clone();
        let result = cache
            .write_thru_lookup("k", || async move {
                calls_clone.fetch_add(1, Ordering::SeqCst);
                Err(Error::Other("boom".to_string()))
            })
            .await;
        assert!(result.is_err());

        let calls_clone = calls.clone();
        let result = cache
            .write_thru_lookup("k", || async move {
                calls_clone.fetch_add(1, Ordering::SeqCst);
                Ok("recovered".to_string())
            })
            .await
            .unwrap();
        assert_eq!(result, "recovered");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_write_thru_lookup_caches_empty_value() {
        let cache: Arc<Cache<String>> = Cache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicU32::new(0));

        let calls_clone = calls.clone();
        let value = cache
            .write_thru_lookup("k", || async move {
                calls_clone.fetch_add(1, Ordering::SeqCst);
                Ok(String::new())
            })
            .await
            .unwrap();
        assert_eq!(value, "");

        let calls_clone = calls.clone();
        let value = cache
            .write_thru_lookup("k", || async move {
                calls_clone.fetch_add(1, Ordering::SeqCst);
                Ok("should-not-run".to_string())
            })
            .await
            .unwrap();
        assert_eq!(value, "");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_single_flight_coalesces_concurrent_loaders() {
        let cache: Arc<Cache<u64>> = Cache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..10 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .write_thru_lookup("shared", || async move {
                        tokio::time::sleep(Duration::from_millis(250)).await;
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok::<u64, Error>(42)
                    })
                    .await
                    .unwrap()
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let cache: Arc<Cache<String>> = Cache::new(Duration::from_secs(60));
        cache.stop();
        cache.stop();
    }
}
