//! Decorator over a [`Provider`] that consults a [`Cache`] for TTL-bounded reuse.

use crate::cache::Cache;
use crate::error::Result;
use crate::secret::provider::Provider;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Wraps `inner`, routing `get_secret_value` through a [`Cache`] keyed by secret name.
///
/// The inner provider's errors propagate unchanged and are never cached - a transient
/// backend failure on one call must not poison subsequent lookups for the TTL window.
pub struct CachingProvider<P> {
    inner: P,
    cache: Arc<Cache<String>>,
}

impl<P: Provider> CachingProvider<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        CachingProvider {
            inner,
            cache: Cache::new(ttl),
        }
    }
}

#[async_trait]
impl<P: Provider> Provider for CachingProvider<P> {
    async fn get_secret_value(&self, name: &str) -> Result<String> {
        let inner = &self.inner;
        self.cache
            .write_thru_lookup(name, || async move { inner.get_secret_value(name).await })
            .await
    }

    async fn create_secret_version(&self, parent: &str, payload: &[u8]) -> Result<String> {
        self.inner.create_secret_version(parent, payload).await
    }

    async fn destroy_secret_version(&self, reference: &str) -> Result<()> {
        self.inner.destroy_secret_version(reference).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::secret::backend::inmemory::InMemoryProvider;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingProvider {
        inner: InMemoryProvider,
        calls: Arc<AtomicU32>,
    }

    #[async_trait]
    impl Provider for CountingProvider {
        async fn get_secret_value(&self, name: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.get_secret_value(name).await
        }
    }

    #[tokio::test]
    async fn test_caches_successful_lookup() {
        let inmemory = InMemoryProvider::new();
        inmemory.insert("db-password", "hunter2");
        let calls = Arc::new(AtomicU32::new(0));
        let provider = CachingProvider::new(
            CountingProvider {
                inner: inmemory,
                calls: calls.clone(),
            },
            Duration::from_secs(60),
        );

        assert_eq!(
            provider.get_secret_value("db-password").await.unwrap(),
            "hunter2"
        );
        assert_eq!(
            provider.get_secret_value("db-password").await.unwrap(),
            "hunter2"
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_does_not_cache_inner_errors() {
        let inmemory = InMemoryProvider::new();
        let calls = Arc::new(AtomicU32::new(0));
        let provider = CachingProvider::new(
            CountingProvider {
                inner: inmemory,
                calls: calls.clone(),
            },
            Duration::from_secs(60),
        );

        assert!(matches!(
            provider.get_secret_value("missing").await,
            Err(Error::ProviderFailure(_))
        ));
        assert!(matches!(
            provider.get_secret_value("missing").await,
            Err(Error::ProviderFailure(_))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
