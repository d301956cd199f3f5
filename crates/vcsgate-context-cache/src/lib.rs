//! Per-backend repository factory and context cache.
//!
//! Each backend (git/hg/svn) owns one [`ContextCache`] region, keyed on
//! `(context, path)`. A caller-chosen context id groups repeated calls
//! within one logical request so they reuse a single, potentially
//! expensive, repository handle instead of reopening it per call.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use uuid::Uuid;
use vcsgate_core::{RepoHandle, Wire};

pub const DEFAULT_MAX_CAPACITY: u64 = 100;
pub const DEFAULT_TTL_SECS: u64 = 300;

#[derive(Debug, Clone, Copy)]
pub struct CacheSizing {
    pub max_capacity: u64,
    pub ttl: Duration,
}

impl Default for CacheSizing {
    fn default() -> Self {
        Self {
            max_capacity: DEFAULT_MAX_CAPACITY,
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
        }
    }
}

type CacheKey = (Uuid, PathBuf);

/// A single backend region's context cache. `H` is the concrete repo handle
/// type for that backend (one region per backend: git, hg, svn).
pub struct ContextCache<H: RepoHandle> {
    region: &'static str,
    cache: Cache<CacheKey, Arc<H>>,
}

impl<H: RepoHandle> ContextCache<H> {
    pub fn new(region: &'static str, sizing: CacheSizing) -> Self {
        let cache = Cache::builder()
            .max_capacity(sizing.max_capacity)
            .time_to_live(sizing.ttl)
            .eviction_listener(move |_key, handle: Arc<H>, cause| {
                log::debug!("evicting {region} repo handle ({cause:?})");
                handle.close();
            })
            .build();

        Self { region, cache }
    }

    /// Returns the cached handle for `(context, path)` if present, or
    /// constructs and inserts a new one via `construct`. Concurrent misses
    /// for the same key are deduplicated by the underlying cache so only
    /// one construction wins; the loser's future is simply dropped rather
    /// than its handle being inserted twice.
    pub async fn get_or_construct<F, Fut, E>(
        &self,
        key: CacheKey,
        construct: F,
    ) -> Result<Arc<H>, Arc<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<H, E>>,
        E: std::fmt::Debug + Send + Sync + 'static,
    {
        self.cache
            .try_get_with(key, async move { construct().await.map(Arc::new) })
            .await
    }

    pub fn region(&self) -> &'static str {
        self.region
    }

    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

/// `repo(wire, create=false) -> handle`: the single entry point every
/// backend adapter uses to obtain a repository handle. `construct` performs
/// the backend-specific open (or creation, when `create` is true);
/// caching happens only when `wire.wants_cache()`.
pub struct RepoFactory<H: RepoHandle> {
    cache: ContextCache<H>,
}

impl<H: RepoHandle> RepoFactory<H> {
    pub fn new(region: &'static str, sizing: CacheSizing) -> Self {
        Self {
            cache: ContextCache::new(region, sizing),
        }
    }

    pub async fn repo<F, Fut, E>(&self, wire: &Wire, construct: F) -> Result<Arc<H>, Arc<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<H, E>>,
        E: std::fmt::Debug + Send + Sync + 'static,
    {
        if wire.wants_cache() {
            let context = wire.context.expect("wants_cache implies context is set");
            let key = (context, wire.path.clone());
            self.cache.get_or_construct(key, construct).await
        } else {
            construct().await.map(Arc::new).map_err(Arc::new)
        }
    }

    pub fn cache(&self) -> &ContextCache<H> {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct TestHandle(usize);

    impl RepoHandle for TestHandle {
        fn region(&self) -> &'static str {
            "test"
        }
    }

    #[tokio::test]
    async fn same_context_and_path_reuses_the_handle() {
        let factory = RepoFactory::<TestHandle>::new("test", CacheSizing::default());
        let constructed = AtomicUsize::new(0);

        let ctx = Uuid::new_v4();
        let wire = Wire::new("/repo").with_context(ctx);

        let h1 = factory
            .repo(&wire, || async {
                constructed.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Infallible>(TestHandle(1))
            })
            .await
            .unwrap();

        let h2 = factory
            .repo(&wire, || async {
                constructed.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Infallible>(TestHandle(2))
            })
            .await
            .unwrap();

        assert!(Arc::ptr_eq(&h1, &h2));
        assert_eq!(constructed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_context_never_caches() {
        let factory = RepoFactory::<TestHandle>::new("test", CacheSizing::default());
        let constructed = AtomicUsize::new(0);

        let wire = Wire::new("/repo");

        let _h1 = factory
            .repo(&wire, || async {
                constructed.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Infallible>(TestHandle(1))
            })
            .await
            .unwrap();

        let _h2 = factory
            .repo(&wire, || async {
                constructed.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Infallible>(TestHandle(2))
            })
            .await
            .unwrap();

        assert_eq!(constructed.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn different_contexts_get_different_handles() {
        let factory = RepoFactory::<TestHandle>::new("test", CacheSizing::default());

        let wire_a = Wire::new("/repo").with_context(Uuid::new_v4());
        let wire_b = Wire::new("/repo").with_context(Uuid::new_v4());

        let h1 = factory
            .repo(&wire_a, || async { Ok::<_, Infallible>(TestHandle(1)) })
            .await
            .unwrap();
        let h2 = factory
            .repo(&wire_b, || async { Ok::<_, Infallible>(TestHandle(2)) })
            .await
            .unwrap();

        assert!(!Arc::ptr_eq(&h1, &h2));
    }
}
