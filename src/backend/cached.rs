use crate::backend::{BackendApi, BackendError};
use crate::config::CacheConfig;
use crate::models::{Handle, Period, StatsKey, StatsResult};
use crate::session::Session;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Statistics reads memoized per (handle, period) for a freshness window
pub struct CachedStats {
    /// Underlying Backend API
    inner: Arc<dyn BackendApi>,
    /// Fresh results; failures are never inserted
    cache: Cache<StatsKey, Arc<StatsResult>>,
}

impl CachedStats {
    pub fn new(inner: Arc<dyn BackendApi>, max_entries: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();

        Self { inner, cache }
    }

    pub fn from_config(inner: Arc<dyn BackendApi>, config: &CacheConfig) -> Self {
        Self::new(inner, config.max_entries, config.ttl())
    }

    /// Cached read. Concurrent callers for the same missing key share one
    /// backend call; an error is returned to all of them and nothing is cached.
    pub async fn get_stats(
        &self,
        handle: &Handle,
        period: Period,
        session: &Session,
    ) -> Result<Arc<StatsResult>, Arc<BackendError>> {
        let key = StatsKey::new(handle, period);

        let inner = Arc::clone(&self.inner);
        let credential = session.credential().cloned();
        let fetch = async move {
            debug!(handle = %handle, period = %period, "stats cache miss, fetching");
            inner
                .fetch_stats(handle, period, credential.as_ref())
                .await
                .map(Arc::new)
        };

        self.cache.try_get_with(key, fetch).await
    }

    /// Fresh cached value without touching the backend
    pub async fn peek(&self, handle: &Handle, period: Period) -> Option<Arc<StatsResult>> {
        self.cache.get(&StatsKey::new(handle, period)).await
    }

    pub async fn invalidate(&self, handle: &Handle, period: Period) {
        self.cache.invalidate(&StatsKey::new(handle, period)).await;
    }

    /// Drop every period cached for a handle
    pub async fn invalidate_handle(&self, handle: &Handle) {
        for period in Period::ALL {
            self.invalidate(handle, period).await;
        }
    }
}
