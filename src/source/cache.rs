use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::{DatasetKind, DatasetLoader, LoadedDataset};
use crate::config::{CacheConfig, MAX_CACHE_TTL_MINUTES};
use crate::dataset::Dataset;
use crate::error::{SamarthError, SamarthResult};

/// Memoizes loaded datasets for the configured time-to-live
///
/// Failed loads are not cached, so the next question retries the fetch.
pub struct DatasetCache {
    cache: Option<Cache<DatasetKind, Arc<Dataset>>>,
}

impl DatasetCache {
    pub fn new(config: &CacheConfig) -> SamarthResult<Self> {
        if !config.enabled {
            return Ok(Self { cache: None });
        }

        let ttl_seconds = config
            .ttl_minutes
            .checked_mul(60)
            .filter(|_| config.ttl_minutes <= MAX_CACHE_TTL_MINUTES)
            .ok_or_else(|| {
                SamarthError::config(format!(
                    "Cache ttl_minutes must be at most {}, got {}",
                    MAX_CACHE_TTL_MINUTES, config.ttl_minutes
                ))
            })?;

        let cache = Cache::builder()
            .max_capacity(DatasetKind::ALL.len() as u64)
            .time_to_live(Duration::from_secs(ttl_seconds))
            .build();

        Ok(Self { cache: Some(cache) })
    }

    /// Cached dataset, or a fresh load through `loader`
    pub async fn get_or_load(&self, kind: DatasetKind, loader: &DatasetLoader) -> LoadedDataset {
        let Some(cache) = &self.cache else {
            return loader.load(kind).await;
        };

        if let Some(dataset) = cache.get(&kind).await {
            debug!("Cache hit for dataset: {}", kind);
            return LoadedDataset {
                kind,
                dataset,
                notice: None,
            };
        }

        debug!("Cache miss for dataset: {}", kind);
        let loaded = loader.load(kind).await;
        if loaded.notice.is_none() {
            cache.insert(kind, loaded.dataset.clone()).await;
        }
        loaded
    }

    /// Drop every cached dataset
    pub fn invalidate_all(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate_all();
            debug!("Dataset cache invalidated");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::dataset::Record;
    use crate::error::{SamarthError, SamarthResult};
    use crate::source::RecordFetcher;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use url::Url;

    struct CountingFetcher {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl RecordFetcher for CountingFetcher {
        async fn fetch_records(&self, _url: &Url) -> SamarthResult<Vec<Record>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(SamarthError::network("offline"));
            }
            Ok(vec![json!({"crop": "Wheat", "msp": 2275}).as_object().cloned().unwrap()])
        }
    }

    fn setup(fail: bool, enabled: bool) -> (Arc<CountingFetcher>, DatasetLoader, DatasetCache) {
        let mut config = AppConfig::default();
        config.cache.enabled = enabled;
        let fetcher = Arc::new(CountingFetcher {
            calls: AtomicUsize::new(0),
            fail,
        });
        let loader = DatasetLoader::new(fetcher.clone(), &config.sources);
        (fetcher, loader, DatasetCache::new(&config.cache).unwrap())
    }

    #[tokio::test]
    async fn test_second_load_is_served_from_cache() {
        let (fetcher, loader, cache) = setup(false, true);

        let first = cache.get_or_load(DatasetKind::Msp, &loader).await;
        let second = cache.get_or_load(DatasetKind::Msp, &loader).await;

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.dataset, second.dataset);
    }

    #[tokio::test]
    async fn test_failed_load_is_not_cached() {
        let (fetcher, loader, cache) = setup(true, true);

        let first = cache.get_or_load(DatasetKind::Msp, &loader).await;
        assert!(first.notice.is_some());
        cache.get_or_load(DatasetKind::Msp, &loader).await;

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let (fetcher, loader, cache) = setup(false, true);

        cache.get_or_load(DatasetKind::Msp, &loader).await;
        cache.invalidate_all();
        cache.get_or_load(DatasetKind::Msp, &loader).await;

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_disabled_cache_always_fetches() {
        let (fetcher, loader, cache) = setup(false, false);

        cache.get_or_load(DatasetKind::Msp, &loader).await;
        cache.get_or_load(DatasetKind::Msp, &loader).await;

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_oversized_ttl_is_a_config_error() {
        let mut config = AppConfig::default().cache;
        config.ttl_minutes = 1_000_000_000;

        let err = DatasetCache::new(&config).err().unwrap();
        assert!(matches!(err, SamarthError::Configuration { .. }));

        config.ttl_minutes = u64::MAX;
        assert!(DatasetCache::new(&config).is_err());
    }
}
