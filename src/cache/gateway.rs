use super::CacheStore;
use super::keys::CacheKey;

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// TTL tier of a cached payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTier {
    /// Search pages and suggestions.
    Results,
    /// Trending terms; the underlying aggregate moves slowly.
    Trending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    pub results_ttl: Duration,
    pub trending_ttl: Duration,
    /// Upper bound on a single backend call.
    pub timeout: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            results_ttl: Duration::from_secs(10 * 60),
            trending_ttl: Duration::from_secs(60 * 60),
            timeout: Duration::from_millis(500),
        }
    }
}

/// Cache-aside wrapper that fails open.
///
/// Reads return `None` on miss, on backend error, on timeout and on payloads
/// that no longer decode. Writes are best effort and run in the background.
/// Neither ever returns an error to the caller.
#[derive(Clone)]
pub struct CacheGateway {
    backend: Option<Arc<dyn CacheStore>>,
    settings: CacheSettings,
}

impl CacheGateway {
    pub fn new(backend: Arc<dyn CacheStore>, settings: CacheSettings) -> Self {
        Self {
            backend: Some(backend),
            settings,
        }
    }

    /// Gateway with no backend: every lookup is a miss.
    pub fn disabled() -> Self {
        Self {
            backend: None,
            settings: CacheSettings::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    pub fn ttl(&self, tier: CacheTier) -> Duration {
        match tier {
            CacheTier::Results => self.settings.results_ttl,
            CacheTier::Trending => self.settings.trending_ttl,
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let Some(backend) = self.backend.as_ref() else {
            tracing::debug!("Cache not configured, skipping lookup for {}", key);
            return None;
        };

        let bytes = match tokio::time::timeout(self.settings.timeout, backend.get(key.as_str())).await
        {
            Ok(Ok(Some(bytes))) => bytes,
            Ok(Ok(None)) => {
                tracing::debug!("Cache miss: {}", key);
                return None;
            }
            Ok(Err(e)) => {
                tracing::warn!("Cache lookup failed for {}: {}", key, e);
                return None;
            }
            Err(_) => {
                tracing::warn!("Cache lookup timed out for {}", key);
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => {
                tracing::debug!("Cache hit: {}", key);
                Some(value)
            }
            Err(e) => {
                tracing::warn!("Discarding undecodable cache entry {}: {}", key, e);
                None
            }
        }
    }

    /// Serializes `value` now and writes it in the background, so a slow or
    /// hung backend never delays the caller. The handle is only needed by
    /// callers that want to observe the write.
    pub fn put<T: Serialize>(
        &self,
        key: &CacheKey,
        value: &T,
        tier: CacheTier,
    ) -> Option<JoinHandle<()>> {
        let Some(backend) = self.backend.clone() else {
            tracing::debug!("Cache not configured, skipping store for {}", key);
            return None;
        };

        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Failed to serialize cache entry {}: {}", key, e);
                return None;
            }
        };

        let key = key.clone();
        let ttl = self.ttl(tier);
        let limit = self.settings.timeout;
        Some(tokio::spawn(async move {
            match tokio::time::timeout(limit, backend.set(key.as_str(), bytes, ttl)).await {
                Ok(Ok(())) => tracing::debug!("Cached {} for {}s", key, ttl.as_secs()),
                Ok(Err(e)) => tracing::warn!("Failed to cache {}: {}", key, e),
                Err(_) => tracing::warn!("Cache store timed out for {}", key),
            }
        }))
    }
}
