use super::CacheStore;

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;

const DEFAULT_CAPACITY: usize = 10_000;

struct CachedValue {
    bytes: Vec<u8>,
    expires_at: Instant,
}

/// Process-local key-value cache with per-entry TTL.
///
/// Expired entries are dropped lazily on read, and in bulk once the map grows
/// past its capacity.
pub struct MemoryCache {
    entries: DashMap<String, CachedValue>,
    capacity: usize,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict(&self, now: Instant) {
        self.entries.retain(|_, value| value.expires_at > now);
        if self.entries.len() >= self.capacity {
            // Still full of live entries: start over rather than grow unbounded.
            self.entries.clear();
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let now = Instant::now();
        let hit = match self.entries.get(key) {
            Some(entry) if entry.expires_at > now => return Ok(Some(entry.bytes.clone())),
            Some(_) => true,
            None => false,
        };
        if hit {
            self.entries.remove_if(key, |_, value| value.expires_at <= now);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, bytes: Vec<u8>, ttl: Duration) -> Result<()> {
        let now = Instant::now();
        if self.entries.len() >= self.capacity {
            self.evict(now);
        }
        self.entries.insert(
            key.to_string(),
            CachedValue {
                bytes,
                expires_at: now + ttl,
            },
        );
        Ok(())
    }
}
