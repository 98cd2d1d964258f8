//! Response Cache Module
//!
//! Cache-aside layer in front of the document store. The cache is an
//! optimization only: any failure degrades to a miss.
//!
//! ## Submodules
//! - **`keys`**: deterministic, namespaced cache keys.
//! - **`gateway`**: fail-open read/write wrapper with TTL tiers.
//! - **`memory`**: process-local TTL backend.

pub mod gateway;
pub mod keys;
pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Key-value backend storing serialized payloads with a TTL.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    async fn set(&self, key: &str, bytes: Vec<u8>, ttl: Duration) -> Result<()>;
}
