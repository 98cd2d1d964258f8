use super::protocol::*;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

/// Document store with text search and aggregation.
///
/// Implementations must be safe for concurrent use; one handle is created at
/// startup and shared by every request. Single-document upserts and deletes
/// are expected to be atomic in the store itself.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Documents matching `filter`, shaped by `options`, as raw JSON.
    async fn find(&self, filter: &Filter, options: &FindOptions) -> Result<Vec<Value>>;

    /// Runs the pipeline over every stored document.
    async fn aggregate(&self, pipeline: &[Stage]) -> Result<Vec<Value>>;

    /// Sets the fields of `document` on the first document matching `key`,
    /// or inserts it when nothing matches. The store id of an existing
    /// document is never replaced.
    async fn upsert(&self, key: &Filter, document: Value) -> Result<UpsertOutcome>;

    /// Removes every matching document and returns how many were removed.
    async fn delete_many(&self, filter: &Filter) -> Result<u64>;

    /// Idempotent. Fails only when a different text index already exists.
    async fn ensure_text_index(&self, spec: &TextIndexSpec) -> Result<()>;

    /// Idempotent.
    async fn create_index(&self, spec: &IndexSpec) -> Result<()>;
}

/// Bounds a store call. Running past `limit` is reported as an error, the
/// same as any other store failure.
pub async fn with_deadline<T, F>(operation: &str, limit: Duration, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(anyhow::anyhow!(
            "{} timed out after {}ms",
            operation,
            limit.as_millis()
        )),
    }
}
