use super::types::{DeleteOutcome, IndexOutcome};
use crate::error::SearchError;
use crate::search::engine::content_type_filter;
use crate::search::tokenizer::extract_key_phrases;
use crate::search::types::{ContentType, IndexedDocument};
use crate::storage::protocol::{
    FIELD_CONTENT_ID, FIELD_CONTENT_TYPE, Filter, TextIndexSpec, default_indexes,
};
use crate::storage::store::{DocumentStore, with_deadline};

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

pub const INGEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const INDEX_SETUP_TIMEOUT: Duration = Duration::from_secs(30);

const DEFAULT_POPULARITY: f64 = 1.0;

/// Write side of the index: upserts and bulk deletes from trusted producers.
pub struct Indexer {
    store: Arc<dyn DocumentStore>,
}

impl Indexer {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Declares the text index and the secondary indexes. Failures are logged
    /// and skipped; the service still starts.
    pub async fn ensure_indexes(&self) {
        ensure_text_index(self.store.as_ref()).await;

        for spec in default_indexes() {
            match with_deadline(
                "create index",
                INDEX_SETUP_TIMEOUT,
                self.store.create_index(&spec),
            )
            .await
            {
                Ok(()) => tracing::info!("Created index: {}", spec.name),
                Err(e) => tracing::warn!("Failed to create index {}: {}", spec.name, e),
            }
        }

        tracing::info!("Finished initializing search indexes");
    }

    /// Upserts `doc` on its `(content_id, content_type)` natural key.
    pub async fn index(&self, doc: IndexedDocument) -> Result<IndexOutcome, SearchError> {
        if doc.content_id.is_empty() {
            return Err(SearchError::validation("Content ID is required"));
        }
        if doc.content_type.as_str().is_empty() {
            return Err(SearchError::validation("Content type is required"));
        }

        let doc = prepare_document(doc, Utc::now());
        let key = natural_key(&doc.content_id, &doc.content_type);
        let body = serde_json::to_value(&doc).map_err(|e| {
            tracing::error!("Failed to encode document {}: {}", doc.content_id, e);
            SearchError::backend("Failed to index content")
        })?;

        let outcome = with_deadline("index", INGEST_TIMEOUT, self.store.upsert(&key, body))
            .await
            .map_err(|e| {
                tracing::error!("Indexing error: {}", e);
                SearchError::backend("Failed to index content")
            })?;

        tracing::info!(
            "Indexed {}/{} (matched={}, modified={}, upserted={})",
            doc.content_type,
            doc.content_id,
            outcome.matched,
            outcome.modified,
            outcome.upserted
        );

        let store = self.store.clone();
        tokio::spawn(async move {
            ensure_text_index(store.as_ref()).await;
        });

        Ok(IndexOutcome {
            message: "Content indexed successfully".to_string(),
            upserted_id: outcome.document_id,
            matched: outcome.matched,
            modified: outcome.modified,
            upserted: outcome.upserted,
        })
    }

    /// Removes every document for `content_id`, optionally narrowed to one type.
    pub async fn delete(
        &self,
        content_id: &str,
        content_type: Option<ContentType>,
    ) -> Result<DeleteOutcome, SearchError> {
        if content_id.is_empty() {
            return Err(SearchError::validation("Content ID is required"));
        }

        let filter = Filter::eq(FIELD_CONTENT_ID, content_id)
            .and(content_type_filter(content_type.as_ref()));

        let deleted_count = with_deadline("delete", INGEST_TIMEOUT, self.store.delete_many(&filter))
            .await
            .map_err(|e| {
                tracing::error!("Delete error: {}", e);
                SearchError::backend("Failed to delete content from index")
            })?;

        tracing::info!("Deleted {} documents for content {}", deleted_count, content_id);

        Ok(DeleteOutcome {
            message: "Content removed from index successfully".to_string(),
            deleted_count,
        })
    }
}

/// Fills in everything the system owns: ingest time, store id, derived
/// phrases and the popularity default.
pub fn prepare_document(mut doc: IndexedDocument, now: DateTime<Utc>) -> IndexedDocument {
    doc.indexed_at = now;

    if doc.id.is_empty() {
        doc.id = uuid::Uuid::new_v4().to_string();
    }

    if doc.autocomplete_phrases.is_empty() {
        doc.autocomplete_phrases = extract_key_phrases(&doc);
    }

    // Zero, negative and NaN all fall back to the default weight.
    if !(doc.popularity_score > 0.0) {
        doc.popularity_score = DEFAULT_POPULARITY;
    }

    doc
}

pub fn natural_key(content_id: &str, content_type: &ContentType) -> Filter {
    Filter::eq(FIELD_CONTENT_ID, content_id).and(Filter::eq(FIELD_CONTENT_TYPE, content_type.as_str()))
}

async fn ensure_text_index(store: &dyn DocumentStore) {
    let spec = TextIndexSpec::default();
    if let Err(e) = with_deadline(
        "ensure text index",
        INDEX_SETUP_TIMEOUT,
        store.ensure_text_index(&spec),
    )
    .await
    {
        tracing::warn!("Failed to create text index: {}", e);
    }
}
