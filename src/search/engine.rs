use super::query::{PageLimits, Pagination};
use super::snippet::create_snippet;
use super::types::{ContentType, IndexedDocument, SearchResponse, SearchResult};
use crate::cache::gateway::{CacheGateway, CacheTier};
use crate::cache::keys::CacheKey;
use crate::error::SearchError;
use crate::storage::protocol::{FIELD_CONTENT_TYPE, Filter, FindOptions, SortOrder};
use crate::storage::store::{DocumentStore, with_deadline};

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

pub const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub content_type: Option<ContentType>,
    pub pagination: Pagination,
}

/// Query-side orchestrator: search, suggestions and trending terms.
///
/// Holds the shared store and cache handles created at startup. Suggestions
/// and trending live in `recommend.rs` and `trending.rs`.
pub struct SearchEngine {
    pub(crate) store: Arc<dyn DocumentStore>,
    pub(crate) cache: CacheGateway,
    page_limits: PageLimits,
}

impl SearchEngine {
    pub fn new(store: Arc<dyn DocumentStore>, cache: CacheGateway) -> Self {
        Self::with_page_limits(store, cache, PageLimits::default())
    }

    pub fn with_page_limits(
        store: Arc<dyn DocumentStore>,
        cache: CacheGateway,
        page_limits: PageLimits,
    ) -> Self {
        Self {
            store,
            cache,
            page_limits,
        }
    }

    pub fn page_limits(&self) -> &PageLimits {
        &self.page_limits
    }

    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError> {
        if request.query.is_empty() {
            return Err(SearchError::validation("Search query is required"));
        }

        let key = CacheKey::search(
            &request.query,
            request.content_type.as_ref(),
            &request.pagination,
        );
        if let Some(cached) = self.cache.get::<SearchResponse>(&key).await {
            return Ok(cached);
        }

        let filter = search_filter(&request.query, request.content_type.as_ref());
        let options = search_options(&request.pagination);

        let raw = with_deadline("search", SEARCH_TIMEOUT, self.store.find(&filter, &options))
            .await
            .map_err(|e| {
                tracing::error!("Search error: {}", e);
                SearchError::backend("Failed to execute search")
            })?;

        let results: Vec<SearchResult> = decode_documents(raw, "search result")
            .into_iter()
            .map(|doc| to_search_result(doc, &request.query))
            .collect();

        let response = SearchResponse {
            total: results.len(),
            results,
            page: request.pagination.page,
            size: request.pagination.page_size,
            query: request.query.clone(),
            content_type: request.content_type.clone(),
        };

        self.cache.put(&key, &response, CacheTier::Results);

        Ok(response)
    }
}

pub fn search_filter(query: &str, content_type: Option<&ContentType>) -> Filter {
    Filter::Text {
        search: query.to_string(),
    }
    .and(content_type_filter(content_type))
}

pub fn search_options(pagination: &Pagination) -> FindOptions {
    FindOptions {
        skip: pagination.skip(),
        limit: Some(pagination.page_size),
        sort: SortOrder::RelevanceDesc,
        project_score: true,
    }
}

pub(crate) fn content_type_filter(content_type: Option<&ContentType>) -> Filter {
    match content_type {
        Some(content_type) => Filter::eq(FIELD_CONTENT_TYPE, content_type.as_str()),
        None => Filter::All,
    }
}

/// Decodes raw store documents, logging and skipping any that do not parse.
pub(crate) fn decode_documents(raw: Vec<Value>, context: &str) -> Vec<IndexedDocument> {
    raw.into_iter()
        .filter_map(|value| match serde_json::from_value::<IndexedDocument>(value) {
            Ok(doc) => Some(doc),
            Err(e) => {
                tracing::warn!("Error decoding {}: {}", context, e);
                None
            }
        })
        .collect()
}

fn to_search_result(doc: IndexedDocument, query: &str) -> SearchResult {
    SearchResult {
        snippet: create_snippet(&doc.content, query),
        id: doc.id,
        content_id: doc.content_id,
        content_type: doc.content_type,
        title: doc.title,
        author: doc.author,
        created_at: doc.created_at,
        updated_at: doc.updated_at,
        score: doc.score,
        highlights: Vec::new(),
    }
}
