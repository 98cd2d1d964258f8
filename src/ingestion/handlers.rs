use super::indexer::Indexer;
use super::types::{DeleteOutcome, DeleteParams, IndexOutcome};
use crate::error::SearchError;
use crate::search::query::normalize_content_type;
use crate::search::types::IndexedDocument;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query};
use axum::{Extension, Json};
use std::sync::Arc;

pub async fn handle_index(
    Extension(indexer): Extension<Arc<Indexer>>,
    payload: Result<Json<IndexedDocument>, JsonRejection>,
) -> Result<Json<IndexOutcome>, SearchError> {
    let Json(doc) = payload.map_err(|rejection| {
        tracing::warn!("Rejected index payload: {}", rejection.body_text());
        SearchError::validation(rejection.body_text())
    })?;

    let outcome = indexer.index(doc).await?;
    Ok(Json(outcome))
}

pub async fn handle_delete(
    Path(content_id): Path<String>,
    Query(params): Query<DeleteParams>,
    Extension(indexer): Extension<Arc<Indexer>>,
) -> Result<Json<DeleteOutcome>, SearchError> {
    let content_type = normalize_content_type(params.content_type.as_deref());

    let outcome = indexer.delete(&content_id, content_type).await?;
    Ok(Json(outcome))
}
