use super::engine::{SearchEngine, SearchRequest};
use super::query::{Pagination, normalize_content_type, normalize_limit};
use super::types::{SearchResponse, SuggestionResponse, TrendingResponse};
use crate::error::SearchError;

use axum::extract::Query;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    pub page: Option<String>,
    pub size: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecommendParams {
    pub prefix: Option<String>,
    #[serde(rename = "type")]
    pub content_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TrendingParams {
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    pub limit: Option<String>,
}

pub async fn handle_search(
    Query(params): Query<SearchParams>,
    Extension(engine): Extension<Arc<SearchEngine>>,
) -> Result<Json<SearchResponse>, SearchError> {
    let request = SearchRequest {
        query: params.q.unwrap_or_default(),
        content_type: normalize_content_type(params.content_type.as_deref()),
        pagination: Pagination::from_raw(
            params.page.as_deref(),
            params.size.as_deref(),
            engine.page_limits(),
        ),
    };

    let response = engine.search(&request).await?;
    tracing::debug!(
        "Search '{}' page {} returned {} results",
        request.query,
        request.pagination.page,
        response.total
    );
    Ok(Json(response))
}

pub async fn handle_recommend(
    Query(params): Query<RecommendParams>,
    Extension(engine): Extension<Arc<SearchEngine>>,
) -> Result<Json<SuggestionResponse>, SearchError> {
    let prefix = params.prefix.unwrap_or_default();
    let content_type = normalize_content_type(params.content_type.as_deref());

    let response = engine.recommend(&prefix, content_type).await?;
    Ok(Json(response))
}

pub async fn handle_trending(
    Query(params): Query<TrendingParams>,
    Extension(engine): Extension<Arc<SearchEngine>>,
) -> Result<Json<TrendingResponse>, SearchError> {
    let content_type = normalize_content_type(params.content_type.as_deref());
    let limit = normalize_limit(params.limit.as_deref());

    let response = engine.trending(content_type, limit).await?;
    Ok(Json(response))
}

pub async fn handle_health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "search" }))
}
