//! HTTP Router
//!
//! Wires the handlers, the shared components and the auth guards into a
//! single axum [`Router`]. `main.rs` only builds the components and serves.

use crate::auth::{AuthConfig, require_bearer, require_service_key};
use crate::ingestion::handlers::{handle_delete, handle_index};
use crate::ingestion::indexer::Indexer;
use crate::search::engine::SearchEngine;
use crate::search::handlers::{handle_health, handle_recommend, handle_search, handle_trending};

use axum::extract::Request;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Extension, Router};
use std::sync::Arc;

const CORS_ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const CORS_ALLOW_HEADERS: &str = "Origin, Content-Type, Content-Length, Accept-Encoding, X-CSRF-Token, Authorization, X-Service-API-Key";

pub fn build_router(
    engine: Arc<SearchEngine>,
    indexer: Arc<Indexer>,
    auth: Arc<AuthConfig>,
) -> Router {
    let admin = Router::new()
        .route("/api/search/admin/index", post(handle_index))
        .route("/api/search/admin/index/:id", delete(handle_delete))
        .route_layer(middleware::from_fn_with_state(
            auth.clone(),
            require_service_key,
        ));

    let protected = Router::new()
        .route("/api/search/advanced", get(handle_search))
        .route_layer(middleware::from_fn_with_state(auth, require_bearer));

    Router::new()
        .route("/api/search", get(handle_search))
        .route("/api/search/recommend", get(handle_recommend))
        .route("/api/search/trending", get(handle_trending))
        .route("/health", get(handle_health))
        .merge(protected)
        .merge(admin)
        .layer(Extension(engine))
        .layer(Extension(indexer))
        .layer(middleware::from_fn(cors))
}

/// Allows every origin. Preflight requests are answered here with 204.
async fn cors(request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(CORS_ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(CORS_ALLOW_HEADERS),
    );
    response
}
