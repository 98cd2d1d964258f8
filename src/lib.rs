//! Content Search Service Library
//!
//! Full-text search, autocomplete and trending terms over a shared index of
//! user-generated content (posts, communities, users, comments). The binary
//! (`main.rs`) builds the components defined here and serves them over HTTP.
//!
//! ## Architecture Modules
//! - **`search`**: The query side. Search, suggestions and trending terms,
//!   each cached and bounded by a deadline.
//! - **`ingestion`**: The write side. Idempotent upserts on the
//!   `(content_id, content_type)` natural key and bulk deletes.
//! - **`storage`**: The document store seam. Query and aggregation
//!   descriptors plus an in-memory store that evaluates them.
//! - **`cache`**: Fail-open cache-aside gateway, deterministic keys and an
//!   in-memory TTL backend.
//! - **`auth`**: Service-key and bearer-token guards.
//! - **`app`**: The axum router.
//! - **`config`**: Environment-driven settings.
//! - **`error`**: The API error taxonomy and its HTTP mapping.

pub mod app;
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod ingestion;
pub mod search;
pub mod storage;
