//! Search Service Module
//!
//! Query side of the service: free-text search, autocomplete and trending terms.
//!
//! ## Overview
//! Requests are normalized, looked up in the response cache, and on a miss
//! turned into store descriptors. Matching and ranking happen in the document
//! store; this module shapes the results (snippets, suggestion dedup,
//! trending rows) and writes them back to the cache.
//!
//! ## Submodules
//! - **`engine`**: `SearchEngine` and the search orchestration.
//! - **`recommend`**: prefix suggestions assembled client-side from candidate documents.
//! - **`trending`**: aggregation pipeline over autocomplete phrases.
//! - **`query`**: pagination, filter and limit normalization.
//! - **`snippet`**: bounded content previews.
//! - **`tokenizer`**: word splitting and autocomplete phrase extraction.
//! - **`handlers`**: HTTP request handlers for the Axum web server.
//! - **`types`**: documents and response envelopes.

pub mod engine;
pub mod handlers;
pub mod query;
pub mod recommend;
pub mod snippet;
pub mod tokenizer;
pub mod trending;
pub mod types;
