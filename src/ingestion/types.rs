//! Ingestion Data Types
//!
//! Request and response shapes of the admin index API. The request body is an
//! [`IndexedDocument`](crate::search::types::IndexedDocument) as-is.

use serde::{Deserialize, Serialize};

/// Result of an upsert, as reported to the producing service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexOutcome {
    pub message: String,
    /// Store id of the document now holding the content.
    pub upserted_id: String,
    pub matched: u64,
    pub modified: u64,
    pub upserted: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub message: String,
    pub deleted_count: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteParams {
    #[serde(rename = "type")]
    pub content_type: Option<String>,
}
