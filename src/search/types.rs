use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of content a document was indexed from.
///
/// The four built-in kinds cover the platform today; anything else is carried
/// verbatim in `Other` so new producers can index without a release here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContentType {
    Post,
    Community,
    User,
    Comment,
    Other(String),
}

impl ContentType {
    pub fn as_str(&self) -> &str {
        match self {
            ContentType::Post => "post",
            ContentType::Community => "community",
            ContentType::User => "user",
            ContentType::Comment => "comment",
            ContentType::Other(other) => other,
        }
    }
}

impl From<String> for ContentType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "post" => ContentType::Post,
            "community" => ContentType::Community,
            "user" => ContentType::User,
            "comment" => ContentType::Comment,
            _ => ContentType::Other(value),
        }
    }
}

impl From<&str> for ContentType {
    fn from(value: &str) -> Self {
        ContentType::from(value.to_string())
    }
}

impl From<ContentType> for String {
    fn from(value: ContentType) -> Self {
        match value {
            ContentType::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One searchable unit as stored in the document store.
///
/// `(content_id, content_type)` is the natural key used for upserts; `id` is
/// the opaque store identifier and never changes once the document exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedDocument {
    #[serde(default)]
    pub id: String,
    pub content_id: String,
    pub content_type: ContentType,
    #[serde(default)]
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub indexed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub autocomplete_phrases: Vec<String>,
    #[serde(default)]
    pub popularity_score: f64,
    /// Relevance projected by the store on read. Never written back.
    #[serde(default, skip_serializing)]
    pub score: f64,
}

/// Response-only projection of an [`IndexedDocument`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub content_id: String,
    pub content_type: ContentType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    pub snippet: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub score: f64,
    /// Reserved for query-term highlighting; always empty for now.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub highlights: Vec<String>,
}

/// Search envelope. Input parameters are echoed back for client-side correlation.
///
/// `total` counts the results on this page only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub page: usize,
    pub size: usize,
    pub total: usize,
    pub query: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<ContentType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionResponse {
    pub suggestions: Vec<String>,
    pub prefix: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<ContentType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingTerm {
    pub term: String,
    pub score: f64,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingResponse {
    pub trending: Vec<TrendingTerm>,
    pub count: usize,
    pub limit: usize,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<ContentType>,
}
