use crate::search::query::Pagination;
use crate::search::types::ContentType;
use std::fmt;

const DELIMITER: char = ':';

/// Cache key namespaces, one per cached operation.
pub const NS_SEARCH: &str = "search";
pub const NS_SUGGESTIONS: &str = "suggestions";
pub const NS_TRENDING: &str = "trending";

/// Deterministic cache key built from already-normalized parameters.
///
/// Free-text components are escaped so a `:` typed by a user can never shift
/// the boundary between two parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn build(namespace: &str, parts: &[&str]) -> Self {
        let mut key = String::from(namespace);
        for part in parts {
            key.push(DELIMITER);
            key.push_str(&escape(part));
        }
        Self(key)
    }

    pub fn search(query: &str, content_type: Option<&ContentType>, pagination: &Pagination) -> Self {
        Self::build(
            NS_SEARCH,
            &[
                query,
                type_part(content_type),
                &pagination.page.to_string(),
                &pagination.page_size.to_string(),
            ],
        )
    }

    pub fn suggestions(prefix: &str, content_type: Option<&ContentType>) -> Self {
        Self::build(NS_SUGGESTIONS, &[prefix, type_part(content_type)])
    }

    pub fn trending(content_type: Option<&ContentType>, limit: usize) -> Self {
        Self::build(NS_TRENDING, &[type_part(content_type), &limit.to_string()])
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn type_part(content_type: Option<&ContentType>) -> &str {
    content_type.map(ContentType::as_str).unwrap_or("")
}

fn escape(part: &str) -> String {
    let mut out = String::with_capacity(part.len());
    for c in part.chars() {
        match c {
            '%' => out.push_str("%25"),
            DELIMITER => out.push_str("%3A"),
            other => out.push(other),
        }
    }
    out
}
