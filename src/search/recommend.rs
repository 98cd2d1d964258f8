use super::engine::{SearchEngine, content_type_filter, decode_documents};
use super::types::{ContentType, IndexedDocument, SuggestionResponse};
use crate::cache::gateway::CacheTier;
use crate::cache::keys::CacheKey;
use crate::error::SearchError;
use crate::storage::protocol::{FIELD_CONTENT, FIELD_TAGS, FIELD_TITLE, Filter, FindOptions};
use crate::storage::store::with_deadline;

use std::collections::HashSet;
use std::time::Duration;

pub const MAX_SUGGESTIONS: usize = 10;
pub const SUGGEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Content words must be longer than this (in bytes) to be suggested.
const MIN_CONTENT_WORD_LEN: usize = 2;

impl SearchEngine {
    /// Autocomplete suggestions for `prefix`, at most [`MAX_SUGGESTIONS`].
    pub async fn recommend(
        &self,
        prefix: &str,
        content_type: Option<ContentType>,
    ) -> Result<SuggestionResponse, SearchError> {
        if prefix.is_empty() {
            return Err(SearchError::validation("Prefix parameter is required"));
        }

        let key = CacheKey::suggestions(prefix, content_type.as_ref());
        if let Some(cached) = self.cache.get::<SuggestionResponse>(&key).await {
            return Ok(cached);
        }

        let filter = suggestion_filter(prefix, content_type.as_ref());
        let options = FindOptions {
            limit: Some(MAX_SUGGESTIONS),
            ..FindOptions::default()
        };

        let raw = with_deadline("suggest", SUGGEST_TIMEOUT, self.store.find(&filter, &options))
            .await
            .map_err(|e| {
                tracing::error!("Suggest error: {}", e);
                SearchError::backend("Failed to fetch suggestions")
            })?;

        let documents = decode_documents(raw, "suggestion result");
        let response = SuggestionResponse {
            suggestions: collect_suggestions(&documents, prefix, MAX_SUGGESTIONS),
            prefix: prefix.to_string(),
            content_type,
        };

        self.cache.put(&key, &response, CacheTier::Results);

        Ok(response)
    }
}

/// Title prefix OR word-anchored content match OR tag prefix, all case-insensitive.
pub fn suggestion_filter(prefix: &str, content_type: Option<&ContentType>) -> Filter {
    let escaped = regex::escape(prefix);
    Filter::Or(vec![
        Filter::regex_ci(FIELD_TITLE, format!("^{}", escaped)),
        Filter::regex_ci(FIELD_CONTENT, format!(r"\b{}", escaped)),
        Filter::regex_ci(FIELD_TAGS, format!("^{}", escaped)),
    ])
    .and(content_type_filter(content_type))
}

/// Re-derives suggestion terms from the candidate documents, in store order.
///
/// Per document: the title, then content words, then tags. A term is kept
/// once, in the casing it was first seen with.
pub fn collect_suggestions(documents: &[IndexedDocument], prefix: &str, max: usize) -> Vec<String> {
    let mut set = SuggestionSet::new(prefix, max);

    for doc in documents {
        if set.is_full() {
            break;
        }

        if !doc.title.is_empty() {
            set.offer(&doc.title);
        }

        for word in doc.content.split_whitespace() {
            if word.len() > MIN_CONTENT_WORD_LEN {
                set.offer(word);
            }
        }

        for tag in &doc.tags {
            set.offer(tag);
        }
    }

    set.terms
}

struct SuggestionSet {
    needle: String,
    seen: HashSet<String>,
    terms: Vec<String>,
    max: usize,
}

impl SuggestionSet {
    fn new(prefix: &str, max: usize) -> Self {
        Self {
            needle: prefix.to_lowercase(),
            seen: HashSet::new(),
            terms: Vec::new(),
            max,
        }
    }

    fn is_full(&self) -> bool {
        self.terms.len() >= self.max
    }

    fn offer(&mut self, term: &str) {
        if self.is_full() || !term.to_lowercase().starts_with(&self.needle) {
            return;
        }
        if self.seen.insert(term.to_string()) {
            self.terms.push(term.to_string());
        }
    }
}
