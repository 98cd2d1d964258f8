use super::types::IndexedDocument;
use std::collections::BTreeSet;

/// Words must be longer than this (in bytes) to become an autocomplete phrase.
const MIN_PHRASE_WORD_LEN: usize = 3;

/// Derives the autocomplete phrases for a document at ingest time.
///
/// Whole title, title words, every tag, and content words split on anything
/// that is not a letter or digit. Dedup is exact and case-sensitive. The
/// returned order is sorted only so the output is stable; nothing depends on it.
pub fn extract_key_phrases(doc: &IndexedDocument) -> Vec<String> {
    let mut phrases = BTreeSet::new();

    if !doc.title.is_empty() {
        phrases.insert(doc.title.clone());
        for word in doc.title.split_whitespace() {
            if word.len() > MIN_PHRASE_WORD_LEN {
                phrases.insert(word.to_string());
            }
        }
    }

    for tag in &doc.tags {
        phrases.insert(tag.clone());
    }

    for word in split_words(&doc.content) {
        if word.len() > MIN_PHRASE_WORD_LEN {
            phrases.insert(word.to_string());
        }
    }

    phrases.into_iter().collect()
}

/// Unicode-aware split on every char that is neither alphabetic nor numeric.
pub fn split_words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
}

/// Lowercased terms used for text matching in the in-memory store.
pub fn text_terms(text: &str) -> Vec<String> {
    split_words(text).map(|word| word.to_lowercase()).collect()
}
