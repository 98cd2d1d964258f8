//! Document Store Protocol
//!
//! Descriptors the core hands to a [`DocumentStore`](super::store::DocumentStore).
//! The core never evaluates these itself: it builds them, the store runs them,
//! and the core interprets the raw JSON documents that come back.

use serde_json::Value;

// --- Field names ---

pub const FIELD_ID: &str = "id";
pub const FIELD_CONTENT_ID: &str = "content_id";
pub const FIELD_CONTENT_TYPE: &str = "content_type";
pub const FIELD_TITLE: &str = "title";
pub const FIELD_CONTENT: &str = "content";
pub const FIELD_TAGS: &str = "tags";
pub const FIELD_CREATED_AT: &str = "created_at";
pub const FIELD_AUTOCOMPLETE_PHRASES: &str = "autocomplete_phrases";
pub const FIELD_POPULARITY_SCORE: &str = "popularity_score";
/// Name under which a store projects the computed relevance.
pub const FIELD_SCORE: &str = "score";
/// Key of a group row in aggregation output.
pub const FIELD_GROUP_KEY: &str = "_id";

pub const TEXT_INDEX_NAME: &str = "text_search_index";

// --- Query descriptors ---

/// Logical filter over stored documents.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every document.
    All,
    /// Field equals value. For array fields, any element equal to value.
    Eq { field: String, value: Value },
    /// Free-text match through the store's text index.
    Text { search: String },
    /// Regex match on a string field (or any element of a string array).
    Regex {
        field: String,
        pattern: String,
        case_insensitive: bool,
    },
    Or(Vec<Filter>),
    And(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Filter::Eq {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn regex_ci(field: &str, pattern: String) -> Self {
        Filter::Regex {
            field: field.to_string(),
            pattern,
            case_insensitive: true,
        }
    }

    /// Conjunction that flattens nested `And`s and drops `All`.
    pub fn and(self, other: Filter) -> Self {
        let mut parts = Vec::new();
        for filter in [self, other] {
            match filter {
                Filter::All => {}
                Filter::And(inner) => parts.extend(inner),
                other => parts.push(other),
            }
        }
        match parts.len() {
            0 => Filter::All,
            1 => parts.remove(0),
            _ => Filter::And(parts),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Store order (insertion order for the in-memory store).
    Natural,
    /// Text relevance, highest first.
    RelevanceDesc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FindOptions {
    pub skip: usize,
    pub limit: Option<usize>,
    pub sort: SortOrder,
    /// Include the computed relevance under [`FIELD_SCORE`].
    pub project_score: bool,
}

impl Default for FindOptions {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: None,
            sort: SortOrder::Natural,
            project_score: false,
        }
    }
}

// --- Aggregation descriptors ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Output field `name` taken from input field `source` (or `name` when absent).
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub name: String,
    pub source: Option<String>,
}

impl Projection {
    pub fn keep(name: &str) -> Self {
        Self {
            name: name.to_string(),
            source: None,
        }
    }

    pub fn rename(name: &str, source: &str) -> Self {
        Self {
            name: name.to_string(),
            source: Some(source.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Accumulator {
    /// Sum of a numeric field; non-numeric values count as zero.
    Sum(String),
    /// Number of rows in the group.
    Count,
}

/// One stage of an aggregation pipeline, run in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Project(Vec<Projection>),
    Match(Filter),
    /// One output row per element of an array field.
    Unwind(String),
    /// Group by `key`; output rows carry the key under [`FIELD_GROUP_KEY`].
    Group {
        key: String,
        accumulators: Vec<(String, Accumulator)>,
    },
    Sort(Vec<(String, Direction)>),
    Limit(usize),
}

// --- Mutation descriptors ---

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub matched: u64,
    pub modified: u64,
    pub upserted: u64,
    /// Store id of the document that now holds the data.
    pub document_id: String,
}

/// Weighted text index over document fields.
#[derive(Debug, Clone, PartialEq)]
pub struct TextIndexSpec {
    pub name: String,
    pub weights: Vec<(String, u32)>,
}

impl Default for TextIndexSpec {
    fn default() -> Self {
        Self {
            name: TEXT_INDEX_NAME.to_string(),
            weights: vec![
                (FIELD_TITLE.to_string(), 10),
                (FIELD_TAGS.to_string(), 5),
                (FIELD_AUTOCOMPLETE_PHRASES.to_string(), 3),
                (FIELD_CONTENT.to_string(), 1),
            ],
        }
    }
}

/// Secondary (non-text) index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSpec {
    pub name: String,
    pub keys: Vec<(String, Direction)>,
}

impl IndexSpec {
    fn single(name: &str, field: &str) -> Self {
        Self {
            name: name.to_string(),
            keys: vec![(field.to_string(), Direction::Asc)],
        }
    }
}

/// Secondary indexes declared at startup next to the text index.
pub fn default_indexes() -> Vec<IndexSpec> {
    vec![
        IndexSpec::single("title_index", FIELD_TITLE),
        IndexSpec::single("tags_index", FIELD_TAGS),
        IndexSpec::single("autocomplete_phrases_index", FIELD_AUTOCOMPLETE_PHRASES),
        IndexSpec::single("content_type_index", FIELD_CONTENT_TYPE),
        IndexSpec {
            name: "content_type_date_index".to_string(),
            keys: vec![
                (FIELD_CONTENT_TYPE.to_string(), Direction::Asc),
                (FIELD_CREATED_AT.to_string(), Direction::Desc),
            ],
        },
    ]
}
