use super::protocol::*;
use super::store::DocumentStore;
use crate::search::tokenizer::text_terms;

use anyhow::{Result, bail};
use async_trait::async_trait;
use dashmap::DashMap;
use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value, json};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Mutex, RwLock};
use uuid::Uuid;

struct StoredDocument {
    seq: u64,
    body: Value,
}

/// In-process document store that evaluates the protocol descriptors directly.
///
/// Mirrors the behaviour the service relies on from a real text-search store:
/// `$text`-style filters need a text index, relevance is a field-weighted term
/// match, and upserts keep the existing store id.
pub struct MemoryDocumentStore {
    documents: DashMap<String, StoredDocument>,
    next_seq: AtomicU64,
    text_index: RwLock<Option<TextIndexSpec>>,
    indexes: DashMap<String, IndexSpec>,
    // Serializes upsert/delete so a natural key is never inserted twice.
    write_lock: Mutex<()>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            documents: DashMap::new(),
            next_seq: AtomicU64::new(0),
            text_index: RwLock::new(None),
            indexes: DashMap::new(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn get_document(&self, id: &str) -> Option<Value> {
        self.documents.get(id).map(|entry| entry.body.clone())
    }

    pub fn has_text_index(&self) -> bool {
        self.current_text_index().is_some()
    }

    pub fn index_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.indexes.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Inserts a raw document, bypassing upsert semantics. Useful for seeding.
    pub fn insert_raw(&self, id: &str, body: Value) {
        let seq = self.next_seq.fetch_add(1, AtomicOrdering::SeqCst);
        self.documents
            .insert(id.to_string(), StoredDocument { seq, body });
    }

    fn current_text_index(&self) -> Option<TextIndexSpec> {
        self.text_index
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Documents in insertion order.
    fn snapshot(&self) -> Vec<(String, u64, Value)> {
        let mut docs: Vec<(String, u64, Value)> = self
            .documents
            .iter()
            .map(|entry| (entry.key().clone(), entry.seq, entry.body.clone()))
            .collect();
        docs.sort_by_key(|(_, seq, _)| *seq);
        docs
    }

    fn evaluator(&self) -> Evaluator {
        Evaluator::new(self.current_text_index().map(|spec| spec.weights))
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn find(&self, filter: &Filter, options: &FindOptions) -> Result<Vec<Value>> {
        let mut eval = self.evaluator();
        let mut hits: Vec<(u64, f64, Value)> = Vec::new();

        for (_, seq, body) in self.snapshot() {
            eval.reset_score();
            if eval.matches(filter, &body)? {
                hits.push((seq, eval.score, body));
            }
        }

        if options.sort == SortOrder::RelevanceDesc {
            hits.sort_by(|a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(Ordering::Equal)
                    .then(a.0.cmp(&b.0))
            });
        }

        let limit = options.limit.unwrap_or(usize::MAX);
        let page = hits
            .into_iter()
            .skip(options.skip)
            .take(limit)
            .map(|(_, score, mut body)| {
                if options.project_score {
                    if let Value::Object(map) = &mut body {
                        map.insert(FIELD_SCORE.to_string(), json!(score));
                    }
                }
                body
            })
            .collect();

        Ok(page)
    }

    async fn aggregate(&self, pipeline: &[Stage]) -> Result<Vec<Value>> {
        let mut rows: Vec<Value> = self
            .snapshot()
            .into_iter()
            .map(|(_, _, body)| body)
            .collect();

        let mut eval = self.evaluator();
        for stage in pipeline {
            rows = apply_stage(stage, rows, &mut eval)?;
        }

        Ok(rows)
    }

    async fn upsert(&self, key: &Filter, document: Value) -> Result<UpsertOutcome> {
        let Value::Object(mut fields) = document else {
            bail!("upsert document must be a JSON object");
        };

        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut eval = self.evaluator();
        let mut existing = None;
        for (id, _, body) in self.snapshot() {
            if eval.matches(key, &body)? {
                existing = Some(id);
                break;
            }
        }

        if let Some(id) = existing {
            let mut modified = 0;
            if let Some(mut entry) = self.documents.get_mut(&id) {
                if let Value::Object(stored) = &mut entry.body {
                    fields.remove(FIELD_ID);
                    for (name, value) in fields {
                        if stored.get(&name) != Some(&value) {
                            stored.insert(name, value);
                            modified = 1;
                        }
                    }
                }
            }
            return Ok(UpsertOutcome {
                matched: 1,
                modified,
                upserted: 0,
                document_id: id,
            });
        }

        let id = match fields.get(FIELD_ID).and_then(Value::as_str) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => Uuid::new_v4().to_string(),
        };
        fields.insert(FIELD_ID.to_string(), Value::String(id.clone()));
        self.insert_raw(&id, Value::Object(fields));

        Ok(UpsertOutcome {
            matched: 0,
            modified: 0,
            upserted: 1,
            document_id: id,
        })
    }

    async fn delete_many(&self, filter: &Filter) -> Result<u64> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut eval = self.evaluator();
        let mut deleted = 0;
        for (id, _, body) in self.snapshot() {
            if eval.matches(filter, &body)? && self.documents.remove(&id).is_some() {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    async fn ensure_text_index(&self, spec: &TextIndexSpec) -> Result<()> {
        let mut slot = self
            .text_index
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        match slot.as_ref() {
            Some(existing) if existing == spec => Ok(()),
            Some(existing) => bail!(
                "text index {} already exists with different options",
                existing.name
            ),
            None => {
                *slot = Some(spec.clone());
                Ok(())
            }
        }
    }

    async fn create_index(&self, spec: &IndexSpec) -> Result<()> {
        let entry = self
            .indexes
            .entry(spec.name.clone())
            .or_insert_with(|| spec.clone());
        if entry.value() != spec {
            bail!("index {} already exists with different keys", spec.name);
        }
        Ok(())
    }
}

/// Evaluates filters against one document at a time, caching compiled regexes
/// and accumulating the text score of the last match.
struct Evaluator {
    text_weights: Option<Vec<(String, u32)>>,
    regexes: HashMap<(String, bool), Regex>,
    score: f64,
}

impl Evaluator {
    fn new(text_weights: Option<Vec<(String, u32)>>) -> Self {
        Self {
            text_weights,
            regexes: HashMap::new(),
            score: 0.0,
        }
    }

    fn reset_score(&mut self) {
        self.score = 0.0;
    }

    fn matches(&mut self, filter: &Filter, doc: &Value) -> Result<bool> {
        match filter {
            Filter::All => Ok(true),
            Filter::Eq { field, value } => Ok(match doc.get(field) {
                Some(Value::Array(items)) => items.contains(value),
                Some(found) => found == value,
                None => value.is_null(),
            }),
            Filter::Text { search } => {
                let Some(weights) = self.text_weights.as_ref() else {
                    bail!("text index required for text search");
                };
                let score = text_score(weights, search, doc);
                self.score += score;
                Ok(score > 0.0)
            }
            Filter::Regex {
                field,
                pattern,
                case_insensitive,
            } => {
                let regex = self.regex(pattern, *case_insensitive)?;
                Ok(field_strings(doc, field)
                    .iter()
                    .any(|value| regex.is_match(value)))
            }
            Filter::Or(parts) => {
                let mut any = false;
                for part in parts {
                    // Evaluate every branch so text scores add up.
                    any |= self.matches(part, doc)?;
                }
                Ok(any)
            }
            Filter::And(parts) => {
                for part in parts {
                    if !self.matches(part, doc)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }

    fn regex(&mut self, pattern: &str, case_insensitive: bool) -> Result<&Regex> {
        let key = (pattern.to_string(), case_insensitive);
        if !self.regexes.contains_key(&key) {
            let compiled = RegexBuilder::new(pattern)
                .case_insensitive(case_insensitive)
                .build()?;
            self.regexes.insert(key.clone(), compiled);
        }
        self.regexes
            .get(&key)
            .ok_or_else(|| anyhow::anyhow!("regex cache miss for {}", pattern))
    }
}

/// Field weight times the number of distinct query terms found in the field.
fn text_score(weights: &[(String, u32)], search: &str, doc: &Value) -> f64 {
    let terms: HashSet<String> = text_terms(search).into_iter().collect();
    if terms.is_empty() {
        return 0.0;
    }

    let mut score = 0.0;
    for (field, weight) in weights {
        let words: HashSet<String> = field_strings(doc, field)
            .iter()
            .flat_map(|value| text_terms(value))
            .collect();
        let hits = terms.iter().filter(|term| words.contains(*term)).count();
        score += f64::from(*weight) * hits as f64;
    }
    score
}

fn field_strings<'a>(doc: &'a Value, field: &str) -> Vec<&'a str> {
    match doc.get(field) {
        Some(Value::String(value)) => vec![value.as_str()],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

fn apply_stage(stage: &Stage, rows: Vec<Value>, eval: &mut Evaluator) -> Result<Vec<Value>> {
    match stage {
        Stage::Project(projections) => Ok(rows
            .into_iter()
            .map(|row| {
                let mut out = Map::new();
                for projection in projections {
                    let source = projection.source.as_deref().unwrap_or(&projection.name);
                    if let Some(value) = row.get(source) {
                        out.insert(projection.name.clone(), value.clone());
                    }
                }
                Value::Object(out)
            })
            .collect()),
        Stage::Match(filter) => {
            let mut kept = Vec::new();
            for row in rows {
                if eval.matches(filter, &row)? {
                    kept.push(row);
                }
            }
            Ok(kept)
        }
        Stage::Unwind(field) => Ok(rows
            .into_iter()
            .flat_map(|row| unwind_row(row, field))
            .collect()),
        Stage::Group { key, accumulators } => Ok(group_rows(rows, key, accumulators)),
        Stage::Sort(keys) => {
            let mut rows = rows;
            rows.sort_by(|a, b| {
                keys.iter()
                    .map(|(field, direction)| {
                        let ordering = compare_values(a.get(field), b.get(field));
                        match direction {
                            Direction::Asc => ordering,
                            Direction::Desc => ordering.reverse(),
                        }
                    })
                    .find(|ordering| *ordering != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            });
            Ok(rows)
        }
        Stage::Limit(limit) => {
            let mut rows = rows;
            rows.truncate(*limit);
            Ok(rows)
        }
    }
}

fn unwind_row(row: Value, field: &str) -> Vec<Value> {
    match row.get(field) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                let mut expanded = row.clone();
                if let Value::Object(map) = &mut expanded {
                    map.insert(field.to_string(), item.clone());
                }
                expanded
            })
            .collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(_) => vec![row],
    }
}

enum AccState {
    Sum(f64),
    Count(u64),
}

fn group_rows(rows: Vec<Value>, key: &str, accumulators: &[(String, Accumulator)]) -> Vec<Value> {
    let mut order: Vec<(Value, Vec<AccState>)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let group_key = row.get(key).cloned().unwrap_or(Value::Null);
        let position = *positions.entry(group_key.to_string()).or_insert_with(|| {
            let states = accumulators
                .iter()
                .map(|(_, acc)| match acc {
                    Accumulator::Sum(_) => AccState::Sum(0.0),
                    Accumulator::Count => AccState::Count(0),
                })
                .collect();
            order.push((group_key.clone(), states));
            order.len() - 1
        });

        for (state, (_, acc)) in order[position].1.iter_mut().zip(accumulators) {
            match (state, acc) {
                (AccState::Sum(total), Accumulator::Sum(field)) => {
                    *total += row.get(field).and_then(Value::as_f64).unwrap_or(0.0);
                }
                (AccState::Count(count), Accumulator::Count) => *count += 1,
                _ => {}
            }
        }
    }

    order
        .into_iter()
        .map(|(group_key, states)| {
            let mut out = Map::new();
            out.insert(FIELD_GROUP_KEY.to_string(), group_key);
            for ((name, _), state) in accumulators.iter().zip(states) {
                let value = match state {
                    AccState::Sum(total) => json!(total),
                    AccState::Count(count) => json!(count),
                };
                out.insert(name.clone(), value);
            }
            Value::Object(out)
        })
        .collect()
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}
