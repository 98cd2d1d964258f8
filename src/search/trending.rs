use super::engine::{SearchEngine, content_type_filter};
use super::query::MAX_TRENDING_LIMIT;
use super::types::{ContentType, TrendingResponse, TrendingTerm};
use crate::cache::gateway::CacheTier;
use crate::cache::keys::CacheKey;
use crate::error::SearchError;
use crate::storage::protocol::*;
use crate::storage::store::with_deadline;

use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

pub const TRENDING_TIMEOUT: Duration = Duration::from_secs(5);

const PHRASES: &str = "phrases";
const SCORE: &str = "score";
const COUNT: &str = "count";

#[derive(Deserialize)]
struct TrendingRow {
    #[serde(rename = "_id")]
    term: String,
    score: f64,
    count: u64,
}

impl SearchEngine {
    /// Most popular autocomplete phrases, weighted by document popularity.
    pub async fn trending(
        &self,
        content_type: Option<ContentType>,
        limit: usize,
    ) -> Result<TrendingResponse, SearchError> {
        let limit = limit.clamp(1, MAX_TRENDING_LIMIT);

        let key = CacheKey::trending(content_type.as_ref(), limit);
        if let Some(cached) = self.cache.get::<TrendingResponse>(&key).await {
            return Ok(cached);
        }

        let pipeline = trending_pipeline(content_type.as_ref(), limit);
        let rows = with_deadline("trending", TRENDING_TIMEOUT, self.store.aggregate(&pipeline))
            .await
            .map_err(|e| {
                tracing::error!("Trending error: {}", e);
                SearchError::backend("Failed to fetch trending terms")
            })?;

        let trending = decode_rows(rows).map_err(|e| {
            tracing::error!("Error processing trending terms: {}", e);
            SearchError::backend("Failed to process trending terms")
        })?;

        let response = TrendingResponse {
            count: trending.len(),
            trending,
            limit,
            content_type,
        };

        self.cache.put(&key, &response, CacheTier::Trending);

        Ok(response)
    }
}

/// project → [match] → unwind → group(sum, count) → sort(score, count) → limit.
pub fn trending_pipeline(content_type: Option<&ContentType>, limit: usize) -> Vec<Stage> {
    let mut pipeline = vec![Stage::Project(vec![
        Projection::rename(PHRASES, FIELD_AUTOCOMPLETE_PHRASES),
        Projection::keep(FIELD_CONTENT_TYPE),
        Projection::keep(FIELD_POPULARITY_SCORE),
    ])];

    let filter = content_type_filter(content_type);
    if filter != Filter::All {
        pipeline.push(Stage::Match(filter));
    }

    pipeline.extend([
        Stage::Unwind(PHRASES.to_string()),
        Stage::Group {
            key: PHRASES.to_string(),
            accumulators: vec![
                (
                    SCORE.to_string(),
                    Accumulator::Sum(FIELD_POPULARITY_SCORE.to_string()),
                ),
                (COUNT.to_string(), Accumulator::Count),
            ],
        },
        Stage::Sort(vec![
            (SCORE.to_string(), Direction::Desc),
            (COUNT.to_string(), Direction::Desc),
        ]),
        Stage::Limit(limit),
    ]);

    pipeline
}

fn decode_rows(rows: Vec<Value>) -> Result<Vec<TrendingTerm>, serde_json::Error> {
    rows.into_iter()
        .map(|row| {
            let row: TrendingRow = serde_json::from_value(row)?;
            Ok(TrendingTerm {
                term: row.term,
                score: row.score,
                count: row.count,
            })
        })
        .collect()
}
