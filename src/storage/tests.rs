//! Storage Module Tests
//!
//! Validates the in-memory document store against the descriptor protocol.
//!
//! ## Test Scopes
//! - **Find**: text matching, relevance order, filters, pagination and score projection.
//! - **Aggregate**: project/match/unwind/group/sort/limit pipelines.
//! - **Mutations**: upsert by natural key, bulk delete, index declarations.
//! - **Deadline**: slow calls are cut off and reported as errors.

#[cfg(test)]
mod tests {
    use crate::storage::memory::MemoryDocumentStore;
    use crate::storage::protocol::*;
    use crate::storage::store::{DocumentStore, with_deadline};
    use serde_json::{Value, json};
    use std::time::Duration;

    async fn indexed_store() -> MemoryDocumentStore {
        let store = MemoryDocumentStore::new();
        store
            .ensure_text_index(&TextIndexSpec::default())
            .await
            .unwrap();
        store
    }

    fn doc(content_id: &str, content_type: &str, title: &str, content: &str) -> Value {
        json!({
            "content_id": content_id,
            "content_type": content_type,
            "title": title,
            "content": content,
            "tags": [],
            "autocomplete_phrases": [],
            "popularity_score": 1.0,
        })
    }

    fn natural_key(content_id: &str, content_type: &str) -> Filter {
        Filter::eq(FIELD_CONTENT_ID, content_id).and(Filter::eq(FIELD_CONTENT_TYPE, content_type))
    }

    async fn put(store: &MemoryDocumentStore, body: Value) -> UpsertOutcome {
        let key = natural_key(
            body["content_id"].as_str().unwrap(),
            body["content_type"].as_str().unwrap(),
        );
        store.upsert(&key, body).await.unwrap()
    }

    // ============================================================
    // FIND
    // ============================================================

    #[tokio::test]
    async fn test_text_search_requires_text_index() {
        let store = MemoryDocumentStore::new();
        put(&store, doc("p1", "post", "Rust", "rust content")).await;

        let filter = Filter::Text {
            search: "rust".into(),
        };
        let result = store.find(&filter, &FindOptions::default()).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_title_match_outranks_content_match() {
        let store = indexed_store().await;
        put(&store, doc("p1", "post", "Cooking", "a note about rust")).await;
        put(&store, doc("p2", "post", "Rust tips", "short note")).await;

        let options = FindOptions {
            sort: SortOrder::RelevanceDesc,
            project_score: true,
            ..FindOptions::default()
        };
        let hits = store
            .find(&Filter::Text { search: "rust".into() }, &options)
            .await
            .unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0]["content_id"], "p2");
        assert_eq!(hits[1]["content_id"], "p1");
        assert!(hits[0]["score"].as_f64().unwrap() > hits[1]["score"].as_f64().unwrap());
    }

    #[tokio::test]
    async fn test_text_search_is_case_insensitive_and_skips_non_matches() {
        let store = indexed_store().await;
        put(&store, doc("p1", "post", "", "Tokio RUNTIME internals")).await;
        put(&store, doc("p2", "post", "", "gardening")).await;

        let hits = store
            .find(
                &Filter::Text {
                    search: "runtime".into(),
                },
                &FindOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["content_id"], "p1");
        assert!(hits[0].get("score").is_none(), "score not projected");
    }

    #[tokio::test]
    async fn test_content_type_filter_and_pagination() {
        let store = indexed_store().await;
        for i in 0..5 {
            put(&store, doc(&format!("p{}", i), "post", "", "shared words")).await;
        }
        put(&store, doc("c1", "comment", "", "shared words")).await;

        let filter = Filter::Text {
            search: "shared".into(),
        }
        .and(Filter::eq(FIELD_CONTENT_TYPE, "post"));
        let options = FindOptions {
            skip: 2,
            limit: Some(2),
            sort: SortOrder::RelevanceDesc,
            project_score: true,
        };
        let hits = store.find(&filter, &options).await.unwrap();

        assert_eq!(hits.len(), 2);
        // Equal scores keep insertion order.
        assert_eq!(hits[0]["content_id"], "p2");
        assert_eq!(hits[1]["content_id"], "p3");
    }

    #[tokio::test]
    async fn test_regex_or_filter_on_title_and_tags() {
        let store = indexed_store().await;
        let mut tagged = doc("p1", "post", "Weekly notes", "nothing");
        tagged["tags"] = json!(["golang"]);
        put(&store, tagged).await;
        put(&store, doc("p2", "post", "Go basics", "nothing")).await;
        put(&store, doc("p3", "post", "Python", "nothing")).await;

        let filter = Filter::Or(vec![
            Filter::regex_ci(FIELD_TITLE, "^go".into()),
            Filter::regex_ci(FIELD_TAGS, "^go".into()),
        ]);
        let hits = store.find(&filter, &FindOptions::default()).await.unwrap();

        let ids: Vec<&str> = hits.iter().map(|h| h["content_id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["p1", "p2"]);
    }

    #[tokio::test]
    async fn test_invalid_regex_is_an_error() {
        let store = indexed_store().await;
        put(&store, doc("p1", "post", "t", "c")).await;

        let filter = Filter::regex_ci(FIELD_TITLE, "(".into());
        assert!(store.find(&filter, &FindOptions::default()).await.is_err());
    }

    // ============================================================
    // AGGREGATE
    // ============================================================

    #[tokio::test]
    async fn test_group_sum_and_count_sorted() {
        let store = indexed_store().await;
        let mut a = doc("p1", "post", "", "x");
        a["autocomplete_phrases"] = json!(["api", "cache"]);
        a["popularity_score"] = json!(3.0);
        let mut b = doc("p2", "post", "", "y");
        b["autocomplete_phrases"] = json!(["api"]);
        b["popularity_score"] = json!(2.0);
        put(&store, a).await;
        put(&store, b).await;

        let pipeline = vec![
            Stage::Project(vec![
                Projection::rename("phrases", FIELD_AUTOCOMPLETE_PHRASES),
                Projection::keep(FIELD_POPULARITY_SCORE),
            ]),
            Stage::Unwind("phrases".into()),
            Stage::Group {
                key: "phrases".into(),
                accumulators: vec![
                    ("score".into(), Accumulator::Sum(FIELD_POPULARITY_SCORE.into())),
                    ("count".into(), Accumulator::Count),
                ],
            },
            Stage::Sort(vec![
                ("score".into(), Direction::Desc),
                ("count".into(), Direction::Desc),
            ]),
            Stage::Limit(10),
        ];
        let rows = store.aggregate(&pipeline).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["_id"], "api");
        assert_eq!(rows[0]["score"].as_f64(), Some(5.0));
        assert_eq!(rows[0]["count"].as_u64(), Some(2));
        assert_eq!(rows[1]["_id"], "cache");
        assert_eq!(rows[1]["count"].as_u64(), Some(1));
    }

    #[tokio::test]
    async fn test_unwind_drops_rows_without_array() {
        let store = indexed_store().await;
        let mut with = doc("p1", "post", "", "x");
        with["autocomplete_phrases"] = json!(["one", "two"]);
        let mut without = doc("p2", "post", "", "y");
        without.as_object_mut().unwrap().remove("autocomplete_phrases");
        put(&store, with).await;
        put(&store, without).await;

        let rows = store
            .aggregate(&[Stage::Unwind(FIELD_AUTOCOMPLETE_PHRASES.into())])
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][FIELD_AUTOCOMPLETE_PHRASES], "one");
        assert_eq!(rows[1][FIELD_AUTOCOMPLETE_PHRASES], "two");
    }

    #[tokio::test]
    async fn test_match_stage_filters_rows() {
        let store = indexed_store().await;
        put(&store, doc("p1", "post", "", "x")).await;
        put(&store, doc("u1", "user", "", "y")).await;

        let rows = store
            .aggregate(&[Stage::Match(Filter::eq(FIELD_CONTENT_TYPE, "user"))])
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["content_id"], "u1");
    }

    // ============================================================
    // MUTATIONS
    // ============================================================

    #[tokio::test]
    async fn test_upsert_by_natural_key_keeps_single_document() {
        let store = indexed_store().await;

        let first = put(&store, doc("p1", "post", "v1", "first")).await;
        assert_eq!(first.upserted, 1);
        assert_eq!(first.matched, 0);

        let second = put(&store, doc("p1", "post", "v2", "second")).await;
        assert_eq!(second.matched, 1);
        assert_eq!(second.modified, 1);
        assert_eq!(second.upserted, 0);
        assert_eq!(second.document_id, first.document_id);

        assert_eq!(store.document_count(), 1);
        let stored = store.get_document(&first.document_id).unwrap();
        assert_eq!(stored["content"], "second");
        assert_eq!(stored["title"], "v2");
    }

    #[tokio::test]
    async fn test_upsert_keeps_existing_store_id() {
        let store = indexed_store().await;
        let mut body = doc("p1", "post", "t", "c");
        body["id"] = json!("original-id");
        put(&store, body).await;

        let mut replacement = doc("p1", "post", "t", "changed");
        replacement["id"] = json!("other-id");
        let outcome = put(&store, replacement).await;

        assert_eq!(outcome.document_id, "original-id");
        assert!(store.get_document("other-id").is_none());
        assert_eq!(store.get_document("original-id").unwrap()["id"], "original-id");
    }

    #[tokio::test]
    async fn test_identical_upsert_reports_not_modified() {
        let store = indexed_store().await;
        put(&store, doc("p1", "post", "t", "c")).await;
        let outcome = put(&store, doc("p1", "post", "t", "c")).await;

        assert_eq!(outcome.matched, 1);
        assert_eq!(outcome.modified, 0);
    }

    #[tokio::test]
    async fn test_same_content_id_different_type_are_distinct() {
        let store = indexed_store().await;
        put(&store, doc("42", "post", "", "a")).await;
        put(&store, doc("42", "comment", "", "b")).await;

        assert_eq!(store.document_count(), 2);
    }

    #[tokio::test]
    async fn test_delete_many_counts_matches() {
        let store = indexed_store().await;
        put(&store, doc("42", "post", "", "a")).await;
        put(&store, doc("42", "comment", "", "b")).await;
        put(&store, doc("7", "post", "", "c")).await;

        let deleted = store
            .delete_many(&Filter::eq(FIELD_CONTENT_ID, "42"))
            .await
            .unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(store.document_count(), 1);

        let none = store
            .delete_many(&Filter::eq(FIELD_CONTENT_ID, "missing"))
            .await
            .unwrap();
        assert_eq!(none, 0);
    }

    #[tokio::test]
    async fn test_text_index_declaration_is_idempotent() {
        let store = indexed_store().await;
        assert!(store.ensure_text_index(&TextIndexSpec::default()).await.is_ok());

        let conflicting = TextIndexSpec {
            name: "other".into(),
            weights: vec![("title".into(), 1)],
        };
        assert!(store.ensure_text_index(&conflicting).await.is_err());
    }

    #[tokio::test]
    async fn test_secondary_indexes_declared() {
        let store = MemoryDocumentStore::new();
        for spec in default_indexes() {
            store.create_index(&spec).await.unwrap();
            store.create_index(&spec).await.unwrap();
        }

        let names = store.index_names();
        assert_eq!(names.len(), 5);
        assert!(names.contains(&"content_type_date_index".to_string()));
    }

    // ============================================================
    // DEADLINE
    // ============================================================

    #[tokio::test(start_paused = true)]
    async fn test_with_deadline_times_out() {
        let result: anyhow::Result<()> = with_deadline("slow call", Duration::from_secs(5), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_with_deadline_passes_result_through() {
        let value = with_deadline("fast call", Duration::from_secs(5), async { Ok(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }
}
