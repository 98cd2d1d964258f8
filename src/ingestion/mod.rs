//! Ingestion Service Module
//!
//! Write side of the index, called by trusted producer services.
//!
//! ## Workflow
//! 1. **Validate**: `content_id` and `content_type` must be present.
//! 2. **Prepare**: stamps `indexed_at`, assigns a store id, derives autocomplete
//!    phrases and defaults the popularity score.
//! 3. **Upsert**: writes on the `(content_id, content_type)` natural key, so
//!    repeated submissions of the same content never create duplicates.
//! 4. **Delete**: removes all documents of a content id, optionally narrowed by type.
//!
//! Cached responses are not invalidated on writes; they expire with their TTL.

pub mod handlers;
pub mod indexer;
pub mod types;
