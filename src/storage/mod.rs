//! Document Store Module
//!
//! The search core talks to its document store only through descriptors.
//!
//! ## Core Concepts
//! - **Protocol**: filters, find options, aggregation stages and index specs built by the core.
//! - **Store**: the `DocumentStore` trait every backend implements, plus the deadline helper.
//! - **Memory**: `MemoryDocumentStore`, a single-process backend that evaluates the descriptors.

pub mod memory;
pub mod protocol;
pub mod store;

#[cfg(test)]
mod tests;
