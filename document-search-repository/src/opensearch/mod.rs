//! OpenSearch implementation of the search engine client.
//!
//! This module provides a concrete implementation of `SearchEngineClient` and
//! `BulkChannel` using OpenSearch as the backend.

mod bulk_indexer;
mod client;

pub use bulk_indexer::OpenSearchBulkIndexer;
pub use client::OpenSearchEngineClient;
