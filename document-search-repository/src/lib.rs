//! # Document Search Repository
//!
//! This crate provides a generic document repository over a search engine:
//! index creation, single-document writes, best-effort bulk ingestion with
//! per-item outcome tracking, paginated search and suggestions. It includes
//! the engine client seam and a concrete implementation for OpenSearch.

pub mod bulk;
pub mod config;
pub mod errors;
pub mod executor;
pub mod interfaces;
pub mod logging;
pub mod opensearch;
pub mod pagination;
pub mod repository;
pub mod types;
pub mod utils;

pub use config::{BulkIndexerConfig, OpenSearchConfig, RepositoryConfig};
pub use errors::RepositoryError;
pub use interfaces::{
    BulkChannel, BulkIndexerStats, BulkItem, BulkItemError, BulkResponseItem, DocumentRepository,
    EngineResponse, SearchEngineClient,
};
pub use logging::{init_tracing, LogFormat};
pub use opensearch::{OpenSearchBulkIndexer, OpenSearchEngineClient};
pub use repository::SearchRepository;
pub use types::BulkIngestSummary;
