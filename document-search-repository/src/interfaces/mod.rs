//! Interface definitions for the document search repository.
//!
//! This module defines the abstract `SearchEngineClient` and `BulkChannel`
//! traits the repository is built on, and the `DocumentRepository` trait it
//! exposes, allowing for dependency injection and swappable backends.

mod bulk_channel;
mod document_repository;
mod search_engine_client;

pub use bulk_channel::{
    BulkAction, BulkChannel, BulkIndexerStats, BulkItem, BulkItemError, BulkResponseItem,
    OnFailure, OnSuccess,
};
pub use document_repository::DocumentRepository;
pub use search_engine_client::{EngineResponse, SearchEngineClient};
