//! Document repository trait definition.
//!
//! This module defines the public operation set application code programs
//! against, so it can swap the OpenSearch-backed repository for a test double.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::errors::RepositoryError;
use crate::types::BulkIngestSummary;
use document_search_shared::{PaginationMetadata, SearchDocument};

/// Typed persistence and query operations over a search index.
///
/// Query and result bodies are engine-native JSON: the repository only sets
/// the pagination keys it owns (`from`, `size`) and reads the result keys it
/// needs (`hits.total.value`, `hits.hits`).
#[async_trait]
pub trait DocumentRepository<T: SearchDocument>: Send + Sync {
    /// Create an index from a caller-authored settings/mappings body.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the engine created the index
    /// * `Err(RepositoryError::OperationFailed)` - If the engine rejected the body or the index exists
    /// * `Err(RepositoryError)` - If the request failed or timed out
    async fn create_index(&self, index_name: &str, index_body: &[u8])
        -> Result<(), RepositoryError>;

    /// Index a single document under `doc_id`, replacing any existing document.
    async fn insert(&self, index_name: &str, doc_id: &str, doc: &T) -> Result<(), RepositoryError>;

    /// Index many documents through a bulk channel.
    ///
    /// Best effort: item failures are counted and logged but never turn into an
    /// `Err`. The call only fails if the bulk channel cannot be opened.
    async fn insert_bulk(
        &self,
        index_name: &str,
        docs: &[T],
    ) -> Result<BulkIngestSummary, RepositoryError>;

    /// Merge `doc` into the existing document `doc_id`.
    async fn update(
        &self,
        index_name: &str,
        doc_id: &str,
        doc: &Map<String, Value>,
    ) -> Result<(), RepositoryError>;

    /// Delete document `doc_id`.
    async fn delete(&self, index_name: &str, doc_id: &str) -> Result<(), RepositoryError>;

    /// Run a paginated search.
    ///
    /// Sets `from` and `size` in `request` from `meta`, returns the decoded
    /// response envelope and fills in the totals on `meta`.
    async fn search(
        &self,
        index_name: &str,
        request: Map<String, Value>,
        meta: &mut PaginationMetadata,
    ) -> Result<Value, RepositoryError>;

    /// Run a suggestion query, capped at ten results.
    async fn suggest(
        &self,
        index_name: &str,
        request: Map<String, Value>,
    ) -> Result<Value, RepositoryError>;
}
