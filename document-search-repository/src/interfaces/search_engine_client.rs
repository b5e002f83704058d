//! Search engine client trait definition.
//!
//! This module defines the abstract interface to the search engine transport,
//! allowing for different backend implementations (OpenSearch, mock, etc.).

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::RepositoryError;
use crate::interfaces::BulkChannel;

/// A response from the search engine whose body has already been read in full.
///
/// Reading the body inside the client releases the underlying connection on
/// every path, including when the caller later fails to decode it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineResponse {
    /// HTTP status code returned by the engine.
    pub status_code: u16,
    /// Raw response body.
    pub body: String,
}

impl EngineResponse {
    /// Create a new engine response.
    pub fn new(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            body: body.into(),
        }
    }

    /// Returns true if the engine reported an error (status >= 400).
    pub fn is_error(&self) -> bool {
        self.status_code >= 400
    }

    /// Decode the body as JSON.
    pub fn json(&self) -> Result<Value, RepositoryError> {
        serde_json::from_str(&self.body).map_err(|e| RepositoryError::parse(e.to_string()))
    }
}

/// Abstract interface to the search engine.
///
/// Implementations only move requests and responses; they do not classify
/// status codes, apply deadlines or log outcomes. The repository does all three.
/// A call that never reached the engine returns `RepositoryError::TransportError`.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`; a single client is shared by
/// every repository call and is expected to pool its own connections.
#[async_trait]
pub trait SearchEngineClient: Send + Sync {
    /// Create an index from a caller-authored settings/mappings body.
    async fn create_index(
        &self,
        index_name: &str,
        body: &[u8],
    ) -> Result<EngineResponse, RepositoryError>;

    /// Execute a search request body against an index.
    async fn search(&self, index_name: &str, body: &Value)
        -> Result<EngineResponse, RepositoryError>;

    /// Execute a suggestion request body against an index.
    ///
    /// Suggestions travel over the same search endpoint by default.
    async fn suggest(
        &self,
        index_name: &str,
        body: &Value,
    ) -> Result<EngineResponse, RepositoryError> {
        self.search(index_name, body).await
    }

    /// Index a document, replacing any existing document with the same ID.
    async fn index_document(
        &self,
        index_name: &str,
        doc_id: &str,
        body: &Value,
    ) -> Result<EngineResponse, RepositoryError>;

    /// Merge a partial document into an existing document.
    async fn update_document(
        &self,
        index_name: &str,
        doc_id: &str,
        partial: &Value,
    ) -> Result<EngineResponse, RepositoryError>;

    /// Delete a document.
    async fn delete_document(
        &self,
        index_name: &str,
        doc_id: &str,
    ) -> Result<EngineResponse, RepositoryError>;

    /// Open a bulk write channel bound to an index.
    async fn open_bulk_channel(
        &self,
        index_name: &str,
    ) -> Result<Box<dyn BulkChannel>, RepositoryError>;
}
