//! OpenSearch engine client implementation.
//!
//! This module provides the concrete implementation of `SearchEngineClient`
//! using the OpenSearch Rust crate.

use async_trait::async_trait;
use opensearch::{
    auth::Credentials,
    http::response::Response,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::IndicesCreateParts,
    DeleteParts, IndexParts, OpenSearch, SearchParts, UpdateParts,
};
use serde_json::{json, Value};
use tracing::info;
use url::Url;

use crate::config::{BulkIndexerConfig, OpenSearchConfig};
use crate::errors::RepositoryError;
use crate::interfaces::{BulkChannel, EngineResponse, SearchEngineClient};
use crate::opensearch::OpenSearchBulkIndexer;

/// OpenSearch client implementation.
///
/// Moves requests to and responses from a single OpenSearch node. Status codes
/// are returned as-is; classifying them is up to the caller.
///
/// # Example
///
/// ```no_run
/// use document_search_repository::{OpenSearchConfig, OpenSearchEngineClient};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = OpenSearchEngineClient::new(OpenSearchConfig::from_env())?;
/// # let _ = client;
/// # Ok(())
/// # }
/// ```
pub struct OpenSearchEngineClient {
    client: OpenSearch,
    bulk_config: BulkIndexerConfig,
}

impl OpenSearchEngineClient {
    /// Create a new OpenSearch client from the given configuration.
    ///
    /// No request is made; an unreachable server surfaces on first use.
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchEngineClient)` - A new client instance
    /// * `Err(RepositoryError::ConfigError)` - If the URL is invalid or the transport cannot be built
    pub fn new(config: OpenSearchConfig) -> Result<Self, RepositoryError> {
        let parsed_url =
            Url::parse(&config.url).map_err(|e| RepositoryError::config(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let mut builder = TransportBuilder::new(conn_pool).disable_proxy();
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.auth(Credentials::Basic(username.clone(), password.clone()));
        }
        let transport = builder
            .build()
            .map_err(|e| RepositoryError::config(e.to_string()))?;

        info!(
            url = %config.url,
            basic_auth = config.username.is_some(),
            "Created OpenSearch client"
        );

        Ok(Self {
            client: OpenSearch::new(transport),
            bulk_config: config.bulk,
        })
    }

    /// Read the status and the complete body of a response.
    async fn read(response: Response) -> Result<EngineResponse, RepositoryError> {
        let status_code = response.status_code().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| RepositoryError::transport(e.to_string()))?;
        Ok(EngineResponse::new(status_code, body))
    }
}

#[async_trait]
impl SearchEngineClient for OpenSearchEngineClient {
    async fn create_index(
        &self,
        index_name: &str,
        body: &[u8],
    ) -> Result<EngineResponse, RepositoryError> {
        let indices = self.client.indices();
        let request = indices.create(IndicesCreateParts::Index(index_name));

        // An empty body creates the index with engine defaults.
        let response = if body.is_empty() {
            request.send().await
        } else {
            let body: Value = serde_json::from_slice(body)
                .map_err(|e| RepositoryError::serialization(e.to_string()))?;
            request.body(body).send().await
        }
        .map_err(|e| RepositoryError::transport(e.to_string()))?;

        Self::read(response).await
    }

    async fn search(
        &self,
        index_name: &str,
        body: &Value,
    ) -> Result<EngineResponse, RepositoryError> {
        let response = self
            .client
            .search(SearchParts::Index(&[index_name]))
            .body(body)
            .send()
            .await
            .map_err(|e| RepositoryError::transport(e.to_string()))?;

        Self::read(response).await
    }

    async fn index_document(
        &self,
        index_name: &str,
        doc_id: &str,
        body: &Value,
    ) -> Result<EngineResponse, RepositoryError> {
        let response = self
            .client
            .index(IndexParts::IndexId(index_name, doc_id))
            .body(body)
            .send()
            .await
            .map_err(|e| RepositoryError::transport(e.to_string()))?;

        Self::read(response).await
    }

    async fn update_document(
        &self,
        index_name: &str,
        doc_id: &str,
        partial: &Value,
    ) -> Result<EngineResponse, RepositoryError> {
        let response = self
            .client
            .update(UpdateParts::IndexId(index_name, doc_id))
            .body(json!({ "doc": partial }))
            .send()
            .await
            .map_err(|e| RepositoryError::transport(e.to_string()))?;

        Self::read(response).await
    }

    async fn delete_document(
        &self,
        index_name: &str,
        doc_id: &str,
    ) -> Result<EngineResponse, RepositoryError> {
        let response = self
            .client
            .delete(DeleteParts::IndexId(index_name, doc_id))
            .send()
            .await
            .map_err(|e| RepositoryError::transport(e.to_string()))?;

        Self::read(response).await
    }

    async fn open_bulk_channel(
        &self,
        index_name: &str,
    ) -> Result<Box<dyn BulkChannel>, RepositoryError> {
        Ok(Box::new(OpenSearchBulkIndexer::start(
            self.client.clone(),
            index_name,
            &self.bulk_config,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_invalid_url() {
        let result = OpenSearchEngineClient::new(OpenSearchConfig::new("not a url"));
        assert!(matches!(result, Err(RepositoryError::ConfigError(_))));
    }

    #[test]
    fn test_new_with_basic_auth() {
        let mut config = OpenSearchConfig::new("https://localhost:9200");
        config.username = Some("admin".to_string());
        config.password = Some("admin".to_string());

        assert!(OpenSearchEngineClient::new(config).is_ok());
    }

    #[tokio::test]
    async fn test_create_index_rejects_malformed_body() {
        let client = OpenSearchEngineClient::new(OpenSearchConfig::new("http://127.0.0.1:1"))
            .expect("valid config");

        let result = client.create_index("courses", b"{not json").await;
        assert!(matches!(result, Err(RepositoryError::SerializationError(_))));
    }

    #[tokio::test]
    async fn test_create_index_unreachable_server_is_transport_error() {
        let client = OpenSearchEngineClient::new(OpenSearchConfig::new("http://127.0.0.1:1"))
            .expect("valid config");

        let with_body = client
            .create_index("courses", br#"{"settings":{"number_of_shards":1}}"#)
            .await;
        assert!(matches!(with_body, Err(RepositoryError::TransportError(_))));

        let without_body = client.create_index("courses", b"").await;
        assert!(matches!(without_body, Err(RepositoryError::TransportError(_))));
    }
}
