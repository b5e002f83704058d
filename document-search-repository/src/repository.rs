//! Search repository implementation.
//!
//! This module provides the main repository for storing and querying typed
//! documents. Application code uses it for index creation, single-document
//! writes, bulk ingestion, paginated search and suggestions.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{error, info};

use crate::bulk::BulkIngestPipeline;
use crate::config::RepositoryConfig;
use crate::errors::RepositoryError;
use crate::executor::QueryExecutor;
use crate::interfaces::{DocumentRepository, EngineResponse, SearchEngineClient};
use crate::types::BulkIngestSummary;
use crate::utils::with_deadline;
use document_search_shared::{PaginationMetadata, SearchDocument};

/// The main repository for a document type `T`.
///
/// Wraps a [`SearchEngineClient`] and adds what the raw client does not do:
/// deadlines on every call, status classification, pagination, and per-item
/// outcome tracking for bulk ingestion. The client is shared, so one
/// repository may be used from many tasks at once.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use document_search_repository::{
///     DocumentRepository, OpenSearchConfig, OpenSearchEngineClient, SearchRepository,
/// };
/// use document_search_shared::{PaginationMetadata, SearchDocument};
/// use serde::Serialize;
/// use serde_json::{json, Map};
///
/// #[derive(Serialize)]
/// struct CourseDoc {
///     title: String,
/// }
///
/// struct Course {
///     code: String,
///     title: String,
/// }
///
/// impl SearchDocument for Course {
///     type Document = CourseDoc;
///
///     fn to_document(&self) -> CourseDoc {
///         CourseDoc { title: self.title.clone() }
///     }
///
///     fn document_id(&self) -> String {
///         self.code.clone()
///     }
/// }
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = OpenSearchEngineClient::new(OpenSearchConfig::new("http://localhost:9200"))?;
/// let repository: SearchRepository<Course> = SearchRepository::new(Arc::new(client));
///
/// let course = Course { code: "2110101".to_string(), title: "Computer Programming".to_string() };
/// repository.insert("courses", &course.document_id(), &course).await?;
///
/// let mut meta = PaginationMetadata::new(1, 10);
/// let mut request = Map::new();
/// request.insert("query".to_string(), json!({ "match": { "title": "programming" } }));
/// let envelope = repository.search("courses", request, &mut meta).await?;
/// println!("{} of {} results", meta.item_count, meta.total_item);
/// # let _ = envelope;
/// # Ok(())
/// # }
/// ```
pub struct SearchRepository<T> {
    client: Arc<dyn SearchEngineClient>,
    config: RepositoryConfig,
    executor: QueryExecutor,
    pipeline: BulkIngestPipeline,
    _document: PhantomData<fn() -> T>,
}

impl<T: SearchDocument> SearchRepository<T> {
    /// Create a new repository with default configuration.
    ///
    /// The default configuration applies a 5 second deadline to every request
    /// and to each bulk item submission.
    ///
    /// # Arguments
    ///
    /// * `client` - The engine client (e.g., `OpenSearchEngineClient`)
    pub fn new(client: Arc<dyn SearchEngineClient>) -> Self {
        Self::with_config(client, RepositoryConfig::default())
    }

    /// Create a new repository with custom configuration.
    ///
    /// # Arguments
    ///
    /// * `client` - The engine client (e.g., `OpenSearchEngineClient`)
    /// * `config` - Deadlines for requests and bulk submissions
    pub fn with_config(client: Arc<dyn SearchEngineClient>, config: RepositoryConfig) -> Self {
        Self {
            executor: QueryExecutor::new(client.clone(), config.request_timeout),
            pipeline: BulkIngestPipeline::new(client.clone(), config.bulk_submit_timeout),
            client,
            config,
            _document: PhantomData,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Run a write under the request deadline and classify its status.
    async fn execute_write<F>(
        &self,
        operation: &'static str,
        index_name: &str,
        doc_id: Option<&str>,
        call: F,
    ) -> Result<(), RepositoryError>
    where
        F: Future<Output = Result<EngineResponse, RepositoryError>> + Send,
    {
        let response = with_deadline(operation, self.config.request_timeout, call)
            .await
            .inspect_err(|e| {
                error!(
                    operation = operation,
                    index_name = %index_name,
                    doc_id = doc_id,
                    error = %e,
                    "Search engine request failed"
                )
            })?;

        if response.is_error() {
            error!(
                operation = operation,
                index_name = %index_name,
                doc_id = doc_id,
                status_code = response.status_code,
                body = %response.body,
                "Search engine rejected the request"
            );
            return Err(RepositoryError::operation_failed(
                operation,
                response.status_code,
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl<T> DocumentRepository<T> for SearchRepository<T>
where
    T: SearchDocument + 'static,
{
    async fn create_index(
        &self,
        index_name: &str,
        index_body: &[u8],
    ) -> Result<(), RepositoryError> {
        self.execute_write(
            "create index",
            index_name,
            None,
            self.client.create_index(index_name, index_body),
        )
        .await?;

        info!(index_name = %index_name, "Created index");
        Ok(())
    }

    async fn insert(&self, index_name: &str, doc_id: &str, doc: &T) -> Result<(), RepositoryError> {
        let body = serde_json::to_value(doc.to_document())
            .map_err(|e| RepositoryError::serialization(e.to_string()))?;

        self.execute_write(
            "insert",
            index_name,
            Some(doc_id),
            self.client.index_document(index_name, doc_id, &body),
        )
        .await?;

        info!(index_name = %index_name, doc_id = %doc_id, "Inserted document");
        Ok(())
    }

    async fn insert_bulk(
        &self,
        index_name: &str,
        docs: &[T],
    ) -> Result<BulkIngestSummary, RepositoryError> {
        self.pipeline.ingest(index_name, docs).await
    }

    async fn update(
        &self,
        index_name: &str,
        doc_id: &str,
        doc: &Map<String, Value>,
    ) -> Result<(), RepositoryError> {
        let partial = Value::Object(doc.clone());

        self.execute_write(
            "update",
            index_name,
            Some(doc_id),
            self.client.update_document(index_name, doc_id, &partial),
        )
        .await?;

        info!(index_name = %index_name, doc_id = %doc_id, "Updated document");
        Ok(())
    }

    async fn delete(&self, index_name: &str, doc_id: &str) -> Result<(), RepositoryError> {
        self.execute_write(
            "delete",
            index_name,
            Some(doc_id),
            self.client.delete_document(index_name, doc_id),
        )
        .await?;

        info!(index_name = %index_name, doc_id = %doc_id, "Deleted document");
        Ok(())
    }

    async fn search(
        &self,
        index_name: &str,
        request: Map<String, Value>,
        meta: &mut PaginationMetadata,
    ) -> Result<Value, RepositoryError> {
        self.executor.search(index_name, request, meta).await
    }

    async fn suggest(
        &self,
        index_name: &str,
        request: Map<String, Value>,
    ) -> Result<Value, RepositoryError> {
        self.executor.suggest(index_name, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::BulkChannel;
    use serde::Serialize;
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Serialize)]
    struct NoteDoc {
        text: String,
    }

    struct Note {
        id: String,
        text: String,
    }

    impl SearchDocument for Note {
        type Document = NoteDoc;

        fn to_document(&self) -> NoteDoc {
            NoteDoc {
                text: self.text.clone(),
            }
        }

        fn document_id(&self) -> String {
            self.id.clone()
        }
    }

    /// Mock client answering every write with the same status.
    struct MockClient {
        status_code: u16,
        delay: Option<Duration>,
        calls: Mutex<Vec<(String, String, Option<Value>)>>,
    }

    impl MockClient {
        fn with_status(status_code: u16) -> Self {
            Self {
                status_code,
                delay: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        async fn respond(
            &self,
            call: &str,
            doc_id: &str,
            body: Option<Value>,
        ) -> Result<EngineResponse, RepositoryError> {
            self.calls
                .lock()
                .unwrap()
                .push((call.to_string(), doc_id.to_string(), body));
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(EngineResponse::new(self.status_code, r#"{"result":"ok"}"#))
        }
    }

    #[async_trait]
    impl SearchEngineClient for MockClient {
        async fn create_index(
            &self,
            _index_name: &str,
            body: &[u8],
        ) -> Result<EngineResponse, RepositoryError> {
            let body = serde_json::from_slice(body).ok();
            self.respond("create_index", "", body).await
        }

        async fn search(
            &self,
            _index_name: &str,
            _body: &Value,
        ) -> Result<EngineResponse, RepositoryError> {
            unimplemented!()
        }

        async fn index_document(
            &self,
            _index_name: &str,
            doc_id: &str,
            body: &Value,
        ) -> Result<EngineResponse, RepositoryError> {
            self.respond("index", doc_id, Some(body.clone())).await
        }

        async fn update_document(
            &self,
            _index_name: &str,
            doc_id: &str,
            partial: &Value,
        ) -> Result<EngineResponse, RepositoryError> {
            self.respond("update", doc_id, Some(partial.clone())).await
        }

        async fn delete_document(
            &self,
            _index_name: &str,
            doc_id: &str,
        ) -> Result<EngineResponse, RepositoryError> {
            self.respond("delete", doc_id, None).await
        }

        async fn open_bulk_channel(
            &self,
            _index_name: &str,
        ) -> Result<Box<dyn BulkChannel>, RepositoryError> {
            Err(RepositoryError::transport("bulk not available"))
        }
    }

    fn repository(client: &Arc<MockClient>) -> SearchRepository<Note> {
        SearchRepository::new(client.clone())
    }

    fn note(id: &str) -> Note {
        Note {
            id: id.to_string(),
            text: format!("note {}", id),
        }
    }

    #[tokio::test]
    async fn test_insert_sends_document_body() {
        let client = Arc::new(MockClient::with_status(201));

        repository(&client)
            .insert("notes", "n-1", &note("n-1"))
            .await
            .unwrap();

        let calls = client.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "index");
        assert_eq!(calls[0].1, "n-1");
        assert_eq!(calls[0].2, Some(json!({ "text": "note n-1" })));
    }

    #[tokio::test]
    async fn test_write_operations_fail_on_error_status() {
        let client = Arc::new(MockClient::with_status(404));
        let repo = repository(&client);

        let insert = repo.insert("notes", "n-1", &note("n-1")).await;
        assert!(matches!(
            insert,
            Err(RepositoryError::OperationFailed {
                operation: "insert",
                status: 404
            })
        ));

        let update = repo.update("notes", "n-1", &Map::new()).await;
        assert!(matches!(
            update,
            Err(RepositoryError::OperationFailed {
                operation: "update",
                status: 404
            })
        ));

        let delete = repo.delete("notes", "n-1").await;
        assert!(matches!(
            delete,
            Err(RepositoryError::OperationFailed {
                operation: "delete",
                status: 404
            })
        ));
    }

    #[tokio::test]
    async fn test_write_operations_accept_success_status() {
        for status in [200, 201, 399] {
            let client = Arc::new(MockClient::with_status(status));
            let repo = repository(&client);

            assert!(repo.insert("notes", "n-1", &note("n-1")).await.is_ok());
            assert!(repo.delete("notes", "n-1").await.is_ok());
        }
    }

    #[tokio::test]
    async fn test_update_passes_partial_document() {
        let client = Arc::new(MockClient::with_status(200));
        let mut partial = Map::new();
        partial.insert("text".to_string(), json!("edited"));

        repository(&client)
            .update("notes", "n-1", &partial)
            .await
            .unwrap();

        let calls = client.calls.lock().unwrap();
        assert_eq!(calls[0].0, "update");
        assert_eq!(calls[0].2, Some(json!({ "text": "edited" })));
    }

    #[tokio::test]
    async fn test_create_index() {
        let client = Arc::new(MockClient::with_status(200));
        let body = br#"{"mappings":{"properties":{"text":{"type":"text"}}}}"#;

        repository(&client)
            .create_index("notes", body)
            .await
            .unwrap();

        let calls = client.calls.lock().unwrap();
        assert_eq!(calls[0].0, "create_index");
        assert_eq!(
            calls[0].2,
            Some(json!({ "mappings": { "properties": { "text": { "type": "text" } } } }))
        );
    }

    #[tokio::test]
    async fn test_create_existing_index_fails() {
        let client = Arc::new(MockClient::with_status(400));

        let result = repository(&client).create_index("notes", b"{}").await;

        assert!(matches!(
            result,
            Err(RepositoryError::OperationFailed {
                operation: "create index",
                status: 400
            })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_timeout() {
        let client = Arc::new(MockClient {
            status_code: 200,
            delay: Some(Duration::from_secs(10)),
            calls: Mutex::new(Vec::new()),
        });

        let result = repository(&client).delete("notes", "n-1").await;

        assert!(matches!(
            result,
            Err(RepositoryError::Timeout {
                operation: "delete",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_insert_bulk_empty_does_not_open_channel() {
        let client = Arc::new(MockClient::with_status(200));

        let summary = repository(&client).insert_bulk("notes", &[]).await.unwrap();

        assert_eq!(summary, BulkIngestSummary::empty());
    }

    #[tokio::test]
    async fn test_insert_bulk_fails_when_channel_cannot_open() {
        let client = Arc::new(MockClient::with_status(200));

        let result = repository(&client)
            .insert_bulk("notes", &[note("n-1")])
            .await;

        assert!(matches!(result, Err(RepositoryError::TransportError(_))));
    }
}
