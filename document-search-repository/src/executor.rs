//! Search and suggestion execution.
//!
//! Issues one query under the request deadline, decodes the response envelope
//! and, for searches, computes pagination metadata.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::errors::RepositoryError;
use crate::interfaces::{EngineResponse, SearchEngineClient};
use crate::pagination::compute_metadata;
use crate::utils::with_deadline;
use document_search_shared::PaginationMetadata;

/// Maximum number of suggestions returned. Overrides any caller-supplied size.
pub const MAX_SUGGESTIONS: usize = 10;

/// Runs search and suggest requests against the engine.
pub struct QueryExecutor {
    client: Arc<dyn SearchEngineClient>,
    timeout: Duration,
}

impl QueryExecutor {
    /// Create an executor with the given per-query deadline.
    pub fn new(client: Arc<dyn SearchEngineClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Run a paginated search.
    ///
    /// `from` and `size` in `request` are overwritten with `meta.offset()` and
    /// `meta.items_per_page`; every other key is sent as given. Any status
    /// other than 200 is reported as `InvalidQuery`.
    ///
    /// # Returns
    ///
    /// * `Ok(Value)` - The decoded response envelope; `meta` holds the totals
    /// * `Err(RepositoryError)` - If the page size is zero, the page offset
    ///   overflows, the engine rejected the query, the deadline passed or the
    ///   response could not be decoded
    pub async fn search(
        &self,
        index_name: &str,
        mut request: Map<String, Value>,
        meta: &mut PaginationMetadata,
    ) -> Result<Value, RepositoryError> {
        if meta.items_per_page == 0 {
            return Err(RepositoryError::validation(
                "items_per_page must be greater than zero",
            ));
        }

        let offset = meta
            .offset()
            .ok_or_else(|| RepositoryError::validation("requested page is out of range"))?;

        request.insert("from".to_string(), Value::from(offset));
        request.insert("size".to_string(), Value::from(meta.items_per_page));
        let body = Value::Object(request);

        let response = with_deadline("search", self.timeout, self.client.search(index_name, &body))
            .await
            .inspect_err(|e| error!(index_name = %index_name, error = %e, "Search request failed"))?;

        let envelope = Self::decode(index_name, response)?;

        compute_metadata(meta, &envelope).inspect_err(|e| {
            error!(index_name = %index_name, error = %e, "Unexpected search response shape")
        })?;

        debug!(
            index_name = %index_name,
            total_item = meta.total_item,
            item_count = meta.item_count,
            "Search completed"
        );
        Ok(envelope)
    }

    /// Run a suggestion query.
    ///
    /// `size` is always set to [`MAX_SUGGESTIONS`]. No pagination is computed.
    pub async fn suggest(
        &self,
        index_name: &str,
        mut request: Map<String, Value>,
    ) -> Result<Value, RepositoryError> {
        request.insert("size".to_string(), Value::from(MAX_SUGGESTIONS));
        let body = Value::Object(request);

        let response =
            with_deadline("suggest", self.timeout, self.client.suggest(index_name, &body))
                .await
                .inspect_err(|e| {
                    error!(index_name = %index_name, error = %e, "Suggest request failed")
                })?;

        let envelope = Self::decode(index_name, response)?;

        debug!(index_name = %index_name, "Suggest completed");
        Ok(envelope)
    }

    fn decode(index_name: &str, response: EngineResponse) -> Result<Value, RepositoryError> {
        if response.status_code != 200 {
            error!(
                index_name = %index_name,
                status_code = response.status_code,
                body = %response.body,
                "Query rejected by search engine"
            );
            return Err(RepositoryError::invalid_query(response.status_code));
        }

        response.json().inspect_err(|e| {
            error!(index_name = %index_name, error = %e, "Failed to decode query response")
        })
    }
}
