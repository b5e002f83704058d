//! Bulk ingestion: stream documents into a bulk channel and summarize the outcome.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::bulk::BulkOutcomeTracker;
use crate::errors::RepositoryError;
use crate::interfaces::{BulkItem, SearchEngineClient};
use crate::types::BulkIngestSummary;
use crate::utils::with_deadline;
use document_search_shared::SearchDocument;

/// Streams a batch of documents into the engine through a bulk channel.
///
/// Item failures never fail the call. They are logged, counted and reported
/// in the returned [`BulkIngestSummary`].
pub struct BulkIngestPipeline {
    client: Arc<dyn SearchEngineClient>,
    submit_timeout: Duration,
}

impl BulkIngestPipeline {
    /// Create a pipeline.
    ///
    /// # Arguments
    ///
    /// * `client` - Engine client used to open one channel per call
    /// * `submit_timeout` - Deadline for handing a single item to the channel
    pub fn new(client: Arc<dyn SearchEngineClient>, submit_timeout: Duration) -> Self {
        Self {
            client,
            submit_timeout,
        }
    }

    /// Index every document in `docs` under its own ID.
    ///
    /// Documents are queued in input order. A document that cannot be
    /// serialized, or that the channel does not accept within the submit
    /// deadline, is logged and counted as dropped; the rest of the batch still
    /// goes through. The channel is always closed before returning, so every
    /// callback has run by then.
    ///
    /// # Returns
    ///
    /// * `Ok(BulkIngestSummary)` - Counts for the batch, whatever the item outcomes
    /// * `Err(RepositoryError)` - Only if the bulk channel could not be opened
    pub async fn ingest<T: SearchDocument>(
        &self,
        index_name: &str,
        docs: &[T],
    ) -> Result<BulkIngestSummary, RepositoryError> {
        if docs.is_empty() {
            return Ok(BulkIngestSummary::empty());
        }

        let mut channel = self
            .client
            .open_bulk_channel(index_name)
            .await
            .inspect_err(|e| {
                error!(index_name = %index_name, error = %e, "Error creating the bulk indexer")
            })?;

        let tracker = BulkOutcomeTracker::new(index_name);
        let mut dropped = 0u64;

        for doc in docs {
            let doc_id = doc.document_id();
            let encoded = serde_json::to_string(&doc.to_document());
            let body = match encoded {
                Ok(body) => body,
                Err(e) => {
                    warn!(
                        index_name = %index_name,
                        doc_id = %doc_id,
                        error = %e,
                        "Failed to serialize document, skipping"
                    );
                    dropped += 1;
                    continue;
                }
            };

            let item = tracker.attach(BulkItem::index(doc_id.as_str(), body));
            if let Err(e) = with_deadline("bulk submit", self.submit_timeout, channel.add(item)).await
            {
                warn!(
                    index_name = %index_name,
                    doc_id = %doc_id,
                    error = %e,
                    "Failed to add document to bulk indexer"
                );
                dropped += 1;
            }
        }

        if let Err(e) = channel.close().await {
            error!(index_name = %index_name, error = %e, "Error closing the bulk indexer");
        }

        let stats = channel.stats();
        if stats.num_failed > 0 {
            error!(
                index_name = %index_name,
                num_flushed = stats.num_flushed,
                num_failed = stats.num_failed,
                "Bulk indexing finished with failed documents"
            );
        } else {
            info!(
                index_name = %index_name,
                num_flushed = stats.num_flushed,
                num_requests = stats.num_requests,
                "Successfully indexed documents"
            );
        }
        if dropped > 0 {
            warn!(
                index_name = %index_name,
                dropped = dropped,
                "Some documents never reached the bulk indexer"
            );
        }

        Ok(BulkIngestSummary {
            submitted: docs.len() as u64,
            dropped,
            succeeded: tracker.succeeded(),
            failed: tracker.failed(),
            last_error: tracker.last_error(),
            ..Default::default()
        }
        .with_stats(stats))
    }
}
