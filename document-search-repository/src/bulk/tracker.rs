//! Per-item outcome accounting for bulk writes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{error, info};

use crate::errors::RepositoryError;
use crate::interfaces::{BulkItem, BulkItemError, BulkResponseItem};

#[derive(Default)]
struct Outcomes {
    succeeded: AtomicU64,
    failed: AtomicU64,
    last_error: Mutex<Option<BulkItemError>>,
}

/// Records per-item outcomes for one bulk ingestion call.
///
/// Clones share the same counters, so the callbacks attached to each item can
/// run on any channel task while the pipeline reads the totals afterwards.
#[derive(Clone)]
pub struct BulkOutcomeTracker {
    index_name: Arc<str>,
    outcomes: Arc<Outcomes>,
}

impl BulkOutcomeTracker {
    /// Create a tracker for items bound to `index_name`.
    pub fn new(index_name: &str) -> Self {
        Self {
            index_name: Arc::from(index_name),
            outcomes: Arc::new(Outcomes::default()),
        }
    }

    /// Attach success and failure callbacks that report into this tracker.
    pub fn attach(&self, item: BulkItem) -> BulkItem {
        let on_success = self.clone();
        let on_failure = self.clone();
        item.with_on_success(move |response| on_success.record_success(response))
            .with_on_failure(move |response, err| on_failure.record_failure(response, err))
    }

    /// Success callbacks observed so far.
    pub fn succeeded(&self) -> u64 {
        self.outcomes.succeeded.load(Ordering::SeqCst)
    }

    /// Failure callbacks observed so far.
    pub fn failed(&self) -> u64 {
        self.outcomes.failed.load(Ordering::SeqCst)
    }

    /// Most recent engine-reported item error.
    pub fn last_error(&self) -> Option<BulkItemError> {
        self.outcomes
            .last_error
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or(None)
    }

    fn record_success(&self, response: &BulkResponseItem) {
        self.outcomes.succeeded.fetch_add(1, Ordering::SeqCst);
        info!(
            index_name = %self.index_name,
            doc_id = %response.document_id,
            "Successfully indexed document"
        );
    }

    fn record_failure(&self, response: &BulkResponseItem, request_error: Option<&RepositoryError>) {
        self.outcomes.failed.fetch_add(1, Ordering::SeqCst);

        match (&response.error, request_error) {
            (Some(item_error), _) => {
                error!(
                    index_name = %self.index_name,
                    doc_id = %response.document_id,
                    status = response.status,
                    error_type = %item_error.error_type,
                    error_reason = %item_error.reason,
                    "Failed to index document"
                );
                if let Ok(mut last) = self.outcomes.last_error.lock() {
                    *last = Some(item_error.clone());
                }
            }
            (None, Some(err)) => {
                error!(
                    index_name = %self.index_name,
                    doc_id = %response.document_id,
                    error = %err,
                    "Failed to index document, bulk request failed"
                );
            }
            (None, None) => {
                error!(
                    index_name = %self.index_name,
                    doc_id = %response.document_id,
                    status = response.status,
                    error_type = "unknown",
                    "Failed to index document"
                );
            }
        }
    }
}
