//! Bulk write channel trait definition.
//!
//! A bulk channel accepts items one at a time, batches them into bulk requests
//! on its own schedule, and reports each item's outcome through the callbacks
//! carried by the item. Callbacks run on tasks owned by the channel, in no
//! particular order.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::RepositoryError;

/// Callback invoked when the engine accepted an item.
pub type OnSuccess = Box<dyn FnOnce(&BulkResponseItem) + Send>;

/// Callback invoked when an item failed.
///
/// The error is `Some` when the whole bulk request carrying the item failed;
/// otherwise the engine's per-item detail is in `BulkResponseItem::error`.
pub type OnFailure = Box<dyn FnOnce(&BulkResponseItem, Option<&RepositoryError>) + Send>;

/// Bulk action kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    /// Create or replace the document with the item's ID.
    Index,
}

impl BulkAction {
    /// Action name used on the bulk wire format.
    pub fn as_str(&self) -> &'static str {
        match self {
            BulkAction::Index => "index",
        }
    }
}

/// One document write submitted to a bulk channel.
pub struct BulkItem {
    /// Action to perform.
    pub action: BulkAction,
    /// Target document ID.
    pub document_id: String,
    /// Serialized JSON document body.
    pub body: String,
    /// Called when the engine accepts the item.
    pub on_success: Option<OnSuccess>,
    /// Called when the item fails.
    pub on_failure: Option<OnFailure>,
}

impl BulkItem {
    /// Create an index (create-or-replace) item without callbacks.
    pub fn index(document_id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            action: BulkAction::Index,
            document_id: document_id.into(),
            body: body.into(),
            on_success: None,
            on_failure: None,
        }
    }

    /// Attach a success callback.
    pub fn with_on_success(
        mut self,
        callback: impl FnOnce(&BulkResponseItem) + Send + 'static,
    ) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    /// Attach a failure callback.
    pub fn with_on_failure(
        mut self,
        callback: impl FnOnce(&BulkResponseItem, Option<&RepositoryError>) + Send + 'static,
    ) -> Self {
        self.on_failure = Some(Box::new(callback));
        self
    }

    /// Approximate number of bytes this item adds to a bulk request.
    pub fn encoded_len(&self) -> usize {
        // action line overhead + id + body + two newlines
        self.document_id.len() + self.body.len() + 32
    }

    /// Run the success callback, if any.
    pub fn notify_success(&mut self, response: &BulkResponseItem) {
        if let Some(callback) = self.on_success.take() {
            callback(response);
        }
    }

    /// Run the failure callback, if any.
    pub fn notify_failure(&mut self, response: &BulkResponseItem, error: Option<&RepositoryError>) {
        if let Some(callback) = self.on_failure.take() {
            callback(response, error);
        }
    }
}

impl fmt::Debug for BulkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BulkItem")
            .field("action", &self.action)
            .field("document_id", &self.document_id)
            .field("body_len", &self.body.len())
            .field("on_success", &self.on_success.is_some())
            .field("on_failure", &self.on_failure.is_some())
            .finish()
    }
}

/// Error detail the engine reports for a single failed bulk item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BulkItemError {
    /// Engine error type, e.g. `mapper_parsing_exception`.
    #[serde(rename = "type")]
    pub error_type: String,
    /// Human-readable reason.
    #[serde(default)]
    pub reason: String,
}

impl BulkItemError {
    /// Create a new item error.
    pub fn new(error_type: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            error_type: error_type.into(),
            reason: reason.into(),
        }
    }
}

/// Outcome of a single bulk item as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkResponseItem {
    /// Document ID the outcome refers to.
    pub document_id: String,
    /// Per-item status; 0 when the request never produced one.
    pub status: u16,
    /// Engine error detail, when the engine supplied one.
    pub error: Option<BulkItemError>,
}

/// Counters a bulk channel maintains across its lifetime.
///
/// Final once `BulkChannel::close` has returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkIndexerStats {
    /// Items accepted into the channel.
    pub num_added: u64,
    /// Items carried by bulk requests the engine answered.
    pub num_flushed: u64,
    /// Items that failed, at the engine or with their whole request.
    pub num_failed: u64,
    /// Items the engine indexed successfully.
    pub num_indexed: u64,
    /// Bulk requests sent.
    pub num_requests: u64,
}

/// A bulk write stream bound to one index.
#[async_trait]
pub trait BulkChannel: Send + Sync {
    /// Queue an item for the next bulk request.
    ///
    /// Waits only for queue capacity, never for the engine. Fails if the
    /// channel is already closed.
    async fn add(&self, item: BulkItem) -> Result<(), RepositoryError>;

    /// Flush everything queued and wait until every item's callback has run.
    ///
    /// Returns an error if a bulk request failed as a whole; item callbacks
    /// have still run and `stats` is final either way.
    async fn close(&mut self) -> Result<(), RepositoryError>;

    /// Current counters.
    fn stats(&self) -> BulkIndexerStats;
}
