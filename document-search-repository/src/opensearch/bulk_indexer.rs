//! Bulk indexer over the OpenSearch `_bulk` endpoint.
//!
//! Items queued with `add` are drained by a fixed pool of worker tasks. Each
//! worker buffers what it receives and sends one bulk request when the buffer
//! reaches the byte threshold, when the flush interval ticks, or when the
//! queue is closed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use opensearch::{BulkParts, OpenSearch};
use serde_json::{json, Value};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, warn};

use crate::config::BulkIndexerConfig;
use crate::errors::RepositoryError;
use crate::interfaces::{
    BulkChannel, BulkIndexerStats, BulkItem, BulkItemError, BulkResponseItem, EngineResponse,
};

/// Sends one encoded bulk request.
#[async_trait]
pub(crate) trait BulkTransport: Send + Sync {
    async fn send_bulk(
        &self,
        index_name: &str,
        lines: Vec<String>,
    ) -> Result<EngineResponse, RepositoryError>;
}

#[async_trait]
impl BulkTransport for OpenSearch {
    async fn send_bulk(
        &self,
        index_name: &str,
        lines: Vec<String>,
    ) -> Result<EngineResponse, RepositoryError> {
        let response = self
            .bulk(BulkParts::Index(index_name))
            .body(lines)
            .send()
            .await
            .map_err(|e| RepositoryError::transport(e.to_string()))?;

        let status_code = response.status_code().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| RepositoryError::transport(e.to_string()))?;

        Ok(EngineResponse::new(status_code, body))
    }
}

#[derive(Default)]
struct Counters {
    num_added: AtomicU64,
    num_flushed: AtomicU64,
    num_failed: AtomicU64,
    num_indexed: AtomicU64,
    num_requests: AtomicU64,
    first_error: std::sync::Mutex<Option<RepositoryError>>,
}

impl Counters {
    fn snapshot(&self) -> BulkIndexerStats {
        BulkIndexerStats {
            num_added: self.num_added.load(Ordering::SeqCst),
            num_flushed: self.num_flushed.load(Ordering::SeqCst),
            num_failed: self.num_failed.load(Ordering::SeqCst),
            num_indexed: self.num_indexed.load(Ordering::SeqCst),
            num_requests: self.num_requests.load(Ordering::SeqCst),
        }
    }

    fn record_request_error(&self, err: &RepositoryError) {
        if let Ok(mut first) = self.first_error.lock() {
            if first.is_none() {
                *first = Some(err.clone());
            }
        }
    }

    fn take_first_error(&self) -> Option<RepositoryError> {
        self.first_error.lock().ok().and_then(|mut first| first.take())
    }
}

/// `BulkChannel` implementation backed by a pool of OpenSearch bulk workers.
pub struct OpenSearchBulkIndexer {
    index_name: Arc<str>,
    sender: Option<mpsc::Sender<BulkItem>>,
    workers: Vec<JoinHandle<()>>,
    counters: Arc<Counters>,
}

impl OpenSearchBulkIndexer {
    /// Start a bulk indexer for `index_name` with the given thresholds.
    ///
    /// Spawns the worker tasks immediately, so it must be called from within
    /// a Tokio runtime.
    pub fn start(client: OpenSearch, index_name: &str, config: &BulkIndexerConfig) -> Self {
        Self::with_transport(Arc::new(client), index_name, config)
    }

    pub(crate) fn with_transport(
        transport: Arc<dyn BulkTransport>,
        index_name: &str,
        config: &BulkIndexerConfig,
    ) -> Self {
        let index_name: Arc<str> = Arc::from(index_name);
        let (sender, receiver) = mpsc::channel(config.channel_capacity.max(1));
        let receiver = Arc::new(Mutex::new(receiver));
        let counters = Arc::new(Counters::default());

        let workers = (0..config.num_workers.max(1))
            .map(|worker_id| {
                let worker = BulkWorker {
                    worker_id,
                    index_name: index_name.clone(),
                    transport: transport.clone(),
                    counters: counters.clone(),
                    flush_bytes: config.flush_bytes,
                };
                tokio::spawn(worker.run(receiver.clone(), config.flush_interval))
            })
            .collect();

        debug!(
            index_name = %index_name,
            num_workers = config.num_workers.max(1),
            flush_bytes = config.flush_bytes,
            "Started bulk indexer"
        );

        Self {
            index_name,
            sender: Some(sender),
            workers,
            counters,
        }
    }
}

#[async_trait]
impl BulkChannel for OpenSearchBulkIndexer {
    async fn add(&self, item: BulkItem) -> Result<(), RepositoryError> {
        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| RepositoryError::transport("bulk indexer is closed"))?;

        sender
            .send(item)
            .await
            .map_err(|_| RepositoryError::transport("bulk indexer is closed"))?;

        self.counters.num_added.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), RepositoryError> {
        // Workers drain the queue and exit once every sender is gone.
        self.sender.take();

        for handle in self.workers.drain(..) {
            if let Err(e) = handle.await {
                error!(index_name = %self.index_name, error = %e, "Bulk worker terminated abnormally");
            }
        }

        match self.counters.take_first_error() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn stats(&self) -> BulkIndexerStats {
        self.counters.snapshot()
    }
}

struct BulkWorker {
    worker_id: usize,
    index_name: Arc<str>,
    transport: Arc<dyn BulkTransport>,
    counters: Arc<Counters>,
    flush_bytes: usize,
}

impl BulkWorker {
    async fn run(self, receiver: Arc<Mutex<mpsc::Receiver<BulkItem>>>, flush_interval: Duration) {
        let mut buffer: Vec<BulkItem> = Vec::new();
        let mut buffered_bytes = 0usize;

        let mut ticker = interval(flush_interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                next = async { receiver.lock().await.recv().await } => {
                    match next {
                        Some(item) => {
                            buffered_bytes += item.encoded_len();
                            buffer.push(item);
                            if buffered_bytes >= self.flush_bytes {
                                self.flush(&mut buffer).await;
                                buffered_bytes = 0;
                            }
                        }
                        None => {
                            self.flush(&mut buffer).await;
                            break;
                        }
                    }
                }
                _ = ticker.tick() => {
                    if !buffer.is_empty() {
                        self.flush(&mut buffer).await;
                        buffered_bytes = 0;
                    }
                }
            }
        }

        debug!(index_name = %self.index_name, worker_id = self.worker_id, "Bulk worker stopped");
    }

    async fn flush(&self, buffer: &mut Vec<BulkItem>) {
        if buffer.is_empty() {
            return;
        }

        let mut items = std::mem::take(buffer);
        let lines = encode_bulk_body(&items);
        self.counters.num_requests.fetch_add(1, Ordering::SeqCst);

        debug!(
            index_name = %self.index_name,
            worker_id = self.worker_id,
            num_items = items.len(),
            "Flushing bulk request"
        );

        let response = match self.transport.send_bulk(&self.index_name, lines).await {
            Ok(response) => response,
            Err(e) => return self.fail_all(&mut items, 0, &e),
        };

        if !(200..300).contains(&response.status_code) {
            let err = RepositoryError::operation_failed("bulk", response.status_code);
            warn!(
                index_name = %self.index_name,
                status_code = response.status_code,
                body = %response.body,
                "Bulk request rejected"
            );
            return self.fail_all(&mut items, response.status_code, &err);
        }

        let results = match parse_bulk_response(&response.body, &items) {
            Ok(results) => results,
            Err(e) => return self.fail_all(&mut items, response.status_code, &e),
        };

        self.counters
            .num_flushed
            .fetch_add(items.len() as u64, Ordering::SeqCst);

        for (item, result) in items.iter_mut().zip(results.iter()) {
            if is_item_success(result) {
                self.counters.num_indexed.fetch_add(1, Ordering::SeqCst);
                item.notify_success(result);
            } else {
                self.counters.num_failed.fetch_add(1, Ordering::SeqCst);
                item.notify_failure(result, None);
            }
        }
    }

    fn fail_all(&self, items: &mut [BulkItem], status: u16, err: &RepositoryError) {
        error!(
            index_name = %self.index_name,
            num_items = items.len(),
            error = %err,
            "Bulk request failed"
        );
        self.counters.record_request_error(err);
        self.counters
            .num_failed
            .fetch_add(items.len() as u64, Ordering::SeqCst);

        for item in items.iter_mut() {
            let response = BulkResponseItem {
                document_id: item.document_id.clone(),
                status,
                error: None,
            };
            item.notify_failure(&response, Some(err));
        }
    }
}

fn is_item_success(result: &BulkResponseItem) -> bool {
    result.error.is_none() && (200..300).contains(&result.status)
}

/// Encode items as bulk NDJSON lines: one action line, then one source line.
fn encode_bulk_body(items: &[BulkItem]) -> Vec<String> {
    let mut lines = Vec::with_capacity(items.len() * 2);
    for item in items {
        lines.push(json!({ item.action.as_str(): { "_id": item.document_id } }).to_string());
        lines.push(item.body.clone());
    }
    lines
}

/// Match the `items` array of a bulk response to the items that were sent.
///
/// The engine answers items in request order, one entry per item.
fn parse_bulk_response(
    body: &str,
    sent: &[BulkItem],
) -> Result<Vec<BulkResponseItem>, RepositoryError> {
    let envelope: Value =
        serde_json::from_str(body).map_err(|e| RepositoryError::parse(e.to_string()))?;

    let entries = envelope
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| RepositoryError::malformed_response("missing array `items`"))?;

    if entries.len() != sent.len() {
        return Err(RepositoryError::malformed_response(format!(
            "bulk response has {} items, expected {}",
            entries.len(),
            sent.len()
        )));
    }

    entries
        .iter()
        .zip(sent)
        .map(|(entry, item)| -> Result<BulkResponseItem, RepositoryError> {
            let result = entry
                .get(item.action.as_str())
                .ok_or_else(|| {
                    RepositoryError::malformed_response(format!(
                        "bulk item for `{}` has no `{}` entry",
                        item.document_id,
                        item.action.as_str()
                    ))
                })?;

            let status = result
                .get("status")
                .and_then(Value::as_u64)
                .and_then(|s| u16::try_from(s).ok())
                .unwrap_or(0);

            let error = result.get("error").map(|detail| match detail {
                Value::String(reason) => BulkItemError::new("unknown", reason.as_str()),
                other => serde_json::from_value::<BulkItemError>(other.clone())
                    .unwrap_or_else(|_| BulkItemError::new("unknown", other.to_string())),
            });

            Ok(BulkResponseItem {
                document_id: item.document_id.clone(),
                status,
                error,
            })
        })
        .collect()
}
