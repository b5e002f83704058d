//! Configuration types for the repository and its OpenSearch transport.

use std::env;
use std::thread;
use std::time::Duration;

use tracing::warn;

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default time budget for single-document operations, search and suggest.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Default time budget for handing one item to a bulk channel.
const DEFAULT_BULK_SUBMIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default bulk request size threshold in bytes.
const DEFAULT_FLUSH_BYTES: usize = 5 * 1024 * 1024;

/// Default interval after which a partial bulk batch is flushed.
const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(30);

/// Default number of queued bulk items before `add` waits.
const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Configuration for the repository facade.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use document_search_repository::RepositoryConfig;
///
/// let config = RepositoryConfig::default().with_request_timeout(Duration::from_secs(2));
/// assert_eq!(config.request_timeout, Duration::from_secs(2));
/// ```
#[derive(Debug, Clone)]
pub struct RepositoryConfig {
    /// Deadline for every single-document operation, search and suggest.
    pub request_timeout: Duration,
    /// Deadline for submitting one item into a bulk channel.
    pub bulk_submit_timeout: Duration,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            bulk_submit_timeout: DEFAULT_BULK_SUBMIT_TIMEOUT,
        }
    }
}

impl RepositoryConfig {
    /// Set the per-request deadline.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the per-item bulk submission deadline.
    pub fn with_bulk_submit_timeout(mut self, timeout: Duration) -> Self {
        self.bulk_submit_timeout = timeout;
        self
    }
}

/// Thresholds for the OpenSearch bulk indexer.
#[derive(Debug, Clone)]
pub struct BulkIndexerConfig {
    /// Number of worker tasks sending bulk requests concurrently.
    pub num_workers: usize,
    /// A worker flushes its buffer once it holds at least this many bytes.
    pub flush_bytes: usize,
    /// A worker flushes a non-empty buffer at least this often.
    pub flush_interval: Duration,
    /// Items queued ahead of the workers before `add` waits for room.
    pub channel_capacity: usize,
}

impl Default for BulkIndexerConfig {
    fn default() -> Self {
        Self {
            num_workers: thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            flush_bytes: DEFAULT_FLUSH_BYTES,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Connection settings for the OpenSearch transport.
#[derive(Debug, Clone)]
pub struct OpenSearchConfig {
    /// The OpenSearch server URL (e.g., "http://localhost:9200").
    pub url: String,
    /// Basic auth username.
    pub username: Option<String>,
    /// Basic auth password.
    pub password: Option<String>,
    /// Bulk indexer thresholds.
    pub bulk: BulkIndexerConfig,
}

impl Default for OpenSearchConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_OPENSEARCH_URL.to_string(),
            username: None,
            password: None,
            bulk: BulkIndexerConfig::default(),
        }
    }
}

impl OpenSearchConfig {
    /// Create a config for the given URL with default bulk thresholds.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Load settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `OPENSEARCH_USERNAME` / `OPENSEARCH_PASSWORD`: Basic auth credentials (optional)
    /// - `OPENSEARCH_BULK_WORKERS`: Bulk worker count (default: available CPUs)
    /// - `OPENSEARCH_BULK_FLUSH_BYTES`: Bulk flush threshold in bytes (default: 5 MB)
    /// - `OPENSEARCH_BULK_FLUSH_INTERVAL_MS`: Bulk flush interval in milliseconds (default: 30000)
    ///
    /// Unparsable numeric values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = BulkIndexerConfig::default();

        let bulk = BulkIndexerConfig {
            num_workers: parse_env("OPENSEARCH_BULK_WORKERS", defaults.num_workers).max(1),
            flush_bytes: parse_env("OPENSEARCH_BULK_FLUSH_BYTES", defaults.flush_bytes),
            flush_interval: Duration::from_millis(parse_env(
                "OPENSEARCH_BULK_FLUSH_INTERVAL_MS",
                defaults.flush_interval.as_millis() as u64,
            )),
            channel_capacity: defaults.channel_capacity,
        };

        Self {
            url: env::var("OPENSEARCH_URL").unwrap_or_else(|_| DEFAULT_OPENSEARCH_URL.to_string()),
            username: env::var("OPENSEARCH_USERNAME").ok(),
            password: env::var("OPENSEARCH_PASSWORD").ok(),
            bulk,
        }
    }
}

fn parse_env<T: std::str::FromStr + Copy>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(key = key, value = %raw, "Invalid numeric setting, using default");
            default
        }),
        Err(_) => default,
    }
}
