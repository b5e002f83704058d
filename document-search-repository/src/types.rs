//! Result types for repository operations.

use crate::interfaces::{BulkIndexerStats, BulkItemError};

/// Outcome of a bulk ingestion call.
///
/// Returned even when items failed: inspect `num_failed` and `dropped` to
/// learn whether every document reached the index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkIngestSummary {
    /// Number of documents passed to the call.
    pub submitted: u64,
    /// Items carried by bulk requests the engine answered (channel counter).
    pub num_flushed: u64,
    /// Items that failed at the engine or with their request (channel counter).
    pub num_failed: u64,
    /// Items that never entered the channel: serialization failed or the
    /// channel refused them. Not included in `num_failed`.
    pub dropped: u64,
    /// Success callbacks observed during this call.
    pub succeeded: u64,
    /// Failure callbacks observed during this call.
    pub failed: u64,
    /// Detail of the most recent engine-reported item failure.
    pub last_error: Option<BulkItemError>,
}

impl BulkIngestSummary {
    /// Summary for an empty input.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true if every submitted document was indexed.
    pub fn is_complete(&self) -> bool {
        self.num_failed == 0 && self.dropped == 0 && self.succeeded == self.submitted
    }

    pub(crate) fn with_stats(mut self, stats: BulkIndexerStats) -> Self {
        self.num_flushed = stats.num_flushed;
        self.num_failed = stats.num_failed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_summary_is_complete() {
        let summary = BulkIngestSummary::empty();
        assert_eq!(summary.submitted, 0);
        assert!(summary.is_complete());
    }

    #[test]
    fn test_summary_with_failures_is_incomplete() {
        let summary = BulkIngestSummary {
            submitted: 3,
            succeeded: 2,
            failed: 1,
            ..Default::default()
        }
        .with_stats(BulkIndexerStats {
            num_added: 3,
            num_flushed: 3,
            num_failed: 1,
            num_indexed: 2,
            num_requests: 1,
        });

        assert_eq!(summary.num_flushed, 3);
        assert_eq!(summary.num_failed, 1);
        assert!(!summary.is_complete());
    }

    #[test]
    fn test_dropped_items_make_summary_incomplete() {
        let summary = BulkIngestSummary {
            submitted: 2,
            succeeded: 1,
            dropped: 1,
            ..Default::default()
        };
        assert!(!summary.is_complete());
    }
}
