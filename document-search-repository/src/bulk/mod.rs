//! Bulk ingestion.
//!
//! The pipeline feeds documents into an engine bulk channel and the tracker
//! records each item's outcome as the channel reports it.

mod pipeline;
mod tracker;

pub use pipeline::BulkIngestPipeline;
pub use tracker::BulkOutcomeTracker;
