//! This module defines the core data structures and types used across the document search
//! repository. It re-exports `SearchDocument`, `Suggestion` and `PaginationMetadata`.

pub mod document;
pub mod pagination;

pub use document::{SearchDocument, Suggestion};
pub use pagination::PaginationMetadata;
