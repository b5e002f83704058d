//! # Document Search Shared
//!
//! This crate defines the value types shared between the document search
//! repository and the application code that stores documents through it:
//! the document contract every stored type implements, pagination metadata
//! for search results, and the completion suggestion payload.

pub mod types;

pub use types::document::{SearchDocument, Suggestion};
pub use types::pagination::PaginationMetadata;
