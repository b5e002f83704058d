//! Error types for the document search repository.
//!
//! This module provides a unified error type for all repository operations.

mod repository_error;

pub use repository_error::RepositoryError;
