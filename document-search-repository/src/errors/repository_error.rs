//! Repository error types.
//!
//! This module defines the unified error type for all repository operations,
//! covering transport failures, engine-reported failures, response decoding and
//! deadline expiry.

use std::time::Duration;

use thiserror::Error;

/// Unified errors from repository operations.
///
/// Bulk item failures are not represented here: they are absorbed into the
/// bulk summary and logs, and never abort the batch.
#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    /// The engine could not be reached or the request could not be sent.
    /// Carries the transport's own message unchanged.
    #[error("{0}")]
    TransportError(String),

    /// The engine answered a document or index operation with status >= 400.
    #[error("{operation} failed (status {status})")]
    OperationFailed {
        operation: &'static str,
        status: u16,
    },

    /// The engine answered a search or suggest request with a status other than 200.
    #[error("Invalid query (status {status})")]
    InvalidQuery { status: u16 },

    /// The response envelope is missing an expected key or has the wrong shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The operation did not complete within its time budget.
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// Failed to parse a response body from the engine.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Failed to serialize data for the engine.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Caller input rejected before any request was made.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl RepositoryError {
    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::TransportError(msg.into())
    }

    /// Create an operation failed error.
    pub fn operation_failed(operation: &'static str, status: u16) -> Self {
        Self::OperationFailed { operation, status }
    }

    /// Create an invalid query error.
    pub fn invalid_query(status: u16) -> Self {
        Self::InvalidQuery { status }
    }

    /// Create a malformed response error.
    pub fn malformed_response(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Create a timeout error.
    pub fn timeout(operation: &'static str, after: Duration) -> Self {
        Self::Timeout { operation, after }
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Status code reported by the engine, if the engine answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::OperationFailed { status, .. } | Self::InvalidQuery { status } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_failed_names_operation() {
        let err = RepositoryError::operation_failed("insert", 404);
        assert_eq!(err.to_string(), "insert failed (status 404)");
        assert_eq!(err.status_code(), Some(404));
    }

    #[test]
    fn test_transport_error_is_verbatim() {
        let err = RepositoryError::transport("error sending request: connection refused");
        assert_eq!(err.to_string(), "error sending request: connection refused");
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn test_timeout_message() {
        let err = RepositoryError::timeout("search", Duration::from_secs(5));
        assert_eq!(err.to_string(), "search timed out after 5s");
    }
}
