//! Utility functions for the document search repository.

use std::future::Future;
use std::time::Duration;

use tokio::time::timeout;

use crate::errors::RepositoryError;

/// Run an engine call under a hard deadline.
///
/// On expiry the call's future is dropped, which cancels the in-flight
/// request, and `RepositoryError::Timeout` is returned.
///
/// # Arguments
///
/// * `operation` - Operation name reported in the timeout error
/// * `after` - The time budget
/// * `call` - The engine call
pub async fn with_deadline<T, F>(
    operation: &'static str,
    after: Duration,
    call: F,
) -> Result<T, RepositoryError>
where
    F: Future<Output = Result<T, RepositoryError>>,
{
    match timeout(after, call).await {
        Ok(result) => result,
        Err(_) => Err(RepositoryError::timeout(operation, after)),
    }
}
