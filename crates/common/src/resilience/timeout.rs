//! Deadline enforcement for async operations
//!
//! Every store and provider call in Trestle is raced against a timer.
//! Whichever side resolves first wins; the underlying request is not
//! cancelled, its eventual result is simply dropped with the future.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

/// Error type for timeout-wrapped operations
#[derive(Debug, Error)]
pub enum ResilienceError<E> {
    /// The deadline elapsed before the operation resolved
    #[error("Operation '{operation}' timed out after {limit:?}")]
    Timeout { operation: String, limit: Duration },

    /// The operation itself failed within the deadline
    #[error(transparent)]
    OperationFailed { source: E },
}

impl<E> ResilienceError<E> {
    /// Unwrap the inner error, mapping the timeout arm through `on_timeout`.
    pub fn into_inner(self, on_timeout: impl FnOnce(String, Duration) -> E) -> E {
        match self {
            Self::Timeout { operation, limit } => on_timeout(operation, limit),
            Self::OperationFailed { source } => source,
        }
    }
}

/// Race `fut` against a deadline.
///
/// Returns the operation's own error inside `OperationFailed` so callers
/// can distinguish "slow" from "failed".
pub async fn with_timeout<T, E, F>(
    operation: &str,
    limit: Duration,
    fut: F,
) -> Result<T, ResilienceError<E>>
where
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(source)) => Err(ResilienceError::OperationFailed { source }),
        Err(_) => {
            warn!(operation, ?limit, "operation timed out");
            Err(ResilienceError::Timeout { operation: operation.to_string(), limit })
        }
    }
}
