//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Trestle
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum TrestleError {
    /// Backend unreachable or the connectivity probe failed
    #[error("Connection error: {0}")]
    Connection(String),

    /// An operation exceeded its allotted time
    #[error("Timeout: {0}")]
    Timeout(String),

    /// A client-side field check failed before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// The identity provider rejected credentials or a token
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The store or a privileged endpoint reported a failure
    #[error("Server error: {0}")]
    Server(String),

    /// A single-entity fetch found zero rows where one was expected
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TrestleError {
    /// Whether a retry of the failed operation can reasonably succeed.
    ///
    /// Connection and timeout failures are transient; validation, auth and
    /// not-found failures are not, and auth errors must never be silently
    /// retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout(_) | Self::Server(_))
    }
}

/// Result type alias for Trestle operations
pub type Result<T> = std::result::Result<T, TrestleError>;
