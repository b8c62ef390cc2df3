//! Infrastructure-specific error types
//!
//! Transport-level failures carry their own type here and are folded into
//! the domain taxonomy at the adapter boundary.

use thiserror::Error;
use trestle_domain::TrestleError;

/// Errors raised inside infrastructure adapters
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("HTTP transport error: {0}")]
    Transport(String),

    #[error("Response decode error: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for InfraError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<InfraError> for TrestleError {
    fn from(err: InfraError) -> Self {
        match err {
            InfraError::Transport(msg) => Self::Connection(msg),
            InfraError::Decode(msg) => Self::Server(msg),
            InfraError::Config(msg) => Self::Config(msg),
        }
    }
}
