//! Error classification shared across Trestle crates
//!
//! The taxonomy itself lives in `trestle_domain::TrestleError`; this module
//! supplies the classification layer on top of it:
//!
//! 1. **`ErrorClassification` trait**: a standard interface for classifying
//!    errors by their characteristics (retryability, severity, criticality)
//!
//! 2. **`ErrorSeverity` enum**: a unified severity level system for
//!    monitoring and alerting across all error types
//!
//! Module-specific errors should implement `ErrorClassification` so retry
//! loops and log sinks treat them uniformly.

use std::fmt;
use std::time::Duration;

use trestle_domain::TrestleError;

/// Severity level of an error, for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational, expected conditions (empty results, not found)
    Info,
    /// Degraded but operational (timeouts, transient backend failures)
    Warning,
    /// Failure requiring attention (invalid input, auth rejection)
    Error,
    /// System integrity at risk (internal invariant violations)
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Standard interface for classifying errors
pub trait ErrorClassification {
    /// Can the failed operation be retried?
    fn is_retryable(&self) -> bool;

    /// How serious is this error?
    fn severity(&self) -> ErrorSeverity;

    /// Does this require immediate attention?
    fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }

    /// Suggested delay before retrying, if applicable
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

impl ErrorClassification for TrestleError {
    fn is_retryable(&self) -> bool {
        TrestleError::is_retryable(self)
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotFound(_) => ErrorSeverity::Info,
            Self::Connection(_) | Self::Timeout(_) => ErrorSeverity::Warning,
            Self::Validation(_) | Self::Auth(_) | Self::Server(_) | Self::Config(_) => {
                ErrorSeverity::Error
            }
            Self::Internal(_) => ErrorSeverity::Critical,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Connection(_) => Some(Duration::from_secs(5)),
            Self::Timeout(_) | Self::Server(_) => Some(Duration::from_secs(10)),
            _ => None,
        }
    }
}
