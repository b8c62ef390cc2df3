//! Modular common utilities shared across Trestle crates.
//!
//! # Safety and Quality
//!
//! This crate enforces strict safety and quality standards to ensure
//! reliability across all Trestle components.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod error;
pub mod resilience;
pub mod validation;

// Re-export commonly used types and traits for convenience
pub use error::{ErrorClassification, ErrorSeverity};
pub use resilience::{with_timeout, BackoffStrategy, ResilienceError, RetryConfig};
pub use validation::{
    EmailValidator, FieldValidator, PhoneValidator, StringValidator,
};
