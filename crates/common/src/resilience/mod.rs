//! Resilience patterns for fault tolerance
//!
//! This module provides **generic, reusable** building blocks:
//! - **Timeout racing**: bound any async operation with a deadline; the
//!   loser of the race is disregarded, never awaited further
//! - **Retry backoff**: configurable backoff strategies consumed by the
//!   HTTP layer
//!
//! The implementations are generic over error types and carry no domain
//! coupling beyond the error taxonomy.

pub mod retry;
pub mod timeout;

pub use retry::{BackoffStrategy, RetryConfig};
pub use timeout::{with_timeout, ResilienceError};
