//! Identity-provider adapter
//!
//! Implements the `SessionStore` port against a GoTrue-style REST API and
//! owns the session-event broadcast channel.

pub mod client;

pub use client::{AccessTokenProvider, IdentityClient};
