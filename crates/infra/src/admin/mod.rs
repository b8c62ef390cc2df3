//! Privileged admin operations
//!
//! The delete-member flow never touches the store directly: it delegates to
//! a server-side function holding the service-role key, authenticated with
//! the caller's bearer token.

pub mod client;

pub use client::AdminClient;
