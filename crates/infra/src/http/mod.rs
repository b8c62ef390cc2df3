//! HTTP plumbing shared by the identity, store and admin clients.

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
