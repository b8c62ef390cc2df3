//! # Trestle Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - The identity-provider client (session store adapter)
//! - The data-store client (profile repository adapter)
//! - The member CRUD facade and the privileged admin client
//! - Configuration loading and telemetry setup
//!
//! ## Architecture
//! - Implements traits defined in `trestle-core`
//! - Depends on `trestle-common`, `trestle-domain` and `trestle-core`
//! - Contains all "impure" code (I/O, HTTP)

pub mod admin;
pub mod config;
pub mod errors;
pub mod http;
pub mod identity;
pub mod members;
pub mod store;
pub mod telemetry;

// Re-export commonly used items
pub use admin::AdminClient;
pub use errors::InfraError;
pub use http::HttpClient;
pub use identity::{AccessTokenProvider, IdentityClient};
pub use members::MemberApi;
pub use store::RestProfileRepository;
