//! Data-store adapter
//!
//! Implements the `ProfileRepository` port against the hosted backend's
//! filtered-REST interface.

pub mod profiles;

pub use profiles::RestProfileRepository;
