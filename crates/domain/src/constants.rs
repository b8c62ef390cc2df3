//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Timeout policy (seconds)
pub const CONNECTIVITY_PROBE_TIMEOUT_SECS: u64 = 3;
pub const PROFILE_QUERY_TIMEOUT_SECS: u64 = 10;
pub const READ_TIMEOUT_SECS: u64 = 10;
pub const WRITE_TIMEOUT_SECS: u64 = 60;
pub const BULK_READ_TIMEOUT_SECS: u64 = 90;

// Field constraints for member profiles
pub const FULL_NAME_MIN_LENGTH: usize = 2;
pub const FULL_NAME_MAX_LENGTH: usize = 100;
pub const POSITION_MAX_LENGTH: usize = 50;
pub const PHONE_MIN_DIGITS: usize = 10;

// Session refresh threshold: treat tokens expiring within this window as
// expired so a refresh lands before the provider cuts the session
pub const TOKEN_EXPIRY_THRESHOLD_SECS: i64 = 300;
