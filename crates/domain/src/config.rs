//! Application configuration structures
//!
//! Plain data; loading and validation live in the infra crate.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub backend: BackendConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Hosted backend endpoints and credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the hosted backend (e.g. "https://abc.example.co")
    pub base_url: String,
    /// Publishable API key sent with every request
    pub anon_key: String,
    /// Base URL for privileged server-side functions; defaults to
    /// `{base_url}/functions/v1` when empty
    #[serde(default)]
    pub functions_url: String,
}

impl BackendConfig {
    /// Resolved URL for the privileged functions endpoint
    #[must_use]
    pub fn functions_base(&self) -> String {
        if self.functions_url.is_empty() {
            format!("{}/functions/v1", self.base_url.trim_end_matches('/'))
        } else {
            self.functions_url.trim_end_matches('/').to_string()
        }
    }
}

/// Per-operation-class timeout policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Connectivity probe before profile loads
    pub probe_secs: u64,
    /// Single-entity reads
    pub read_secs: u64,
    /// Inserts and updates
    pub write_secs: u64,
    /// Directory-style bulk reads
    pub bulk_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            probe_secs: constants::CONNECTIVITY_PROBE_TIMEOUT_SECS,
            read_secs: constants::READ_TIMEOUT_SECS,
            write_secs: constants::WRITE_TIMEOUT_SECS,
            bulk_secs: constants::BULK_READ_TIMEOUT_SECS,
        }
    }
}

impl TimeoutConfig {
    #[must_use]
    pub fn probe(&self) -> Duration {
        Duration::from_secs(self.probe_secs)
    }

    #[must_use]
    pub fn read(&self) -> Duration {
        Duration::from_secs(self.read_secs)
    }

    #[must_use]
    pub fn write(&self) -> Duration {
        Duration::from_secs(self.write_secs)
    }

    #[must_use]
    pub fn bulk(&self) -> Duration {
        Duration::from_secs(self.bulk_secs)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Tracing filter directive (e.g. "info,trestle_core=debug")
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: "info".to_string() }
    }
}
