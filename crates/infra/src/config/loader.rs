//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `TRESTLE_BASE_URL`: Hosted backend base URL (required)
//! - `TRESTLE_ANON_KEY`: Publishable API key (required)
//! - `TRESTLE_FUNCTIONS_URL`: Privileged functions URL (optional)
//! - `TRESTLE_PROBE_TIMEOUT`: Connectivity probe timeout in seconds
//! - `TRESTLE_READ_TIMEOUT`: Quick-read timeout in seconds
//! - `TRESTLE_WRITE_TIMEOUT`: Write timeout in seconds
//! - `TRESTLE_BULK_TIMEOUT`: Bulk-read timeout in seconds
//! - `TRESTLE_LOG`: Tracing filter directive
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.toml` or `./config.json`
//! 2. `./trestle.toml` or `./trestle.json`
//! 3. The same names in the parent directory

use std::path::{Path, PathBuf};

use trestle_domain::{BackendConfig, Config, LoggingConfig, Result, TimeoutConfig, TrestleError};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `TrestleError::Config` if configuration cannot be loaded from
/// either source.
pub fn load() -> Result<Config> {
    // Pick up a .env file when present; ignore absence
    let _ = dotenvy::dotenv();

    match load_from_env() {
        Ok(config) => {
            tracing::info!("configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "environment incomplete, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `TrestleError::Config` if required variables are missing or have
/// invalid values.
pub fn load_from_env() -> Result<Config> {
    let base_url = env_var("TRESTLE_BASE_URL")?;
    let anon_key = env_var("TRESTLE_ANON_KEY")?;
    let functions_url = std::env::var("TRESTLE_FUNCTIONS_URL").unwrap_or_default();

    let defaults = TimeoutConfig::default();
    let timeouts = TimeoutConfig {
        probe_secs: env_secs("TRESTLE_PROBE_TIMEOUT", defaults.probe_secs)?,
        read_secs: env_secs("TRESTLE_READ_TIMEOUT", defaults.read_secs)?,
        write_secs: env_secs("TRESTLE_WRITE_TIMEOUT", defaults.write_secs)?,
        bulk_secs: env_secs("TRESTLE_BULK_TIMEOUT", defaults.bulk_secs)?,
    };

    let logging = LoggingConfig {
        filter: std::env::var("TRESTLE_LOG").unwrap_or_else(|_| LoggingConfig::default().filter),
    };

    Ok(Config {
        backend: BackendConfig { base_url, anon_key, functions_url },
        timeouts,
        logging,
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. Supports both JSON
/// and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `TrestleError::Config` if no file is found or it fails to parse.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(TrestleError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            TrestleError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| TrestleError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let config: Config = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(contents)
            .map_err(|e| TrestleError::Config(format!("Invalid TOML config: {e}")))?,
        Some("json") => serde_json::from_str(contents)
            .map_err(|e| TrestleError::Config(format!("Invalid JSON config: {e}")))?,
        other => {
            return Err(TrestleError::Config(format!(
                "Unsupported config extension: {other:?}"
            )))
        }
    };

    if config.backend.base_url.is_empty() || config.backend.anon_key.is_empty() {
        return Err(TrestleError::Config(
            "backend.base_url and backend.anon_key are required".to_string(),
        ));
    }

    Ok(config)
}

fn probe_config_paths() -> Option<PathBuf> {
    const CANDIDATES: [&str; 8] = [
        "config.toml",
        "config.json",
        "trestle.toml",
        "trestle.json",
        "../config.toml",
        "../config.json",
        "../trestle.toml",
        "../trestle.json",
    ];

    CANDIDATES.iter().map(PathBuf::from).find(|p| p.exists())
}

fn env_var(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| TrestleError::Config(format!("Missing environment variable: {name}")))
}

fn env_secs(name: &str, default: u64) -> Result<u64> {
    match std::env::var(name) {
        Ok(value) => value
            .parse::<u64>()
            .map_err(|e| TrestleError::Config(format!("Invalid value for {name}: {e}"))),
        Err(_) => Ok(default),
    }
}
