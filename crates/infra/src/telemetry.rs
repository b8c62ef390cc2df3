//! Tracing setup
//!
//! One-shot subscriber initialization; safe to call more than once (later
//! calls are ignored so tests can share a process).

use tracing_subscriber::{fmt, EnvFilter};
use trestle_domain::LoggingConfig;

/// Initialize the global tracing subscriber.
///
/// The filter comes from `TRESTLE_LOG` when set, otherwise from the given
/// configuration.
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_env("TRESTLE_LOG")
        .unwrap_or_else(|_| EnvFilter::new(config.filter.clone()));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
