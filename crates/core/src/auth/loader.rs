//! Profile load policy
//!
//! A profile load is a two-step affair: a cheap connectivity probe with a
//! short deadline, then the real query with its own deadline. The probe
//! fails fast when the backend is dead so the caller is never stuck behind
//! the full query timeout; a missing row is a normal outcome, not a
//! failure.

use std::sync::Arc;

use tracing::{debug, warn};
use trestle_common::resilience::{with_timeout, ResilienceError};
use trestle_domain::{MemberProfile, Result, TimeoutConfig, TrestleError};
use uuid::Uuid;

use super::ports::ProfileRepository;

/// Loads member profiles with the probe-then-query policy
pub struct ProfileLoader {
    repository: Arc<dyn ProfileRepository>,
    timeouts: TimeoutConfig,
}

impl ProfileLoader {
    /// Create a loader over a repository port.
    pub fn new(repository: Arc<dyn ProfileRepository>, timeouts: TimeoutConfig) -> Self {
        Self { repository, timeouts }
    }

    /// Load the profile joined to `user_id`.
    ///
    /// Returns `Ok(None)` when no profile row exists yet (fresh signups).
    ///
    /// # Errors
    /// - `TrestleError::Connection` when the probe fails; the main query is
    ///   never attempted
    /// - `TrestleError::Timeout` when the main query exceeds its deadline
    /// - Store-reported errors pass through unchanged
    pub async fn load(&self, user_id: Uuid) -> Result<Option<MemberProfile>> {
        self.probe_connectivity().await?;

        let query = self.repository.find_by_user_id(user_id);
        match with_timeout("profile query", self.timeouts.read(), query).await {
            Ok(profile) => {
                debug!(%user_id, found = profile.is_some(), "profile query finished");
                Ok(profile)
            }
            Err(ResilienceError::Timeout { operation, limit }) => {
                warn!(%user_id, ?limit, "profile query timed out");
                Err(TrestleError::Timeout(format!("{operation} exceeded {limit:?}")))
            }
            Err(ResilienceError::OperationFailed { source }) => Err(source),
        }
    }

    /// Run the probe alone; surfaced to health checks as well.
    ///
    /// # Errors
    /// Returns `TrestleError::Connection` carrying the underlying cause.
    pub async fn probe_connectivity(&self) -> Result<()> {
        let probe = self.repository.probe();
        match with_timeout("connectivity probe", self.timeouts.probe(), probe).await {
            Ok(()) => Ok(()),
            Err(err) => {
                // Fail fast: a dead backend must not hold callers for the
                // full query deadline
                let cause = match err {
                    ResilienceError::Timeout { limit, .. } => {
                        format!("probe timed out after {limit:?}")
                    }
                    ResilienceError::OperationFailed { source } => source.to_string(),
                };
                warn!(cause, "connectivity probe failed, abandoning load");
                Err(TrestleError::Connection(format!("backend unreachable: {cause}")))
            }
        }
    }
}
