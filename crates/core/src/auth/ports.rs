//! Port interfaces for session and profile management
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations.

use async_trait::async_trait;
use tokio::sync::broadcast;
use trestle_domain::{AuthSession, MemberProfile, NewProfile, ProfilePatch, Result, SessionEvent};
use uuid::Uuid;

/// Trait for the identity provider's session lifecycle.
///
/// Session-change events are delivered over a broadcast channel in emission
/// order; the auth service consumes them in a single loop so a handler can
/// never re-enter itself.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Get the currently persisted session, if any.
    ///
    /// # Errors
    /// Returns `TrestleError::Connection` when the provider is unreachable.
    async fn current_session(&self) -> Result<Option<AuthSession>>;

    /// Subscribe to session-change events.
    fn subscribe(&self) -> broadcast::Receiver<SessionEvent>;

    /// Authenticate with email and password.
    ///
    /// # Errors
    /// Returns `TrestleError::Auth` when the provider rejects the
    /// credentials.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession>;

    /// Register a new account.
    ///
    /// # Errors
    /// Returns `TrestleError::Auth` on provider rejection (duplicate email,
    /// weak password).
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession>;

    /// End the current session.
    ///
    /// # Errors
    /// Returns `TrestleError::Auth` on backend failure.
    async fn sign_out(&self) -> Result<()>;

    /// Change the authenticated user's password.
    ///
    /// # Errors
    /// Returns `TrestleError::Auth` when no session is active or the
    /// provider rejects the new password.
    async fn update_password(&self, new_password: &str) -> Result<()>;
}

/// Trait for member profile persistence and retrieval
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Lightweight connectivity probe, distinct from any data query.
    ///
    /// # Errors
    /// Returns `TrestleError::Connection` when the store is unreachable.
    async fn probe(&self) -> Result<()>;

    /// Get the profile joined to an identity; zero rows is `Ok(None)`, not
    /// an error.
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<MemberProfile>>;

    /// Insert a new profile row.
    async fn insert(&self, profile: NewProfile) -> Result<MemberProfile>;

    /// Apply a partial update to an existing row.
    ///
    /// # Errors
    /// Returns `TrestleError::NotFound` when no row matches `id`.
    async fn update(&self, id: Uuid, patch: ProfilePatch) -> Result<MemberProfile>;

    /// List every active member, for the directory.
    async fn list_active(&self) -> Result<Vec<MemberProfile>>;
}
