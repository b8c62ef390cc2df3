//! Member CRUD commands
//!
//! Every operation follows the same contract: validate required fields
//! before any network call, bound the store call with the timeout class for
//! its shape (quick read, write, bulk read), and normalize store-reported
//! failures to `"<operation> failed: <store message>"`. Timeouts keep their
//! own error type so callers can offer a retry.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};
use trestle_common::resilience::{with_timeout, ResilienceError};
use trestle_common::validation::{
    EmailValidator, FieldValidator, PhoneValidator, StringValidator,
};
use trestle_core::{ProfileRepository, SessionStore};
use trestle_domain::constants::{
    FULL_NAME_MAX_LENGTH, FULL_NAME_MIN_LENGTH, PHONE_MIN_DIGITS, POSITION_MAX_LENGTH,
};
use trestle_domain::{
    AuthSession, MemberProfile, MemberStatus, NewProfile, ProfilePatch, Result, Role,
    TimeoutConfig, TrestleError,
};
use uuid::Uuid;

/// Facade for member profile operations.
pub struct MemberApi {
    repository: Arc<dyn ProfileRepository>,
    sessions: Arc<dyn SessionStore>,
    timeouts: TimeoutConfig,
}

impl MemberApi {
    /// Create the facade over the repository and session ports.
    #[must_use]
    pub fn new(
        repository: Arc<dyn ProfileRepository>,
        sessions: Arc<dyn SessionStore>,
        timeouts: TimeoutConfig,
    ) -> Self {
        Self { repository, sessions, timeouts }
    }

    /// Fetch the profile joined to an identity; `None` when none exists yet.
    ///
    /// # Errors
    /// Timeout after the quick-read deadline; store errors prefixed with the
    /// operation name.
    pub async fn get_profile(&self, user_id: Uuid) -> Result<Option<MemberProfile>> {
        self.run("get_profile", self.timeouts.read(), self.repository.find_by_user_id(user_id))
            .await
    }

    /// Self-signup: create the identity, then its profile with membership
    /// defaults (`Member`, `Pending`).
    ///
    /// # Errors
    /// - `TrestleError::Validation` before any network call for a bad name
    ///   or email
    /// - `TrestleError::Auth` when the provider rejects the signup
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<(AuthSession, MemberProfile)> {
        validate_full_name(full_name)?;
        validate_email(email)?;

        let session = self.sessions.sign_up(email, password).await?;
        let new_profile =
            NewProfile::signup(session.identity.user_id, full_name.trim().to_string());
        let profile =
            self.run("register", self.timeouts.write(), self.repository.insert(new_profile)).await?;

        info!(user_id = %profile.user_id, "member registered");
        Ok((session, profile))
    }

    /// Admin creation with role and status chosen explicitly.
    ///
    /// # Errors
    /// `TrestleError::Validation` before any network call when a field fails
    /// its check.
    pub async fn create_profile(&self, profile: NewProfile) -> Result<MemberProfile> {
        validate_new_profile(&profile)?;
        self.run("create_profile", self.timeouts.write(), self.repository.insert(profile)).await
    }

    /// Owner or admin update of profile fields.
    ///
    /// # Errors
    /// `TrestleError::Validation` when a provided field fails its check;
    /// `TrestleError::NotFound` when the row is gone.
    pub async fn update_profile(&self, id: Uuid, patch: ProfilePatch) -> Result<MemberProfile> {
        validate_patch(&patch)?;
        self.run("update_profile", self.timeouts.write(), self.repository.update(id, patch)).await
    }

    /// Admin change of role and approval status.
    pub async fn set_role_status(
        &self,
        id: Uuid,
        role: Role,
        status: MemberStatus,
    ) -> Result<MemberProfile> {
        let patch = ProfilePatch { role: Some(role), status: Some(status), ..Default::default() };
        self.run("set_role_status", self.timeouts.write(), self.repository.update(id, patch)).await
    }

    /// Directory listing of active members, with contact fields blanked for
    /// rows that did not opt into sharing.
    pub async fn list_directory(&self) -> Result<Vec<MemberProfile>> {
        let members = self
            .run("list_directory", self.timeouts.bulk(), self.repository.list_active())
            .await?;
        Ok(members.iter().map(MemberProfile::directory_view).collect())
    }

    /// Change the password with the provider, then clear the forced-reset
    /// flag on the profile.
    ///
    /// # Errors
    /// `TrestleError::Auth` when the provider rejects the change; the flag
    /// is only cleared after the provider accepted.
    pub async fn complete_password_reset(
        &self,
        profile_id: Uuid,
        new_password: &str,
    ) -> Result<MemberProfile> {
        if new_password.len() < 8 {
            return Err(TrestleError::Validation(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        self.sessions.update_password(new_password).await?;
        let patch = ProfilePatch::password_reset_done();
        self.run("complete_password_reset", self.timeouts.write(), self.repository.update(profile_id, patch))
            .await
    }

    async fn run<T, F>(&self, operation: &'static str, limit: Duration, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let start = Instant::now();
        let result = with_timeout(operation, limit, fut).await;
        debug!(
            command = operation,
            elapsed_ms = start.elapsed().as_millis() as u64,
            success = result.is_ok(),
            "command finished"
        );

        match result {
            Ok(value) => Ok(value),
            Err(ResilienceError::Timeout { operation, limit }) => {
                Err(TrestleError::Timeout(format!("{operation} timed out after {limit:?}")))
            }
            Err(ResilienceError::OperationFailed { source }) => {
                Err(prefix_store_error(operation, source))
            }
        }
    }
}

/// Prefix store-reported failures with the operation name, preserving the
/// error kind. Validation and timeout errors never originate in the store
/// and pass through untouched.
fn prefix_store_error(operation: &str, err: TrestleError) -> TrestleError {
    match err {
        TrestleError::Validation(_) | TrestleError::Timeout(_) => err,
        TrestleError::Connection(m) => TrestleError::Connection(format!("{operation} failed: {m}")),
        TrestleError::Auth(m) => TrestleError::Auth(format!("{operation} failed: {m}")),
        TrestleError::Server(m) => TrestleError::Server(format!("{operation} failed: {m}")),
        TrestleError::NotFound(m) => TrestleError::NotFound(format!("{operation} failed: {m}")),
        TrestleError::Config(m) => TrestleError::Config(format!("{operation} failed: {m}")),
        TrestleError::Internal(m) => TrestleError::Internal(format!("{operation} failed: {m}")),
    }
}

fn validate_full_name(full_name: &str) -> Result<()> {
    if full_name.trim().is_empty() {
        return Err(TrestleError::Validation("Full name is required".to_string()));
    }
    StringValidator::new()
        .min_length(FULL_NAME_MIN_LENGTH)
        .max_length(FULL_NAME_MAX_LENGTH)
        .validate(full_name)
        .map_err(|m| TrestleError::Validation(format!("full_name: {m}")))
}

fn validate_email(email: &str) -> Result<()> {
    EmailValidator::new()
        .validate(email)
        .map_err(|m| TrestleError::Validation(format!("email: {m}")))
}

fn validate_phone(phone: &str) -> Result<()> {
    PhoneValidator::new(PHONE_MIN_DIGITS)
        .validate(phone)
        .map_err(|m| TrestleError::Validation(format!("contact_phone: {m}")))
}

fn validate_position(position: &str) -> Result<()> {
    StringValidator::new()
        .max_length(POSITION_MAX_LENGTH)
        .validate(position)
        .map_err(|m| TrestleError::Validation(format!("position: {m}")))
}

fn validate_new_profile(profile: &NewProfile) -> Result<()> {
    validate_full_name(&profile.full_name)?;
    if let Some(position) = profile.position.as_deref() {
        validate_position(position)?;
    }
    if let Some(email) = profile.contact_email.as_deref() {
        validate_email(email)?;
    }
    if let Some(phone) = profile.contact_phone.as_deref() {
        validate_phone(phone)?;
    }
    Ok(())
}

fn validate_patch(patch: &ProfilePatch) -> Result<()> {
    if let Some(full_name) = patch.full_name.as_deref() {
        validate_full_name(full_name)?;
    }
    if let Some(position) = patch.position.as_deref() {
        validate_position(position)?;
    }
    if let Some(email) = patch.contact_email.as_deref() {
        validate_email(email)?;
    }
    if let Some(phone) = patch.contact_phone.as_deref() {
        validate_phone(phone)?;
    }
    Ok(())
}
