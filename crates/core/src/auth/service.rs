//! Auth state machine
//!
//! `AuthService` owns the global auth state and is its only writer. It
//! combines the session store and the profile loader: session-change events
//! arrive over a broadcast channel and are consumed by one loop, in order;
//! every other component reads immutable [`AuthSnapshot`] values published
//! through a watch channel.
//!
//! Two guards keep async completions honest:
//! - a cancellation token marks the service torn down; loads that finish
//!   afterwards are discarded
//! - an epoch counter marks loads superseded by a newer event (a sign-out
//!   must never be overwritten by a slow profile fetch it raced with)

use std::sync::Arc;

use tokio::sync::{broadcast, watch, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use trestle_common::error::ErrorClassification;
use trestle_domain::{
    AuthSession, MemberProfile, Result, SessionEvent, TimeoutConfig, TrestleError,
};

use super::loader::ProfileLoader;
use super::ports::{ProfileRepository, SessionStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionPhase {
    Initializing,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProfilePhase {
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// Internal mutable state; several axes vary independently so this is a
/// tuple of phases rather than one enum.
struct AuthState {
    session_phase: SessionPhase,
    profile_phase: ProfilePhase,
    session: Option<AuthSession>,
    profile: Option<MemberProfile>,
    error: Option<String>,
    /// Bumped on every sign-out and load start; a load only applies its
    /// result while its epoch is still current
    epoch: u64,
}

impl AuthState {
    fn snapshot(&self) -> AuthSnapshot {
        AuthSnapshot {
            session: self.session.clone(),
            profile: self.profile.clone(),
            loading: self.session_phase == SessionPhase::Initializing
                || self.profile_phase == ProfilePhase::Loading,
            error: self.error.clone(),
        }
    }
}

/// Immutable view of the auth state handed to readers.
///
/// `is_admin` and `needs_password_reset` are derivations of the contained
/// profile, recomputed on every call and never stored, so they cannot drift
/// from role/status edits.
#[derive(Debug, Clone)]
pub struct AuthSnapshot {
    pub session: Option<AuthSession>,
    pub profile: Option<MemberProfile>,
    /// True while the session is resolving or a profile load is in flight
    pub loading: bool,
    /// Last error message; cleared on each new transition attempt
    pub error: Option<String>,
}

impl AuthSnapshot {
    /// Whether an identity is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Derived: active admin profile.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.profile.as_ref().is_some_and(MemberProfile::is_admin)
    }

    /// Derived: the profile demands a password reset before anything else.
    #[must_use]
    pub fn needs_password_reset(&self) -> bool {
        self.profile.as_ref().is_some_and(|p| p.needs_password_reset)
    }
}

/// Owner and single writer of the auth state.
///
/// Created once at application start and injected where needed; torn down
/// with [`AuthService::shutdown`].
pub struct AuthService {
    store: Arc<dyn SessionStore>,
    loader: ProfileLoader,
    state: RwLock<AuthState>,
    snapshot_tx: watch::Sender<AuthSnapshot>,
    liveness: CancellationToken,
}

impl AuthService {
    /// Create a new auth service over the given ports.
    #[must_use]
    pub fn new(
        store: Arc<dyn SessionStore>,
        repository: Arc<dyn ProfileRepository>,
        timeouts: TimeoutConfig,
    ) -> Self {
        let state = AuthState {
            session_phase: SessionPhase::Initializing,
            profile_phase: ProfilePhase::Idle,
            session: None,
            profile: None,
            error: None,
            epoch: 0,
        };
        let (snapshot_tx, _) = watch::channel(state.snapshot());

        Self {
            store,
            loader: ProfileLoader::new(repository, timeouts),
            state: RwLock::new(state),
            snapshot_tx,
            liveness: CancellationToken::new(),
        }
    }

    /// Resolve the persisted session and load its profile.
    ///
    /// Failures fail open: the service lands in the logged-out ready state
    /// with `error` set rather than hanging consumers on a dead backend.
    pub async fn initialize(&self) {
        match self.store.current_session().await {
            Ok(Some(session)) => {
                {
                    let mut state = self.state.write().await;
                    state.session = Some(session);
                    state.session_phase = SessionPhase::Ready;
                    state.error = None;
                }
                // No publish yet: the load below publishes session and
                // loading together, so guards never see a profile-less
                // ready state in between
                info!("session restored, loading profile");
                self.load_profile().await;
            }
            Ok(None) => {
                {
                    let mut state = self.state.write().await;
                    state.session = None;
                    state.profile = None;
                    state.session_phase = SessionPhase::Ready;
                    state.error = None;
                }
                self.publish().await;
                debug!("no persisted session");
            }
            Err(err) => {
                {
                    let mut state = self.state.write().await;
                    state.session_phase = SessionPhase::Ready;
                    state.error = Some(err.to_string());
                }
                self.publish().await;
                warn!(error = %err, "session restore failed, continuing logged out");
            }
        }
    }

    /// Spawn the session-event consumer loop.
    ///
    /// One loop per service; events are processed strictly in delivery
    /// order until [`AuthService::shutdown`].
    pub fn start(self: &Arc<Self>) {
        let rx = self.store.subscribe();
        let service = Arc::clone(self);
        tokio::spawn(async move {
            service.run_event_loop(rx).await;
        });
    }

    async fn run_event_loop(&self, mut rx: broadcast::Receiver<SessionEvent>) {
        info!("auth event loop started");
        loop {
            tokio::select! {
                () = self.liveness.cancelled() => break,
                event = rx.recv() => match event {
                    Ok(event) => self.handle_event(event).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Keep consuming; the next event carries the latest
                        // session either way
                        warn!(skipped, "session event stream lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }
        info!("auth event loop stopped");
    }

    async fn handle_event(&self, event: SessionEvent) {
        match event {
            SessionEvent::SignedIn(session) => {
                debug!(email = %session.identity.email, "signed in");
                self.set_session(session).await;
                self.load_profile().await;
            }
            SessionEvent::TokenRefreshed(session) => {
                // Re-fetch defensively: an admin may have approved the
                // member out-of-band since the last load
                debug!("token refreshed");
                self.set_session(session).await;
                self.load_profile().await;
            }
            SessionEvent::SignedOut => {
                debug!("signed out");
                self.apply_signed_out().await;
            }
        }
    }

    // Callers follow up with load_profile, which publishes; publishing here
    // would expose a profile-less ready state between the two writes
    async fn set_session(&self, session: AuthSession) {
        let mut state = self.state.write().await;
        state.session = Some(session);
        state.session_phase = SessionPhase::Ready;
        state.error = None;
    }

    /// Clear identity and profile unconditionally, invalidating any
    /// in-flight load.
    async fn apply_signed_out(&self) {
        {
            let mut state = self.state.write().await;
            state.epoch += 1;
            state.session = None;
            state.profile = None;
            state.session_phase = SessionPhase::Ready;
            state.profile_phase = ProfilePhase::Idle;
            state.error = None;
        }
        self.publish().await;
    }

    /// Run the profile load for the current identity.
    async fn load_profile(&self) {
        let (user_id, epoch) = {
            let mut state = self.state.write().await;
            let Some(user_id) = state.session.as_ref().map(|s| s.identity.user_id) else {
                state.profile_phase = ProfilePhase::Idle;
                return;
            };
            state.epoch += 1;
            state.profile_phase = ProfilePhase::Loading;
            state.error = None;
            (user_id, state.epoch)
        };
        self.publish().await;

        let result = self.loader.load(user_id).await;

        // Results from loads that outlived the service are discarded
        if self.liveness.is_cancelled() {
            debug!("discarding profile load result after shutdown");
            return;
        }

        {
            let mut state = self.state.write().await;
            if state.epoch != epoch {
                debug!("discarding superseded profile load result");
                return;
            }
            match result {
                Ok(profile) => {
                    state.profile_phase = ProfilePhase::Loaded;
                    state.profile = profile;
                }
                Err(err) => {
                    state.profile_phase = ProfilePhase::Failed;
                    // A timeout leaves the previous profile in place; other
                    // failures clear it
                    if !matches!(err, TrestleError::Timeout(_)) {
                        state.profile = None;
                    }
                    state.error = Some(err.to_string());
                    warn!(
                        error = %err,
                        severity = %err.severity(),
                        retryable = err.is_retryable(),
                        "profile load failed"
                    );
                }
            }
        }
        self.publish().await;
    }

    /// Re-run the profile load without clearing the current value.
    ///
    /// Used for passive revalidation; consumers keep rendering the stale
    /// profile until the fresh one lands.
    pub async fn refresh_profile(&self) {
        self.load_profile().await;
    }

    /// Clear the profile synchronously, then reload it.
    ///
    /// The clear removes any stale cached render before the fetch starts.
    pub async fn force_refresh(&self) {
        {
            let mut state = self.state.write().await;
            state.profile = None;
        }
        self.publish().await;
        self.load_profile().await;
    }

    /// Sign out via the store and clear local state.
    ///
    /// # Errors
    /// Returns `TrestleError::Auth` when the provider call fails; local
    /// state is left untouched in that case.
    pub async fn sign_out(&self) -> Result<()> {
        self.store.sign_out().await?;
        // The provider also emits SignedOut; applying here as well keeps
        // the state correct when the event stream is slow, and the apply is
        // idempotent
        self.apply_signed_out().await;
        Ok(())
    }

    /// Current state as an immutable snapshot.
    pub async fn snapshot(&self) -> AuthSnapshot {
        self.state.read().await.snapshot()
    }

    /// Subscribe to snapshot updates (route guards re-evaluate on each).
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Tear the service down; pending load results are discarded.
    pub fn shutdown(&self) {
        self.liveness.cancel();
    }

    async fn publish(&self) {
        let snapshot = self.state.read().await.snapshot();
        // Receivers may all be gone (tests, shutdown); that is fine
        self.snapshot_tx.send_replace(snapshot);
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("store", &"SessionStore")
            .field("loader", &"ProfileLoader")
            .finish()
    }
}
