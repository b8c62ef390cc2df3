//! Shared test helpers for `trestle-core` integration tests.
//!
//! Lightweight in-memory doubles for the session store and profile
//! repository so flow tests focus on state-machine behaviour instead of
//! boilerplate.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::broadcast;
use tokio::sync::Mutex;
use trestle_core::{ProfileRepository, SessionStore};
use trestle_domain::{
    AuthSession, Identity, MemberProfile, MemberStatus, NewProfile, ProfilePatch, Result, Role,
    SessionEvent, TrestleError,
};
use uuid::Uuid;

/// Build a member profile for tests.
pub fn member(user_id: Uuid, role: Role, status: MemberStatus) -> MemberProfile {
    let now = Utc::now();
    MemberProfile {
        id: Uuid::new_v4(),
        user_id,
        full_name: "Worshipful Master".to_string(),
        position: Some("Worshipful Master".to_string()),
        role,
        status,
        contact_email: Some("wm@example.org".to_string()),
        contact_phone: Some("555-010-0100".to_string()),
        share_contact_info: true,
        needs_password_reset: false,
        join_date: None,
        created_at: now,
        updated_at: now,
    }
}

/// Build a session for the given user id.
pub fn session_for(user_id: Uuid) -> AuthSession {
    AuthSession {
        identity: Identity {
            user_id,
            email: "brother@example.org".to_string(),
            email_verified: true,
        },
        access_token: "jwt-token".to_string(),
        refresh_token: Some("refresh-token".to_string()),
        expires_at: Some(Utc::now() + chrono::Duration::hours(1)),
    }
}

/// Scriptable session store double.
pub struct MockSessionStore {
    current: Mutex<Option<AuthSession>>,
    fail_current: AtomicBool,
    sign_out_calls: AtomicUsize,
    events: broadcast::Sender<SessionEvent>,
}

impl MockSessionStore {
    pub fn new(current: Option<AuthSession>) -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            current: Mutex::new(current),
            fail_current: AtomicBool::new(false),
            sign_out_calls: AtomicUsize::new(0),
            events,
        })
    }

    /// Make `current_session` fail with a connection error.
    pub fn fail_current_session(&self) {
        self.fail_current.store(true, Ordering::SeqCst);
    }

    /// Emit a session-change event to subscribers.
    pub fn emit(&self, event: SessionEvent) {
        // Send fails only when nobody subscribed yet; tests subscribe first
        let _ = self.events.send(event);
    }

    pub fn sign_out_calls(&self) -> usize {
        self.sign_out_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionStore for MockSessionStore {
    async fn current_session(&self) -> Result<Option<AuthSession>> {
        if self.fail_current.load(Ordering::SeqCst) {
            return Err(TrestleError::Connection("provider unreachable".to_string()));
        }
        Ok(self.current.lock().await.clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    async fn sign_in(&self, email: &str, _password: &str) -> Result<AuthSession> {
        let session = self
            .current
            .lock()
            .await
            .clone()
            .ok_or_else(|| TrestleError::Auth(format!("Invalid login credentials for {email}")))?;
        self.emit(SessionEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, _email: &str, _password: &str) -> Result<AuthSession> {
        Err(TrestleError::Auth("signups disabled in tests".to_string()))
    }

    async fn sign_out(&self) -> Result<()> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        *self.current.lock().await = None;
        self.emit(SessionEvent::SignedOut);
        Ok(())
    }

    async fn update_password(&self, _new_password: &str) -> Result<()> {
        Ok(())
    }
}

/// In-memory profile repository with adjustable latency and probe failure.
pub struct InMemoryProfileRepository {
    profiles: Mutex<HashMap<Uuid, MemberProfile>>,
    query_delay: Mutex<Duration>,
    probe_fails: AtomicBool,
    query_count: AtomicUsize,
}

impl InMemoryProfileRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            profiles: Mutex::new(HashMap::new()),
            query_delay: Mutex::new(Duration::ZERO),
            probe_fails: AtomicBool::new(false),
            query_count: AtomicUsize::new(0),
        })
    }

    pub async fn put(&self, profile: MemberProfile) {
        self.profiles.lock().await.insert(profile.user_id, profile);
    }

    pub async fn set_query_delay(&self, delay: Duration) {
        *self.query_delay.lock().await = delay;
    }

    pub fn fail_probe(&self, fail: bool) {
        self.probe_fails.store(fail, Ordering::SeqCst);
    }

    pub fn query_count(&self) -> usize {
        self.query_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn probe(&self) -> Result<()> {
        if self.probe_fails.load(Ordering::SeqCst) {
            Err(TrestleError::Connection("probe refused".to_string()))
        } else {
            Ok(())
        }
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<MemberProfile>> {
        self.query_count.fetch_add(1, Ordering::SeqCst);
        let delay = *self.query_delay.lock().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(self.profiles.lock().await.get(&user_id).cloned())
    }

    async fn insert(&self, profile: NewProfile) -> Result<MemberProfile> {
        let now = Utc::now();
        let row = MemberProfile {
            id: Uuid::new_v4(),
            user_id: profile.user_id,
            full_name: profile.full_name,
            position: profile.position,
            role: profile.role,
            status: profile.status,
            contact_email: profile.contact_email,
            contact_phone: profile.contact_phone,
            share_contact_info: profile.share_contact_info,
            needs_password_reset: false,
            join_date: profile.join_date,
            created_at: now,
            updated_at: now,
        };
        self.profiles.lock().await.insert(row.user_id, row.clone());
        Ok(row)
    }

    async fn update(&self, id: Uuid, patch: ProfilePatch) -> Result<MemberProfile> {
        let mut profiles = self.profiles.lock().await;
        let row = profiles
            .values_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| TrestleError::NotFound(format!("profile {id}")))?;

        if let Some(full_name) = patch.full_name {
            row.full_name = full_name;
        }
        if let Some(position) = patch.position {
            row.position = Some(position);
        }
        if let Some(role) = patch.role {
            row.role = role;
        }
        if let Some(status) = patch.status {
            row.status = status;
        }
        if let Some(contact_email) = patch.contact_email {
            row.contact_email = Some(contact_email);
        }
        if let Some(contact_phone) = patch.contact_phone {
            row.contact_phone = Some(contact_phone);
        }
        if let Some(share) = patch.share_contact_info {
            row.share_contact_info = share;
        }
        if let Some(flag) = patch.needs_password_reset {
            row.needs_password_reset = flag;
        }
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn list_active(&self) -> Result<Vec<MemberProfile>> {
        let profiles = self.profiles.lock().await;
        Ok(profiles.values().filter(|p| p.is_active()).cloned().collect())
    }
}
