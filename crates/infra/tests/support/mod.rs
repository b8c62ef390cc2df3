//! Shared helpers for `trestle-infra` integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tokio::sync::broadcast;
use trestle_core::SessionStore;
use trestle_domain::{
    AuthSession, BackendConfig, Identity, Result, SessionEvent, TrestleError,
};
use trestle_infra::AccessTokenProvider;
use uuid::Uuid;

/// Backend config pointing at a wiremock server.
pub fn backend_for(uri: &str) -> BackendConfig {
    BackendConfig {
        base_url: uri.to_string(),
        anon_key: "anon-key".to_string(),
        functions_url: String::new(),
    }
}

/// Store row as the REST interface would serialize it.
pub fn profile_json(user_id: Uuid, role: &str, status: &str) -> Value {
    json!({
        "id": Uuid::new_v4(),
        "user_id": user_id,
        "full_name": "Lodge Secretary",
        "position": "Secretary",
        "role": role,
        "status": status,
        "contact_email": "secretary@example.org",
        "contact_phone": "555-010-0100",
        "share_contact_info": true,
        "needs_password_reset": false,
        "join_date": null,
        "created_at": "2026-01-05T12:00:00Z",
        "updated_at": "2026-01-05T12:00:00Z",
    })
}

/// Provider token-grant response body.
pub fn token_json(user_id: Uuid, access: &str, refresh: &str, expires_in: i64) -> Value {
    json!({
        "access_token": access,
        "token_type": "bearer",
        "expires_in": expires_in,
        "refresh_token": refresh,
        "user": {
            "id": user_id,
            "email": "brother@example.org",
            "email_confirmed_at": "2026-01-05T12:00:00Z",
        },
    })
}

/// Token provider with a fixed answer.
pub struct StaticTokenProvider {
    token: Option<String>,
}

impl StaticTokenProvider {
    pub fn some(token: &str) -> Arc<Self> {
        Arc::new(Self { token: Some(token.to_string()) })
    }

    pub fn none() -> Arc<Self> {
        Arc::new(Self { token: None })
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<Option<String>> {
        Ok(self.token.clone())
    }
}

/// Session store double for facade tests.
pub struct StubSessionStore {
    pub user_id: Uuid,
    fail_password_update: AtomicBool,
    password_updates: AtomicUsize,
    events: broadcast::Sender<SessionEvent>,
}

impl StubSessionStore {
    pub fn new() -> Arc<Self> {
        let (events, _) = broadcast::channel(8);
        Arc::new(Self {
            user_id: Uuid::new_v4(),
            fail_password_update: AtomicBool::new(false),
            password_updates: AtomicUsize::new(0),
            events,
        })
    }

    pub fn fail_password_update(&self) {
        self.fail_password_update.store(true, Ordering::SeqCst);
    }

    pub fn password_updates(&self) -> usize {
        self.password_updates.load(Ordering::SeqCst)
    }

    fn session(&self) -> AuthSession {
        AuthSession {
            identity: Identity {
                user_id: self.user_id,
                email: "new-brother@example.org".to_string(),
                email_verified: false,
            },
            access_token: "stub-jwt".to_string(),
            refresh_token: None,
            expires_at: Some(Utc::now() + chrono::Duration::hours(1)),
        }
    }
}

#[async_trait]
impl SessionStore for StubSessionStore {
    async fn current_session(&self) -> Result<Option<AuthSession>> {
        Ok(Some(self.session()))
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    async fn sign_in(&self, _email: &str, _password: &str) -> Result<AuthSession> {
        Ok(self.session())
    }

    async fn sign_up(&self, _email: &str, _password: &str) -> Result<AuthSession> {
        Ok(self.session())
    }

    async fn sign_out(&self) -> Result<()> {
        Ok(())
    }

    async fn update_password(&self, _new_password: &str) -> Result<()> {
        if self.fail_password_update.load(Ordering::SeqCst) {
            return Err(TrestleError::Auth("Password update rejected".to_string()));
        }
        self.password_updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
