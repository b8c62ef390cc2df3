//! Identity provider REST client
//!
//! Talks to the hosted provider's auth endpoints (password grant, signup,
//! logout, user update, refresh). The client is the single emitter of
//! session-change events: every successful lifecycle call both updates the
//! stored session and broadcasts the matching event, in call order.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};
use trestle_core::SessionStore;
use trestle_domain::{
    AuthSession, BackendConfig, Identity, Result, SessionEvent, TrestleError,
};
use uuid::Uuid;

use crate::http::HttpClient;

const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Trait for providing access tokens to the data-store and admin clients.
///
/// Allows dependency injection and testing with static providers.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Current bearer token, if a session is active.
    async fn access_token(&self) -> Result<Option<String>>;
}

/// Token grant response from the provider
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    user: ProviderUser,
}

#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: Uuid,
    email: String,
    email_confirmed_at: Option<chrono::DateTime<Utc>>,
}

/// Error body shape used by the provider (fields vary by endpoint)
#[derive(Debug, Default, Deserialize)]
struct ProviderError {
    error: Option<String>,
    error_description: Option<String>,
    msg: Option<String>,
}

impl ProviderError {
    fn message(self, fallback: &str) -> String {
        self.error_description
            .or(self.msg)
            .or(self.error)
            .unwrap_or_else(|| fallback.to_string())
    }
}

impl From<TokenResponse> for AuthSession {
    fn from(response: TokenResponse) -> Self {
        let expires_at =
            response.expires_in.filter(|s| *s > 0).map(|s| Utc::now() + chrono::Duration::seconds(s));
        Self {
            identity: Identity {
                user_id: response.user.id,
                email: response.user.email,
                email_verified: response.user.email_confirmed_at.is_some(),
            },
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_at,
        }
    }
}

/// Identity provider client; implements the `SessionStore` port.
pub struct IdentityClient {
    http: HttpClient,
    auth_base: String,
    anon_key: String,
    session: RwLock<Option<AuthSession>>,
    events: broadcast::Sender<SessionEvent>,
}

impl IdentityClient {
    /// Create a client for the configured backend.
    ///
    /// # Errors
    /// Returns `TrestleError::Config` when the HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Arc<Self>> {
        let http = HttpClient::new()?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Arc::new(Self {
            http,
            auth_base: format!("{}/auth/v1", config.base_url.trim_end_matches('/')),
            anon_key: config.anon_key.clone(),
            session: RwLock::new(None),
            events,
        }))
    }

    /// Refresh the current session using its refresh token.
    ///
    /// Emits `TokenRefreshed` on success.
    ///
    /// # Errors
    /// - `TrestleError::Auth` when no session or refresh token exists, or
    ///   the provider rejects the token
    /// - `TrestleError::Connection` when the provider is unreachable
    pub async fn refresh_session(&self) -> Result<AuthSession> {
        let refresh_token = {
            let session = self.session.read().await;
            session
                .as_ref()
                .and_then(|s| s.refresh_token.clone())
                .ok_or_else(|| TrestleError::Auth("No refresh token available".to_string()))?
        };

        let url = format!("{}/token?grant_type=refresh_token", self.auth_base);
        let body = serde_json::json!({ "refresh_token": refresh_token });
        let session: AuthSession = self.token_request(&url, &body).await?;

        *self.session.write().await = Some(session.clone());
        self.emit(SessionEvent::TokenRefreshed(session.clone()));
        debug!("session refreshed");
        Ok(session)
    }

    async fn token_request(&self, url: &str, body: &serde_json::Value) -> Result<AuthSession> {
        let request = self
            .http
            .request(Method::POST, url)
            .header("apikey", &self.anon_key)
            .header("Content-Type", "application/json")
            .json(body);

        let response = self.http.send(request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Self::map_provider_error(status, response).await);
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| TrestleError::Server(format!("Failed to parse token response: {e}")))?;
        Ok(token.into())
    }

    async fn map_provider_error(status: StatusCode, response: reqwest::Response) -> TrestleError {
        let body: ProviderError = response.json().await.unwrap_or_default();
        let message = body.message(status.as_str());

        if status.is_server_error() {
            TrestleError::Server(message)
        } else {
            // 400/401/422 from the auth endpoints all mean the provider
            // rejected the credentials or token
            TrestleError::Auth(message)
        }
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers yet is fine; the auth service attaches later
        let _ = self.events.send(event);
    }

    fn bearer(&self, session: &AuthSession) -> String {
        format!("Bearer {}", session.access_token)
    }
}

#[async_trait]
impl SessionStore for IdentityClient {
    async fn current_session(&self) -> Result<Option<AuthSession>> {
        let stored = self.session.read().await.clone();
        match stored {
            Some(session) if session.is_expired() && session.refresh_token.is_some() => {
                // Provider call may fail with Connection; surface it so the
                // auth service can fail open
                Ok(Some(self.refresh_session().await?))
            }
            other => Ok(other),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession> {
        let url = format!("{}/token?grant_type=password", self.auth_base);
        let body = serde_json::json!({ "email": email, "password": password });
        let session = self.token_request(&url, &body).await?;

        *self.session.write().await = Some(session.clone());
        self.emit(SessionEvent::SignedIn(session.clone()));
        info!(email, "signed in");
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession> {
        let url = format!("{}/signup", self.auth_base);
        let body = serde_json::json!({ "email": email, "password": password });
        let session = self.token_request(&url, &body).await?;

        *self.session.write().await = Some(session.clone());
        self.emit(SessionEvent::SignedIn(session.clone()));
        info!(email, "signed up");
        Ok(session)
    }

    async fn sign_out(&self) -> Result<()> {
        let Some(session) = self.session.read().await.clone() else {
            // Nothing to revoke
            return Ok(());
        };

        let url = format!("{}/logout", self.auth_base);
        let request = self
            .http
            .request(Method::POST, &url)
            .header("apikey", &self.anon_key)
            .header("Authorization", self.bearer(&session));

        let response = self.http.send(request).await?;
        let status = response.status();
        if !status.is_success() && status != StatusCode::UNAUTHORIZED {
            // 401 means the token was already dead; treat as signed out
            let err = Self::map_provider_error(status, response).await;
            warn!(error = %err, "logout failed");
            return Err(err);
        }

        *self.session.write().await = None;
        self.emit(SessionEvent::SignedOut);
        info!("signed out");
        Ok(())
    }

    async fn update_password(&self, new_password: &str) -> Result<()> {
        let Some(session) = self.session.read().await.clone() else {
            return Err(TrestleError::Auth("No active session".to_string()));
        };

        let url = format!("{}/user", self.auth_base);
        let body = serde_json::json!({ "password": new_password });
        let request = self
            .http
            .request(Method::PUT, &url)
            .header("apikey", &self.anon_key)
            .header("Authorization", self.bearer(&session))
            .json(&body);

        let response = self.http.send(request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Self::map_provider_error(status, response).await);
        }

        info!("password updated");
        Ok(())
    }
}

#[async_trait]
impl AccessTokenProvider for IdentityClient {
    async fn access_token(&self) -> Result<Option<String>> {
        Ok(self.session.read().await.as_ref().map(|s| s.access_token.clone()))
    }
}

impl std::fmt::Debug for IdentityClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityClient").field("auth_base", &self.auth_base).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_conversion() {
        let response = TokenResponse {
            access_token: "jwt".to_string(),
            refresh_token: Some("refresh".to_string()),
            expires_in: Some(3600),
            user: ProviderUser {
                id: Uuid::new_v4(),
                email: "wm@example.org".to_string(),
                email_confirmed_at: Some(Utc::now()),
            },
        };

        let session: AuthSession = response.into();
        assert_eq!(session.access_token, "jwt");
        assert!(session.identity.email_verified);
        assert!(session.expires_at.is_some());
        assert!(!session.is_expired());
    }

    #[test]
    fn test_provider_error_message_priority() {
        let err = ProviderError {
            error: Some("invalid_grant".to_string()),
            error_description: Some("Invalid login credentials".to_string()),
            msg: None,
        };
        assert_eq!(err.message("fallback"), "Invalid login credentials");

        let bare = ProviderError::default();
        assert_eq!(bare.message("fallback"), "fallback");
    }
}
