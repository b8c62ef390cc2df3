//! Identity and session types
//!
//! The identity provider owns these; Trestle only reads them. Expiry
//! handling mirrors the provider's bearer-token semantics: sessions carry
//! both a lifetime and an absolute expiry timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::TOKEN_EXPIRY_THRESHOLD_SECS;

/// Authenticated identity as reported by the provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    /// Opaque provider-assigned user id
    pub user_id: Uuid,
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
}

/// Live session: an identity plus its bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub identity: Identity,
    /// JWT access token for backend requests
    pub access_token: String,
    /// Refresh token, when the provider issued one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Absolute expiration timestamp (UTC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthSession {
    /// Check if the session is expired or will expire within the default
    /// threshold.
    ///
    /// Sessions without an expiry timestamp are treated as valid.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_within(TOKEN_EXPIRY_THRESHOLD_SECS)
    }

    /// Check expiry against an explicit threshold in seconds.
    #[must_use]
    pub fn expires_within(&self, threshold_seconds: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                Utc::now() + chrono::Duration::seconds(threshold_seconds) >= expires_at
            }
            None => false,
        }
    }
}

/// Session-change events emitted by the identity provider.
///
/// Delivered in emission order over a broadcast channel; the auth service
/// is the single consumer.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    SignedIn(AuthSession),
    SignedOut,
    TokenRefreshed(AuthSession),
}
