//! Client for the privileged delete-user endpoint

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::Deserialize;
use tracing::{error, info, warn};
use trestle_domain::{BackendConfig, Result, TrestleError};
use uuid::Uuid;

use crate::http::HttpClient;
use crate::identity::AccessTokenProvider;

/// Confirmation body returned by the endpoint on success
#[derive(Debug, Deserialize)]
struct DeleteConfirmation {
    #[serde(default)]
    message: Option<String>,
}

/// Client for privileged member administration.
pub struct AdminClient {
    http: HttpClient,
    functions_base: String,
    anon_key: String,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl AdminClient {
    /// Create a client for the configured functions endpoint.
    ///
    /// # Errors
    /// Returns `TrestleError::Config` when the HTTP client cannot be built.
    pub fn new(config: &BackendConfig, tokens: Arc<dyn AccessTokenProvider>) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new()?,
            functions_base: config.functions_base(),
            anon_key: config.anon_key.clone(),
            tokens,
        })
    }

    /// Delete a member's profile and identity via the privileged endpoint.
    ///
    /// Self-deletion is refused locally, before any request is made. The
    /// endpoint itself re-checks that the caller is an active admin.
    ///
    /// # Errors
    /// - `TrestleError::Validation` for a self-delete attempt
    /// - `TrestleError::Auth` for 401/403 (missing token, caller not an
    ///   active admin)
    /// - `TrestleError::NotFound` for 404 (target already gone)
    /// - `TrestleError::Server` otherwise, including the partial-failure 500
    pub async fn delete_member(&self, caller_user_id: Uuid, target_user_id: Uuid) -> Result<()> {
        if caller_user_id == target_user_id {
            return Err(TrestleError::Validation("Cannot delete your own account".to_string()));
        }

        let token = self
            .tokens
            .access_token()
            .await?
            .ok_or_else(|| TrestleError::Auth("No active session".to_string()))?;

        let url = format!("{}/delete-user", self.functions_base);
        let body = serde_json::json!({ "user_id": target_user_id });
        let request = self
            .http
            .request(Method::POST, &url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {token}"))
            .json(&body);

        let response = self.http.send(request).await?;
        let status = response.status();

        if status.is_success() {
            let confirmation: DeleteConfirmation =
                response.json().await.unwrap_or(DeleteConfirmation { message: None });
            info!(
                %target_user_id,
                message = confirmation.message.as_deref().unwrap_or("deleted"),
                "member deleted"
            );
            return Ok(());
        }

        let detail = response.text().await.unwrap_or_default();
        let message = if detail.is_empty() {
            format!("delete-user returned status {status}")
        } else {
            format!("delete-user returned status {status}: {detail}")
        };

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                warn!(%target_user_id, %status, "delete-user rejected caller");
                TrestleError::Auth(message)
            }
            StatusCode::NOT_FOUND => TrestleError::NotFound(message),
            _ => {
                // A 500 can mean the profile row went away while the
                // identity survived; surfaced verbatim, reconciliation is
                // the server's problem
                error!(%target_user_id, %status, "delete-user failed, state may be partial");
                TrestleError::Server(message)
            }
        })
    }
}

impl std::fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminClient").field("functions_base", &self.functions_base).finish()
    }
}
