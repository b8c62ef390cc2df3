//! Member-profile repository over the store's REST interface
//!
//! Rows live in a `member_profiles` resource with PostgREST-style filter
//! syntax. Reads that match zero rows come back as empty arrays and
//! normalize to `None`/`NotFound` here; the row-count HEAD request doubles
//! as the connectivity probe.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use tracing::{debug, warn};
use trestle_core::ProfileRepository;
use trestle_domain::{
    BackendConfig, MemberProfile, NewProfile, ProfilePatch, Result, TrestleError,
};
use uuid::Uuid;

use crate::http::HttpClient;
use crate::identity::AccessTokenProvider;

/// Profile repository talking to the hosted data store.
pub struct RestProfileRepository {
    http: HttpClient,
    rest_base: String,
    anon_key: String,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl RestProfileRepository {
    /// Create a repository for the configured backend.
    ///
    /// # Errors
    /// Returns `TrestleError::Config` when the HTTP client cannot be built.
    pub fn new(config: &BackendConfig, tokens: Arc<dyn AccessTokenProvider>) -> Result<Arc<Self>> {
        Ok(Arc::new(Self {
            http: HttpClient::new()?,
            rest_base: format!("{}/rest/v1", config.base_url.trim_end_matches('/')),
            anon_key: config.anon_key.clone(),
            tokens,
        }))
    }

    async fn authed(&self, method: Method, url: String) -> Result<RequestBuilder> {
        // Row-level security runs under the caller's token; anonymous
        // requests fall back to the publishable key
        let bearer = self.tokens.access_token().await?.unwrap_or_else(|| self.anon_key.clone());
        Ok(self
            .http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {bearer}")))
    }

    async fn rows_from(response: Response) -> Result<Vec<MemberProfile>> {
        response
            .json()
            .await
            .map_err(|e| TrestleError::Server(format!("Failed to parse store response: {e}")))
    }

    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = if body.is_empty() {
            format!("store returned status {status}")
        } else {
            format!("store returned status {status}: {body}")
        };
        warn!(%status, "store request failed");

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => TrestleError::Auth(message),
            StatusCode::NOT_FOUND => TrestleError::NotFound(message),
            _ => TrestleError::Server(message),
        })
    }
}

#[async_trait]
impl ProfileRepository for RestProfileRepository {
    async fn probe(&self) -> Result<()> {
        let url = format!("{}/member_profiles?select=id&limit=1", self.rest_base);
        let request = self
            .authed(Method::HEAD, url)
            .await?
            .header("Prefer", "count=exact");

        let response = self.http.send(request).await.map_err(|err| {
            TrestleError::Connection(format!("connectivity probe failed: {err}"))
        })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(TrestleError::Connection(format!(
                "connectivity probe returned status {}",
                response.status()
            )))
        }
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<MemberProfile>> {
        let url = format!("{}/member_profiles?user_id=eq.{user_id}&limit=1", self.rest_base);
        let request = self.authed(Method::GET, url).await?;

        let response = Self::check_status(self.http.send(request).await?).await?;
        let rows = Self::rows_from(response).await?;
        debug!(%user_id, found = !rows.is_empty(), "profile lookup");
        Ok(rows.into_iter().next())
    }

    async fn insert(&self, profile: NewProfile) -> Result<MemberProfile> {
        let url = format!("{}/member_profiles", self.rest_base);
        let request = self
            .authed(Method::POST, url)
            .await?
            .header("Prefer", "return=representation")
            .json(&profile);

        let response = Self::check_status(self.http.send(request).await?).await?;
        let rows = Self::rows_from(response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| TrestleError::Server("insert returned no representation".to_string()))
    }

    async fn update(&self, id: Uuid, patch: ProfilePatch) -> Result<MemberProfile> {
        if patch.is_empty() {
            return Err(TrestleError::Validation("update carries no fields".to_string()));
        }

        let url = format!("{}/member_profiles?id=eq.{id}", self.rest_base);
        let request = self
            .authed(Method::PATCH, url)
            .await?
            .header("Prefer", "return=representation")
            .json(&patch);

        let response = Self::check_status(self.http.send(request).await?).await?;
        let rows = Self::rows_from(response).await?;
        // A filter matching nothing is a 200 with an empty array, which for
        // a keyed update means the row is gone
        rows.into_iter().next().ok_or_else(|| TrestleError::NotFound(format!("profile {id}")))
    }

    async fn list_active(&self) -> Result<Vec<MemberProfile>> {
        let url =
            format!("{}/member_profiles?status=eq.active&order=full_name.asc", self.rest_base);
        let request = self.authed(Method::GET, url).await?;

        let response = Self::check_status(self.http.send(request).await?).await?;
        Self::rows_from(response).await
    }
}

impl std::fmt::Debug for RestProfileRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestProfileRepository").field("rest_base", &self.rest_base).finish()
    }
}
