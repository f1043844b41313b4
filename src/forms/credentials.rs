use crate::error::AppError;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// Issues bearer tokens for the Form Provider.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn fetch_token(&self) -> Result<String, AppError>;
}

/// A fixed token (CLI runs and tests).
pub struct StaticToken(pub String);

#[async_trait]
impl CredentialProvider for StaticToken {
    async fn fetch_token(&self) -> Result<String, AppError> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// OAuth refresh-token grant against the credential issuer.
///
/// The access token is reused until shortly before it expires.
pub struct OAuthRefreshCredentials {
    client: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    refresh_token: String,
    cached: Mutex<Option<(String, Instant)>>,
}

/// Tokens are refreshed this long before the issuer says they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

impl OAuthRefreshCredentials {
    pub fn new(
        client: reqwest::Client,
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            refresh_token: refresh_token.into(),
            cached: Mutex::new(None),
        }
    }

    async fn request_token(&self) -> Result<TokenResponse, AppError> {
        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", self.refresh_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::UpstreamUnavailable(format!("credential issuer: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::UpstreamUnavailable(format!(
                "credential issuer error ({}): {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::UpstreamUnavailable(format!("credential issuer response: {}", e)))
    }
}

#[async_trait]
impl CredentialProvider for OAuthRefreshCredentials {
    async fn fetch_token(&self) -> Result<String, AppError> {
        let mut cached = self.cached.lock().await;

        if let Some((token, expires_at)) = cached.as_ref() {
            if Instant::now() < *expires_at {
                return Ok(token.clone());
            }
        }

        debug!("Refreshing Form Provider access token");
        let issued = self.request_token().await?;

        // No expiry, or one past what the clock can represent, means the token is used once
        let expires_at = issued
            .expires_in
            .map(Duration::from_secs)
            .and_then(|ttl| ttl.checked_sub(EXPIRY_MARGIN))
            .and_then(|ttl| Instant::now().checked_add(ttl))
            .unwrap_or_else(Instant::now);

        *cached = Some((issued.access_token.clone(), expires_at));
        Ok(issued.access_token)
    }
}
