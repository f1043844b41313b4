use crate::config::{Config, FormEdition};
use crate::error::AppError;
use crate::forms::credentials::CredentialProvider;
use crate::forms::model::{FormMetadata, RawResponse, ResponsesPage};
use crate::i18n::Language;
use anyhow::{Context, Result};
use futures::future::try_join_all;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Metadata and every response of one form edition.
#[derive(Debug, Clone)]
pub struct FetchedEdition {
    pub language: Language,
    pub form_id: String,
    pub metadata: FormMetadata,
    pub responses: Vec<RawResponse>,
}

/// Form Provider HTTP client.
///
/// Calls are never retried: a failed call fails the request that made it.
#[derive(Clone)]
pub struct FormsClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl FormsClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build Form Provider HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn from_config(config: &Config, credentials: Arc<dyn CredentialProvider>) -> Result<Self> {
        Self::new(
            config.forms_api_url.clone(),
            Duration::from_secs(config.upstream_timeout_secs),
            credentials,
        )
    }

    pub async fn get_form(&self, form_id: &str) -> Result<FormMetadata, AppError> {
        let url = format!("{}/forms/{}", self.base_url, form_id);
        self.get_json(&url, &[]).await
    }

    /// All responses of a form, following pagination.
    pub async fn list_responses(&self, form_id: &str) -> Result<Vec<RawResponse>, AppError> {
        let url = format!("{}/forms/{}/responses", self.base_url, form_id);
        let mut all_responses = Vec::new();
        let mut next_page_token: Option<String> = None;

        loop {
            let query: Vec<(&str, &str)> = match &next_page_token {
                Some(token) => vec![("pageToken", token.as_str())],
                None => Vec::new(),
            };

            let page: ResponsesPage = self.get_json(&url, &query).await?;
            all_responses.extend(page.responses);

            next_page_token = page.next_page_token.filter(|t| !t.is_empty());
            if next_page_token.is_none() {
                break;
            }
        }

        for response in &mut all_responses {
            if response.form_id.is_empty() {
                response.form_id = form_id.to_string();
            }
        }

        debug!("Fetched {} responses for form {}", all_responses.len(), form_id);
        Ok(all_responses)
    }

    /// One response. A provider 404 is reported as `NotFound`.
    pub async fn get_response(&self, form_id: &str, response_id: &str) -> Result<RawResponse, AppError> {
        let url = format!("{}/forms/{}/responses/{}", self.base_url, form_id, response_id);
        let response = self.send(&url, &[]).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!(
                "response {} of form {}",
                response_id, form_id
            )));
        }

        let mut response: RawResponse = Self::decode(response).await?;
        if response.form_id.is_empty() {
            response.form_id = form_id.to_string();
        }

        Ok(response)
    }

    /// Metadata and responses of one edition, fetched concurrently.
    pub async fn fetch_edition(&self, edition: &FormEdition) -> Result<FetchedEdition, AppError> {
        let (metadata, responses) = futures::try_join!(
            self.get_form(&edition.form_id),
            self.list_responses(&edition.form_id)
        )?;

        Ok(FetchedEdition {
            language: edition.language,
            form_id: edition.form_id.clone(),
            metadata,
            responses,
        })
    }

    /// Every edition, in the order given. The first failure aborts the rest.
    pub async fn fetch_editions(&self, editions: &[FormEdition]) -> Result<Vec<FetchedEdition>, AppError> {
        let fetched = try_join_all(editions.iter().map(|edition| self.fetch_edition(edition))).await?;

        info!(
            "Fetched {} form editions ({} responses)",
            fetched.len(),
            fetched.iter().map(|e| e.responses.len()).sum::<usize>()
        );

        Ok(fetched)
    }

    async fn send(&self, url: &str, query: &[(&str, &str)]) -> Result<reqwest::Response, AppError> {
        let token = self.credentials.fetch_token().await?;

        self.http
            .get(url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::UpstreamUnavailable(format!("Form Provider request failed: {}", e)))
    }

    /// Decode a success body. Any other status is a gateway failure.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, AppError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::UpstreamUnavailable(format!(
                "Form Provider error ({}): {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::UpstreamUnavailable(format!("Failed to parse Form Provider response: {}", e)))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T, AppError> {
        let response = self.send(url, query).await?;
        Self::decode(response).await
    }
}
