//! Preview binary - fetches both survey editions and prints the merged
//! responses in one display language, without touching the database.
//!
//! Usage:
//!   cargo run --bin preview          # Merge in the primary language
//!   cargo run --bin preview -- fr    # Merge in French
//!
//! Required environment variables:
//! - SURVEY_FORM_ID_EN, SURVEY_FORM_ID_FR
//! - FORMS_ACCESS_TOKEN, or FORMS_CLIENT_ID + FORMS_CLIENT_SECRET + FORMS_REFRESH_TOKEN
//!
//! Optional:
//! - FORMS_API_URL (defaults to https://forms.googleapis.com/v1)
//! - FORMS_TOKEN_URL (defaults to https://oauth2.googleapis.com/token)
//! - UPSTREAM_TIMEOUT_SECS (defaults to 10)

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use survey_api::config::editions_from_env;
use survey_api::forms::client::FormsClient;
use survey_api::forms::credentials::{CredentialProvider, OAuthRefreshCredentials, StaticToken};
use survey_api::i18n::Language;
use survey_api::responses::merged_responses;
use tracing::info;

fn credentials_from_env(timeout: Duration) -> Result<Arc<dyn CredentialProvider>> {
    if let Ok(token) = std::env::var("FORMS_ACCESS_TOKEN") {
        if !token.is_empty() {
            return Ok(Arc::new(StaticToken(token)));
        }
    }

    let http = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build token HTTP client")?;

    Ok(Arc::new(OAuthRefreshCredentials::new(
        http,
        std::env::var("FORMS_TOKEN_URL")
            .unwrap_or_else(|_| "https://oauth2.googleapis.com/token".to_string()),
        std::env::var("FORMS_CLIENT_ID").context("FORMS_CLIENT_ID not set")?,
        std::env::var("FORMS_CLIENT_SECRET").context("FORMS_CLIENT_SECRET not set")?,
        std::env::var("FORMS_REFRESH_TOKEN").context("FORMS_REFRESH_TOKEN not set")?,
    )))
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("survey_api=info".parse()?)
                .add_directive("preview=info".parse()?),
        )
        .init();

    let language = match std::env::args().nth(1) {
        Some(code) => Language::from_code(&code)?,
        None => Language::primary(),
    };

    let timeout = Duration::from_secs(
        std::env::var("UPSTREAM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10),
    );
    let base_url = std::env::var("FORMS_API_URL")
        .unwrap_or_else(|_| "https://forms.googleapis.com/v1".to_string());

    let editions = editions_from_env("SURVEY_FORM_ID")?;
    let forms = FormsClient::new(base_url, timeout, credentials_from_env(timeout)?)?;

    info!(
        "Merging {} editions in {} ({})",
        editions.len(),
        language.name(),
        language.native_name()
    );
    let merged = merged_responses(&forms, &editions, language)
        .await
        .context("Failed to fetch survey responses")?;

    println!("\n{}", "=".repeat(60));
    println!(
        "{}: {} responses",
        merged
            .meta
            .info
            .as_ref()
            .map(|i| i.title.as_str())
            .unwrap_or(merged.meta.form_id.as_str()),
        merged.responses.len()
    );
    println!("{}\n", "=".repeat(60));
    println!("{}", serde_json::to_string_pretty(&merged.responses)?);

    Ok(())
}
