use crate::config::Config;
use crate::db::Database;
use crate::forms::client::FormsClient;
use crate::forms::credentials::OAuthRefreshCredentials;
use crate::identity::{HeaderIdentity, IdentityProvider};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

/// Shared handles for request handlers.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub forms: FormsClient,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    /// Wire the production collaborators from configuration.
    pub async fn from_config(config: Config) -> Result<Arc<Self>> {
        let db = Database::new(&config.database_url).await?;

        let token_http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upstream_timeout_secs))
            .build()?;
        let credentials = Arc::new(OAuthRefreshCredentials::new(
            token_http,
            config.forms_token_url.clone(),
            config.forms_client_id.clone(),
            config.forms_client_secret.clone(),
            config.forms_refresh_token.clone(),
        ));
        let forms = FormsClient::from_config(&config, credentials)?;

        Ok(Self::new(config, db, forms, Arc::new(HeaderIdentity)))
    }

    pub fn new(
        config: Config,
        db: Database,
        forms: FormsClient,
        identity: Arc<dyn IdentityProvider>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            db,
            forms,
            identity,
        })
    }
}
