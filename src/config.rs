use crate::i18n::Language;
use anyhow::{Context, Result};

/// One language edition of an external form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormEdition {
    pub language: Language,
    pub form_id: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    // Storage
    pub database_url: String,

    // Server
    pub port: u16,

    // Form Provider
    pub forms_api_url: String,
    pub forms_token_url: String,
    pub forms_client_id: String,
    pub forms_client_secret: String,
    pub forms_refresh_token: String,
    pub upstream_timeout_secs: u64,

    // Form editions, in language priority order
    pub survey_forms: Vec<FormEdition>,
    pub registration_forms: Vec<FormEdition>,

    // Shared secret for submission notifications (disabled when unset)
    pub submission_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://survey.db?mode=rwc".to_string()),

            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),

            forms_api_url: std::env::var("FORMS_API_URL")
                .unwrap_or_else(|_| "https://forms.googleapis.com/v1".to_string()),
            forms_token_url: std::env::var("FORMS_TOKEN_URL")
                .unwrap_or_else(|_| "https://oauth2.googleapis.com/token".to_string()),
            forms_client_id: std::env::var("FORMS_CLIENT_ID")
                .context("FORMS_CLIENT_ID not set")?,
            forms_client_secret: std::env::var("FORMS_CLIENT_SECRET")
                .context("FORMS_CLIENT_SECRET not set")?,
            forms_refresh_token: std::env::var("FORMS_REFRESH_TOKEN")
                .context("FORMS_REFRESH_TOKEN not set")?,
            upstream_timeout_secs: std::env::var("UPSTREAM_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),

            survey_forms: editions_from_env("SURVEY_FORM_ID")?,
            registration_forms: editions_from_env("REGISTRATION_FORM_ID")?,

            submission_api_key: std::env::var("SUBMISSION_API_KEY")
                .ok()
                .filter(|v| !v.is_empty()),
        })
    }
}

/// Read `<PREFIX>_<CODE>` for every enabled language, e.g. `SURVEY_FORM_ID_EN`.
pub fn editions_from_env(prefix: &str) -> Result<Vec<FormEdition>> {
    Language::priority_order()
        .into_iter()
        .map(|language| {
            let key = format!("{}_{}", prefix, language.code().to_uppercase());
            let form_id = std::env::var(&key).with_context(|| format!("{} not set", key))?;
            Ok(FormEdition { language, form_id })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const REQUIRED: &[(&str, &str)] = &[
        ("FORMS_CLIENT_ID", "client"),
        ("FORMS_CLIENT_SECRET", "secret"),
        ("FORMS_REFRESH_TOKEN", "refresh"),
        ("SURVEY_FORM_ID_EN", "survey-en"),
        ("SURVEY_FORM_ID_FR", "survey-fr"),
        ("REGISTRATION_FORM_ID_EN", "reg-en"),
        ("REGISTRATION_FORM_ID_FR", "reg-fr"),
    ];

    const OPTIONAL: &[&str] = &[
        "DATABASE_URL",
        "PORT",
        "FORMS_API_URL",
        "FORMS_TOKEN_URL",
        "UPSTREAM_TIMEOUT_SECS",
        "SUBMISSION_API_KEY",
    ];

    fn set_required_env() {
        for (key, value) in REQUIRED {
            std::env::set_var(key, value);
        }
        for key in OPTIONAL {
            std::env::remove_var(key);
        }
    }

    fn clear_env() {
        for (key, _) in REQUIRED {
            std::env::remove_var(key);
        }
        for key in OPTIONAL {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        set_required_env();

        let config = Config::from_env().expect("config should load");

        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url, "sqlite://survey.db?mode=rwc");
        assert_eq!(config.forms_api_url, "https://forms.googleapis.com/v1");
        assert_eq!(config.upstream_timeout_secs, 10);
        assert!(config.submission_api_key.is_none());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_editions_in_priority_order() {
        set_required_env();

        let config = Config::from_env().expect("config should load");

        assert_eq!(
            config.survey_forms,
            vec![
                FormEdition {
                    language: Language::ENGLISH,
                    form_id: "survey-en".to_string()
                },
                FormEdition {
                    language: Language::FRENCH,
                    form_id: "survey-fr".to_string()
                },
            ]
        );
        assert_eq!(config.registration_forms[1].form_id, "reg-fr");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_missing_edition() {
        set_required_env();
        std::env::remove_var("SURVEY_FORM_ID_FR");

        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("SURVEY_FORM_ID_FR not set"));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        set_required_env();
        std::env::set_var("PORT", "9090");
        std::env::set_var("UPSTREAM_TIMEOUT_SECS", "3");
        std::env::set_var("SUBMISSION_API_KEY", "hook-secret");

        let config = Config::from_env().expect("config should load");

        assert_eq!(config.port, 9090);
        assert_eq!(config.upstream_timeout_secs, 3);
        assert_eq!(config.submission_api_key.as_deref(), Some("hook-secret"));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_empty_api_key_disables_check() {
        set_required_env();
        std::env::set_var("SUBMISSION_API_KEY", "");

        let config = Config::from_env().expect("config should load");
        assert!(config.submission_api_key.is_none());

        clear_env();
    }
}
