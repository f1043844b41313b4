//! Request-level orchestration over the Form Provider.
//!
//! Each call fetches the editions it needs, runs the index/merge or email
//! pipeline and hands back a serializable result. Nothing is cached between
//! requests.

use crate::config::FormEdition;
use crate::db::Database;
use crate::error::AppError;
use crate::forms::client::{FetchedEdition, FormsClient};
use crate::forms::email::{find_by_email, resolve_email_questions};
use crate::forms::index::QuestionIndex;
use crate::forms::merge::merge;
use crate::forms::model::{FormMetadata, RawResponse, TranslatedResponse};
use crate::i18n::{Language, LanguageRegistry};
use serde::Serialize;
use tracing::{info, warn};

/// All survey responses rendered in one display language.
#[derive(Debug, Clone, Serialize)]
pub struct MergedResponses {
    pub responses: Vec<TranslatedResponse>,
    /// Metadata of the display language's edition
    pub meta: FormMetadata,
}

/// Result of an onboarding lookup. Empty when nobody used the email.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OnboardingLookup {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<FormMetadata>,
    pub responses: Vec<RawResponse>,
}

fn cohorts<'a>(fetched: &'a [FetchedEdition]) -> impl Iterator<Item = (&'a str, &'a [RawResponse])> {
    fetched
        .iter()
        .map(|e| (e.language.code(), e.responses.as_slice()))
}

/// Fetch every edition and merge their cohorts in `language`.
pub async fn merged_responses(
    forms: &FormsClient,
    editions: &[FormEdition],
    language: Language,
) -> Result<MergedResponses, AppError> {
    let fetched = forms.fetch_editions(editions).await?;

    let meta = fetched
        .iter()
        .find(|e| e.language == language)
        .map(|e| e.metadata.clone())
        .ok_or_else(|| {
            AppError::Configuration(format!("no form edition configured for {}", language))
        })?;

    let index = QuestionIndex::build(fetched.iter().map(|e| (e.language.code(), &e.metadata)));
    if index.is_empty() {
        warn!("Survey editions define no questions; answers pass through untranslated");
    }
    let responses = merge(&index, cohorts(&fetched), language.code());

    info!(
        "Merged {} responses ({} questions, {} editions) into {}",
        responses.len(),
        index.len(),
        fetched.len(),
        language
    );

    Ok(MergedResponses { responses, meta })
}

/// Find the onboarding submission made with `email`.
pub async fn onboarding_lookup(
    forms: &FormsClient,
    editions: &[FormEdition],
    email: &str,
) -> Result<OnboardingLookup, AppError> {
    let fetched = forms.fetch_editions(editions).await?;

    let titles = LanguageRegistry::get().email_question_titles();
    let email_questions =
        resolve_email_questions(fetched.iter().map(|e| (e.language.code(), &e.metadata)), &titles);

    let Some(found) = find_by_email(&email_questions, cohorts(&fetched), email)? else {
        info!("No onboarding submission found for lookup email");
        return Ok(OnboardingLookup::default());
    };

    let meta = fetched
        .iter()
        .find(|e| e.language.code() == found.language)
        .map(|e| e.metadata.clone());

    Ok(OnboardingLookup {
        meta,
        responses: vec![found.response.clone()],
    })
}

/// The provider's copy of the response the user was credited for on `form_id`.
pub async fn course_response(
    db: &Database,
    forms: &FormsClient,
    user_id: &str,
    form_id: &str,
) -> Result<RawResponse, AppError> {
    let record = db
        .submission_for(user_id, form_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no submission recorded for form {}", form_id)))?;

    forms
        .get_response(&record.external_form_id, &record.external_response_id)
        .await
}
