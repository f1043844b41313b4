use crate::error::AppError;
use crate::forms::model::RawResponse;
use crate::identity::{Principal, Staff};
use crate::i18n::Language;
use crate::ledger::SubmissionRecord;
use crate::responses::{self, MergedResponses, OnboardingLookup};
use crate::security::require_api_key;
use crate::state::AppState;
use crate::survey::{mark_completed, StatusReport};
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/status", get(status_handler).post(view_handler))
        .route("/api/completed", post(completed_handler))
        .route("/api/responses", get(responses_handler))
        .route("/api/responses/registration", get(registration_handler))
        .route("/api/responses/course", get(course_response_handler))
        .route("/api/submissions", post(submission_handler))
        .route("/api/course-forms", get(course_forms_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ==================== Survey status ====================

async fn status_handler(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<StatusReport>, AppError> {
    let record = state.db.get_or_create_survey(&principal.user_id).await?;
    Ok(Json(StatusReport::from(&record)))
}

async fn view_handler(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<StatusReport>, AppError> {
    let stored = state.db.record_view(&principal.user_id).await?;
    Ok(Json(StatusReport::from(&stored)))
}

#[derive(Debug, Deserialize)]
pub struct CompletedRequest {
    #[serde(default)]
    pub email: Option<String>,
}

async fn completed_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<CompletedRequest>,
) -> Result<Json<StatusReport>, AppError> {
    require_api_key(&headers, state.config.submission_api_key.as_deref())?;

    let email = non_blank(payload.email)
        .ok_or_else(|| AppError::BadRequest("email is required".to_string()))?;

    let user = state
        .db
        .find_user_by_email(&email)
        .await?
        .ok_or_else(|| AppError::NotFound("no user with that email".to_string()))?;

    let record = state.db.get_or_create_survey(&user.user_id).await?;
    let stored = state.db.save_survey(&mark_completed(record)).await?;

    info!("Survey completed for user {}", user.user_id);
    Ok(Json(StatusReport::from(&stored)))
}

// ==================== Form responses ====================

#[derive(Debug, Deserialize)]
pub struct ResponsesQuery {
    #[serde(default)]
    pub lang: Option<String>,
}

async fn responses_handler(
    State(state): State<Arc<AppState>>,
    Staff(_): Staff,
    Query(query): Query<ResponsesQuery>,
) -> Result<Json<MergedResponses>, AppError> {
    let language = match non_blank(query.lang) {
        Some(code) => Language::from_code(&code).map_err(|e| AppError::BadRequest(e.to_string()))?,
        None => Language::primary(),
    };

    let merged = responses::merged_responses(&state.forms, &state.config.survey_forms, language).await?;
    Ok(Json(merged))
}

#[derive(Debug, Deserialize)]
pub struct RegistrationQuery {
    #[serde(default)]
    pub email: Option<String>,
}

async fn registration_handler(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Query(query): Query<RegistrationQuery>,
) -> Result<Json<OnboardingLookup>, AppError> {
    let email = non_blank(query.email)
        .or_else(|| principal.email.clone())
        .ok_or_else(|| AppError::BadRequest("email is required".to_string()))?;

    let own_email = principal
        .email
        .as_deref()
        .is_some_and(|own| own.trim().eq_ignore_ascii_case(&email));
    if !principal.is_staff && !own_email {
        return Err(AppError::Forbidden);
    }

    let found =
        responses::onboarding_lookup(&state.forms, &state.config.registration_forms, &email).await?;
    Ok(Json(found))
}

#[derive(Debug, Deserialize)]
pub struct CourseResponseQuery {
    #[serde(default)]
    pub form_id: Option<String>,
}

async fn course_response_handler(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Query(query): Query<CourseResponseQuery>,
) -> Result<Json<RawResponse>, AppError> {
    let form_id = non_blank(query.form_id)
        .ok_or_else(|| AppError::BadRequest("form_id is required".to_string()))?;

    let response = responses::course_response(&state.db, &state.forms, &principal.user_id, &form_id).await?;
    Ok(Json(response))
}

// ==================== Submission ledger ====================

#[derive(Debug, Deserialize)]
pub struct SubmissionRequest {
    pub email: String,
    pub external_form_id: String,
    pub external_response_id: String,
}

async fn submission_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<SubmissionRequest>,
) -> Result<(StatusCode, Json<SubmissionRecord>), AppError> {
    require_api_key(&headers, state.config.submission_api_key.as_deref())?;

    let form_id = payload.external_form_id.trim();
    let response_id = payload.external_response_id.trim();
    if form_id.is_empty() || response_id.is_empty() {
        return Err(AppError::BadRequest(
            "external_form_id and external_response_id are required".to_string(),
        ));
    }

    let user = state
        .db
        .find_user_by_email(&payload.email)
        .await?
        .ok_or_else(|| AppError::NotFound("no user with that email".to_string()))?;

    let record = state
        .db
        .record_submission(&user.user_id, form_id, response_id, Utc::now())
        .await?;

    Ok((StatusCode::CREATED, Json(record)))
}

async fn course_forms_handler(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<Vec<SubmissionRecord>>, AppError> {
    let records = state.db.list_submissions_for_user(&principal.user_id).await?;
    Ok(Json(records))
}
