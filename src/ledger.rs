//! Submission ledger: which external form response credited which user.
//!
//! A (form, response) pair can be recorded once across all users. The
//! unique index does the enforcement; inserts never check first.

use crate::db::Database;
use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct SubmissionRecord {
    pub id: i64,
    pub user_id: String,
    pub external_form_id: String,
    pub external_response_id: String,
    pub submitted_at: DateTime<Utc>,
}

impl Database {
    /// Record a submission.
    ///
    /// # Errors
    /// `AppError::DuplicateSubmission` when the (form, response) pair is
    /// already recorded, whoever it was recorded for.
    pub async fn record_submission(
        &self,
        user_id: &str,
        external_form_id: &str,
        external_response_id: &str,
        submitted_at: DateTime<Utc>,
    ) -> Result<SubmissionRecord, AppError> {
        let result = sqlx::query_as::<_, SubmissionRecord>(
            "INSERT INTO submissions (user_id, external_form_id, external_response_id, submitted_at)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, user_id, external_form_id, external_response_id, submitted_at",
        )
        .bind(user_id)
        .bind(external_form_id)
        .bind(external_response_id)
        .bind(submitted_at)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(record) => {
                info!(
                    "Recorded submission {}/{} for user {}",
                    external_form_id, external_response_id, user_id
                );
                Ok(record)
            }
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AppError::DuplicateSubmission {
                    form_id: external_form_id.to_string(),
                    response_id: external_response_id.to_string(),
                })
            }
            Err(e) => Err(AppError::Storage(e)),
        }
    }

    /// The user's submission for a form, if one was recorded.
    pub async fn submission_for(
        &self,
        user_id: &str,
        external_form_id: &str,
    ) -> Result<Option<SubmissionRecord>, sqlx::Error> {
        sqlx::query_as::<_, SubmissionRecord>(
            "SELECT id, user_id, external_form_id, external_response_id, submitted_at
             FROM submissions
             WHERE user_id = ?1 AND external_form_id = ?2
             ORDER BY id
             LIMIT 1",
        )
        .bind(user_id)
        .bind(external_form_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Every submission credited to the user, oldest first.
    pub async fn list_submissions_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<SubmissionRecord>, sqlx::Error> {
        sqlx::query_as::<_, SubmissionRecord>(
            "SELECT id, user_id, external_form_id, external_response_id, submitted_at
             FROM submissions
             WHERE user_id = ?1
             ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }
}
