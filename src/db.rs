use crate::survey::SurveyRecord;
use anyhow::{Context, Result};
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use std::str::FromStr;
use tracing::debug;

/// A principal as last seen by the identity layer.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct User {
    pub user_id: String,
    pub email: Option<String>,
    pub is_staff: bool,
}

#[derive(Clone)]
pub struct Database {
    pub(crate) pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the store at `url` and create its tables.
    ///
    /// Accepts either a `sqlite://` URL or a plain file path.
    pub async fn new(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid database URL {}", url))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open database at {}", url))?;

        let db = Self { pool };
        db.create_schema().await?;
        Ok(db)
    }

    async fn create_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                user_id TEXT PRIMARY KEY,
                email TEXT UNIQUE COLLATE NOCASE,
                is_staff INTEGER NOT NULL DEFAULT 0
            )",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create users table")?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS surveys (
                user_id TEXT PRIMARY KEY,
                times_shown INTEGER NOT NULL DEFAULT 0,
                is_completed INTEGER NOT NULL DEFAULT 0
            )",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create surveys table")?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS submissions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                external_form_id TEXT NOT NULL,
                external_response_id TEXT NOT NULL,
                submitted_at TEXT NOT NULL,
                UNIQUE (external_form_id, external_response_id)
            )",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create submissions table")?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_submissions_user_form
             ON submissions (user_id, external_form_id)",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create submissions index")?;

        Ok(())
    }

    // ==================== Users ====================

    /// Insert or refresh a principal.
    ///
    /// An email belongs to the last principal that presented it, so any
    /// other user holding the same address loses it. A request without an
    /// email keeps the one already on file.
    pub async fn upsert_user(
        &self,
        user_id: &str,
        email: Option<&str>,
        is_staff: bool,
    ) -> Result<User, sqlx::Error> {
        let email = email.map(str::trim).filter(|e| !e.is_empty());
        let mut tx = self.pool.begin().await?;

        if let Some(email) = email {
            sqlx::query("UPDATE users SET email = NULL WHERE email = ?1 AND user_id != ?2")
                .bind(email)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (user_id, email, is_staff) VALUES (?1, ?2, ?3)
             ON CONFLICT (user_id) DO UPDATE
             SET email = COALESCE(excluded.email, users.email), is_staff = excluded.is_staff
             RETURNING user_id, email, is_staff",
        )
        .bind(user_id)
        .bind(email)
        .bind(is_staff)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(user)
    }

    /// Case-insensitive lookup of the user holding `email`.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT user_id, email, is_staff FROM users WHERE email = ?1")
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await
    }

    // ==================== Surveys ====================

    /// The user's survey record, created at `(0, false)` on first access.
    pub async fn get_or_create_survey(&self, user_id: &str) -> Result<SurveyRecord, sqlx::Error> {
        let inserted = sqlx::query(
            "INSERT INTO surveys (user_id, times_shown, is_completed) VALUES (?1, 0, 0)
             ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if inserted.rows_affected() > 0 {
            debug!("Created survey record for {}", user_id);
        }

        self.load_survey(user_id).await
    }

    /// Count one view in a single statement and return the stored record.
    ///
    /// Concurrent views each land; a completed row is left untouched.
    pub async fn record_view(&self, user_id: &str) -> Result<SurveyRecord, sqlx::Error> {
        self.get_or_create_survey(user_id).await?;

        sqlx::query(
            "UPDATE surveys SET times_shown = times_shown + 1
             WHERE user_id = ?1 AND is_completed = 0",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        self.load_survey(user_id).await
    }

    /// Persist a record produced by the status engine and return what is stored.
    ///
    /// Completed rows are never written again, so a stale in-flight update
    /// cannot reopen a finished survey.
    pub async fn save_survey(&self, record: &SurveyRecord) -> Result<SurveyRecord, sqlx::Error> {
        sqlx::query(
            "UPDATE surveys SET times_shown = ?1, is_completed = ?2
             WHERE user_id = ?3 AND is_completed = 0",
        )
        .bind(i64::from(record.times_shown))
        .bind(record.is_completed)
        .bind(&record.user_id)
        .execute(&self.pool)
        .await?;

        self.load_survey(&record.user_id).await
    }

    async fn load_survey(&self, user_id: &str) -> Result<SurveyRecord, sqlx::Error> {
        let (user_id, times_shown, is_completed) = sqlx::query_as::<_, (String, i64, bool)>(
            "SELECT user_id, times_shown, is_completed FROM surveys WHERE user_id = ?1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(SurveyRecord {
            user_id,
            times_shown: u32::try_from(times_shown).unwrap_or(u32::MAX),
            is_completed,
        })
    }
}
