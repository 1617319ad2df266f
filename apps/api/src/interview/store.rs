//! Session persistence behind `SessionStore`.
//!
//! The store is chosen once at startup from `STORAGE_BACKEND`. Answer appends
//! are atomic per call; there is no optimistic locking across calls.
//! Driver failures surface as `AppError::Database`, undecodable rows as
//! `AppError::Internal`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::evaluation::session::SessionEvaluation;
use crate::models::session::{
    AnswerRecord, InterviewSession, SessionRow, SessionStatus, SessionSummary,
};

type Result<T> = std::result::Result<T, AppError>;

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, session: &InterviewSession) -> Result<()>;

    async fn get(&self, session_id: Uuid) -> Result<Option<InterviewSession>>;

    /// Appends one record; returns the new answer count, or `None` if the session does not exist.
    async fn append_answer(&self, session_id: Uuid, record: &AnswerRecord) -> Result<Option<usize>>;

    /// Marks the session completed with its overall evaluation. Returns false if it does not exist.
    async fn complete(
        &self,
        session_id: Uuid,
        evaluation: &SessionEvaluation,
        end_time: DateTime<Utc>,
    ) -> Result<bool>;

    /// Summaries of a user's sessions, newest first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<SessionSummary>>;

    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory store
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<Uuid, InterviewSession>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert(&self, session: &InterviewSession) -> Result<()> {
        self.sessions
            .write()
            .await
            .insert(session.session_id, session.clone());
        Ok(())
    }

    async fn get(&self, session_id: Uuid) -> Result<Option<InterviewSession>> {
        Ok(self.sessions.read().await.get(&session_id).cloned())
    }

    async fn append_answer(&self, session_id: Uuid, record: &AnswerRecord) -> Result<Option<usize>> {
        let mut sessions = self.sessions.write().await;
        Ok(sessions.get_mut(&session_id).map(|session| {
            session.answers.push(record.clone());
            session.answers.len()
        }))
    }

    async fn complete(
        &self,
        session_id: Uuid,
        evaluation: &SessionEvaluation,
        end_time: DateTime<Utc>,
    ) -> Result<bool> {
        let mut sessions = self.sessions.write().await;
        let Some(session) = sessions.get_mut(&session_id) else {
            return Ok(false);
        };
        session.status = SessionStatus::Completed;
        session.end_time = Some(end_time);
        session.overall_evaluation = Some(evaluation.clone());
        Ok(true)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<SessionSummary>> {
        let sessions = self.sessions.read().await;
        let mut owned: Vec<&InterviewSession> =
            sessions.values().filter(|s| s.user_id == user_id).collect();
        owned.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(owned.into_iter().map(InterviewSession::summary).collect())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// PostgreSQL store
// ────────────────────────────────────────────────────────────────────────────

/// Sessions in one `interview_sessions` table; questions, answers and the
/// overall evaluation live in JSONB columns. Expected schema:
///
/// ```sql
/// CREATE TABLE interview_sessions (
///     session_id          UUID PRIMARY KEY,
///     user_id             UUID NOT NULL,
///     role                TEXT NOT NULL,
///     name                TEXT NOT NULL,
///     questions           JSONB NOT NULL,
///     answers             JSONB NOT NULL DEFAULT '[]'::jsonb,
///     status              TEXT NOT NULL,
///     start_time          TIMESTAMPTZ NOT NULL,
///     end_time            TIMESTAMPTZ,
///     overall_evaluation  JSONB
/// );
/// CREATE INDEX interview_sessions_user_idx ON interview_sessions (user_id, start_time DESC);
/// ```
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn insert(&self, session: &InterviewSession) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO interview_sessions
                (session_id, user_id, role, name, questions, answers, status,
                 start_time, end_time, overall_evaluation)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(session.session_id)
        .bind(session.user_id)
        .bind(&session.role)
        .bind(&session.name)
        .bind(Json(&session.questions))
        .bind(Json(&session.answers))
        .bind(session.status.as_str())
        .bind(session.start_time)
        .bind(session.end_time)
        .bind(session.overall_evaluation.as_ref().map(Json))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, session_id: Uuid) -> Result<Option<InterviewSession>> {
        let row: Option<SessionRow> =
            sqlx::query_as("SELECT * FROM interview_sessions WHERE session_id = $1")
                .bind(session_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(InterviewSession::try_from).transpose()?)
    }

    async fn append_answer(&self, session_id: Uuid, record: &AnswerRecord) -> Result<Option<usize>> {
        // `||` on two JSONB arrays concatenates, so the append happens in one statement.
        let count: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE interview_sessions
            SET answers = answers || $2
            WHERE session_id = $1
            RETURNING jsonb_array_length(answers)
            "#,
        )
        .bind(session_id)
        .bind(Json([record]))
        .fetch_optional(&self.pool)
        .await?;
        Ok(count.map(|n| n.max(0) as usize))
    }

    async fn complete(
        &self,
        session_id: Uuid,
        evaluation: &SessionEvaluation,
        end_time: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE interview_sessions
            SET status = $2, end_time = $3, overall_evaluation = $4
            WHERE session_id = $1
            "#,
        )
        .bind(session_id)
        .bind(SessionStatus::Completed.as_str())
        .bind(end_time)
        .bind(Json(evaluation))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<SessionSummary>> {
        let rows: Vec<SessionRow> = sqlx::query_as(
            "SELECT * FROM interview_sessions WHERE user_id = $1 ORDER BY start_time DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let summaries = rows
            .into_iter()
            .map(|row| InterviewSession::try_from(row).map(|s| s.summary()))
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(summaries)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
