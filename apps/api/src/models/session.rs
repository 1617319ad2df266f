use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::evaluation::answer::AnswerEvaluation;
use crate::evaluation::session::SessionEvaluation;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionItem {
    pub id: u32, // 1-based position within the session
    pub question: String,
    pub role: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl FromStr for SessionStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => anyhow::bail!("unknown session status '{other}'"),
        }
    }
}

/// One submitted answer with its evaluation. Append-only within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_id: u32,
    pub question: String,
    pub answer: String,
    pub feedback: AnswerEvaluation,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewSession {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub name: String,
    pub questions: Vec<QuestionItem>,
    pub answers: Vec<AnswerRecord>,
    pub status: SessionStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub overall_evaluation: Option<SessionEvaluation>,
}

impl InterviewSession {
    pub fn start(user_id: Uuid, name: String, role: String, questions: Vec<QuestionItem>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            user_id,
            role,
            name,
            questions,
            answers: vec![],
            status: SessionStatus::InProgress,
            start_time: Utc::now(),
            end_time: None,
            overall_evaluation: None,
        }
    }

    pub fn question(&self, id: u32) -> Option<&QuestionItem> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.session_id,
            role: self.role.clone(),
            name: self.name.clone(),
            status: self.status,
            start_time: self.start_time,
            end_time: self.end_time,
            total_questions: self.questions.len(),
            total_answered: self.answers.len(),
        }
    }
}

/// Listing entry for a user's interview history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub role: String,
    pub name: String,
    pub status: SessionStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub total_questions: usize,
    pub total_answered: usize,
}

/// `interview_sessions` row; JSONB columns decode through `sqlx::types::Json`.
#[derive(Debug, FromRow)]
pub struct SessionRow {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub name: String,
    pub questions: Json<Vec<QuestionItem>>,
    pub answers: Json<Vec<AnswerRecord>>,
    pub status: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub overall_evaluation: Option<Json<SessionEvaluation>>,
}

impl TryFrom<SessionRow> for InterviewSession {
    type Error = anyhow::Error;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            session_id: row.session_id,
            user_id: row.user_id,
            role: row.role,
            name: row.name,
            questions: row.questions.0,
            answers: row.answers.0,
            status: row.status.parse()?,
            start_time: row.start_time,
            end_time: row.end_time,
            overall_evaluation: row.overall_evaluation.map(|e| e.0),
        })
    }
}
