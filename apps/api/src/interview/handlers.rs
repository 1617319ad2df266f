//! Axum route handlers for roles, resumes and interview sessions.

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::evaluation::answer::AnswerEvaluation;
use crate::evaluation::rubric::{available_roles, is_known_role};
use crate::evaluation::scorer::{evaluate_answer_guarded, evaluate_session_guarded};
use crate::evaluation::session::SessionEvaluation;
use crate::evaluation::skills::{extract_resume_skills, suggest_role, SkillMatchMap};
use crate::interview::questions::{questions_for_role, DEFAULT_QUESTION_COUNT};
use crate::interview::report::{render_report, report_filename};
use crate::models::session::{
    AnswerRecord, InterviewSession, QuestionItem, SessionStatus, SessionSummary,
};
use crate::state::AppState;

/// Largest accepted resume upload.
pub const MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct RolesResponse {
    pub roles: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeResumeRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ResumeAnalysis {
    pub text: String,
    pub skills: SkillMatchMap,
    pub suggested_role: String,
}

#[derive(Debug, Deserialize)]
pub struct StartInterviewRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub name: String,
    pub role: String,
    pub resume_text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StartInterviewResponse {
    pub session_id: Uuid,
    pub questions: Vec<QuestionItem>,
    pub total_questions: usize,
}

#[derive(Debug, Serialize)]
pub struct InterviewListResponse {
    pub interviews: Vec<SessionSummary>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session: InterviewSession,
}

#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    pub user_id: Uuid,
    pub question_id: u32,
    #[serde(default)]
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitAnswerResponse {
    pub feedback: AnswerEvaluation,
    pub question_id: u32,
    pub total_answered: usize,
    pub total_questions: usize,
}

#[derive(Debug, Deserialize)]
pub struct FollowUpRequest {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct FollowUpResponse {
    pub follow_up: String,
}

#[derive(Debug, Deserialize)]
pub struct CompleteInterviewRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct CompleteInterviewResponse {
    pub session_id: Uuid,
    pub overall_evaluation: SessionEvaluation,
    pub total_questions: usize,
    pub total_answered: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Loads a session and checks the caller owns it.
async fn load_owned_session(
    state: &AppState,
    session_id: Uuid,
    user_id: Uuid,
) -> Result<InterviewSession, AppError> {
    let session = state
        .store
        .get(session_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))?;
    if session.user_id != user_id {
        return Err(AppError::Forbidden);
    }
    Ok(session)
}

fn analyze_text(text: &str) -> ResumeAnalysis {
    let text = text.to_lowercase();
    let skills = extract_resume_skills(&text);
    let suggested_role = suggest_role(&skills);
    ResumeAnalysis {
        text,
        skills,
        suggested_role,
    }
}

fn is_pdf(content_type: Option<&str>, file_name: Option<&str>) -> bool {
    content_type == Some("application/pdf")
        || file_name.is_some_and(|name| name.to_ascii_lowercase().ends_with(".pdf"))
}

fn resume_too_large() -> AppError {
    AppError::PayloadTooLarge(format!(
        "Resume must be at most {} MB",
        MAX_RESUME_BYTES / (1024 * 1024)
    ))
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        resume_too_large()
    } else {
        AppError::Validation(format!("Invalid multipart upload: {}", e.body_text()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/roles
pub async fn handle_list_roles() -> Json<RolesResponse> {
    Json(RolesResponse {
        roles: available_roles(),
    })
}

/// POST /api/v1/resume/analyze
pub async fn handle_analyze_resume(
    Json(req): Json<AnalyzeResumeRequest>,
) -> Result<Json<ResumeAnalysis>, AppError> {
    if req.text.trim().is_empty() {
        return Err(AppError::Validation("Resume text is empty".to_string()));
    }
    Ok(Json(analyze_text(&req.text)))
}

/// POST /api/v1/resume/upload
///
/// Expects a multipart form with a `resume` PDF field.
pub async fn handle_upload_resume(
    mut multipart: Multipart,
) -> Result<Json<ResumeAnalysis>, AppError> {
    let mut upload: Option<Bytes> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("resume") {
            continue;
        }
        if !is_pdf(field.content_type(), field.file_name()) {
            return Err(AppError::UnsupportedMediaType(
                "Only PDF resumes are supported".to_string(),
            ));
        }
        upload = Some(field.bytes().await.map_err(multipart_error)?);
        break;
    }

    let data =
        upload.ok_or_else(|| AppError::Validation("No resume file uploaded".to_string()))?;
    // The route body limit also covers multipart framing, so check the file itself.
    if data.len() > MAX_RESUME_BYTES {
        return Err(resume_too_large());
    }
    info!("Parsing uploaded resume ({} bytes)", data.len());

    // PDF parsing is CPU-bound.
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&data))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF parsing task failed: {e}")))?
        .map_err(|e| {
            warn!("Could not extract text from resume PDF: {e}");
            AppError::Validation("Failed to parse resume".to_string())
        })?;

    Ok(Json(analyze_text(&text)))
}

/// POST /api/v1/interviews
pub async fn handle_start_interview(
    State(state): State<AppState>,
    Json(req): Json<StartInterviewRequest>,
) -> Result<Json<StartInterviewResponse>, AppError> {
    if req.role.trim().is_empty() {
        return Err(AppError::Validation("role is required".to_string()));
    }

    if !is_known_role(&req.role) {
        warn!("Unknown role '{}', using the sde question bank and rubric", req.role);
    }

    let skills = req
        .resume_text
        .as_deref()
        .filter(|text| !text.trim().is_empty())
        .map(extract_resume_skills);
    let questions = questions_for_role(&req.role, DEFAULT_QUESTION_COUNT, skills.as_ref());

    if state.users.get(req.user_id).await?.is_none() {
        return Err(AppError::NotFound(format!("User {} not found", req.user_id)));
    }

    let session = InterviewSession::start(req.user_id, req.name, req.role, questions);
    state.store.insert(&session).await?;
    info!(
        "Started interview {} (role: {}, {} questions)",
        session.session_id,
        session.role,
        session.questions.len()
    );

    Ok(Json(StartInterviewResponse {
        session_id: session.session_id,
        total_questions: session.questions.len(),
        questions: session.questions,
    }))
}

/// GET /api/v1/interviews?user_id=
pub async fn handle_list_interviews(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<InterviewListResponse>, AppError> {
    let interviews = state.store.list_for_user(params.user_id).await?;
    Ok(Json(InterviewListResponse { interviews }))
}

/// GET /api/v1/interviews/:id?user_id=
pub async fn handle_get_interview(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = load_owned_session(&state, session_id, params.user_id).await?;
    Ok(Json(SessionResponse { session }))
}

/// POST /api/v1/interviews/:id/answers
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>, AppError> {
    let session = load_owned_session(&state, session_id, req.user_id).await?;
    if session.status != SessionStatus::InProgress {
        return Err(AppError::Conflict(format!(
            "Session {session_id} is already {}",
            session.status.as_str()
        )));
    }
    let question = session
        .question(req.question_id)
        .ok_or_else(|| AppError::NotFound(format!("Question {} not found", req.question_id)))?
        .question
        .clone();

    let feedback = evaluate_answer_guarded(
        state.scorer.clone(),
        question.clone(),
        req.answer.clone(),
        session.role.clone(),
    )
    .await;

    let record = AnswerRecord {
        question_id: req.question_id,
        question,
        answer: req.answer,
        feedback: feedback.clone(),
        timestamp: Utc::now(),
    };
    let total_answered = state
        .store
        .append_answer(session_id, &record)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))?;

    Ok(Json(SubmitAnswerResponse {
        feedback,
        question_id: req.question_id,
        total_answered,
        total_questions: session.questions.len(),
    }))
}

/// POST /api/v1/interviews/follow-up
pub async fn handle_follow_up(
    State(state): State<AppState>,
    Json(req): Json<FollowUpRequest>,
) -> Json<FollowUpResponse> {
    let follow_up = state
        .scorer
        .follow_up(&req.question, &req.answer, &req.role)
        .await;
    Json(FollowUpResponse { follow_up })
}

/// POST /api/v1/interviews/:id/complete
pub async fn handle_complete_interview(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<CompleteInterviewRequest>,
) -> Result<Json<CompleteInterviewResponse>, AppError> {
    let session = load_owned_session(&state, session_id, req.user_id).await?;
    if session.status == SessionStatus::Completed {
        return Err(AppError::Conflict(format!(
            "Session {session_id} is already completed"
        )));
    }

    let total_answered = session.answers.len();
    let overall_evaluation =
        evaluate_session_guarded(state.scorer.clone(), session.answers, session.role).await;

    if !state
        .store
        .complete(session_id, &overall_evaluation, Utc::now())
        .await?
    {
        return Err(AppError::NotFound(format!("Session {session_id} not found")));
    }
    info!(
        "Completed interview {session_id} (overall score {})",
        overall_evaluation.overall_score
    );

    Ok(Json(CompleteInterviewResponse {
        session_id,
        overall_evaluation,
        total_questions: session.questions.len(),
        total_answered,
    }))
}

/// GET /api/v1/interviews/:id/report?user_id=
pub async fn handle_download_report(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<impl IntoResponse, AppError> {
    let session = load_owned_session(&state, session_id, params.user_id).await?;
    let disposition = format!("attachment; filename=\"{}\"", report_filename(&session));
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        render_report(&session),
    ))
}
