pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::accounts::handlers as accounts;
use crate::interview::handlers::{self, MAX_RESUME_BYTES};
use crate::state::AppState;

/// Multipart framing on top of the file itself.
const UPLOAD_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Accounts API
        .route("/api/v1/auth/register", post(accounts::handle_register))
        .route("/api/v1/auth/login", post(accounts::handle_login))
        .route("/api/v1/roles", get(handlers::handle_list_roles))
        // Resume API
        .route(
            "/api/v1/resume/upload",
            post(handlers::handle_upload_resume)
                .layer(DefaultBodyLimit::max(MAX_RESUME_BYTES + UPLOAD_OVERHEAD_BYTES)),
        )
        .route("/api/v1/resume/analyze", post(handlers::handle_analyze_resume))
        // Interview API
        .route(
            "/api/v1/interviews",
            get(handlers::handle_list_interviews).post(handlers::handle_start_interview),
        )
        .route("/api/v1/interviews/follow-up", post(handlers::handle_follow_up))
        .route("/api/v1/interviews/:id", get(handlers::handle_get_interview))
        .route(
            "/api/v1/interviews/:id/answers",
            post(handlers::handle_submit_answer),
        )
        .route(
            "/api/v1/interviews/:id/complete",
            post(handlers::handle_complete_interview),
        )
        .route(
            "/api/v1/interviews/:id/report",
            get(handlers::handle_download_report),
        )
        .with_state(state)
}
