use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status, version and the active storage/scoring backends.
/// `model` is only set when answers are scored by the local model.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "interviewer-api",
        "storage": state.store.backend(),
        "scorer": state.scorer.backend(),
        "model": (state.scorer.backend() == "model").then(|| state.config.ollama_model.clone())
    }))
}
