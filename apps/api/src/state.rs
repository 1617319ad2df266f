use std::sync::Arc;

use crate::accounts::store::UserStore;
use crate::config::Config;
use crate::evaluation::scorer::Scorer;
use crate::interview::store::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Session persistence. In-memory or PostgreSQL, chosen via STORAGE_BACKEND.
    pub store: Arc<dyn SessionStore>,
    /// Registered accounts, on the same backend as sessions.
    pub users: Arc<dyn UserStore>,
    /// Answer/session scorer, chosen once at startup via SCORER_BACKEND.
    pub scorer: Arc<dyn Scorer>,
    pub config: Config,
}
