mod accounts;
mod config;
mod db;
mod errors;
mod evaluation;
mod interview;
mod llm_client;
mod models;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::accounts::store::{InMemoryUserStore, PgUserStore, UserStore};
use crate::config::{Config, StorageBackend};
use crate::db::create_pool;
use crate::evaluation::rubric::available_roles;
use crate::evaluation::scorer::select_scorer;
use crate::interview::store::{InMemorySessionStore, PgSessionStore, SessionStore};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Interviewer API v{}", env!("CARGO_PKG_VERSION"));

    let (store, users) = build_stores(&config).await?;
    info!("Session store: {}, user store: {}", store.backend(), users.backend());

    let scorer = select_scorer(&config).await?;
    info!(
        "Scorer: {} ({} roles available)",
        scorer.backend(),
        available_roles().len()
    );

    let state = AppState {
        store,
        users,
        scorer,
        config: config.clone(),
    };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

type Stores = (Arc<dyn SessionStore>, Arc<dyn UserStore>);

/// Session and user stores share one backend and, for postgres, one pool.
async fn build_stores(config: &Config) -> Result<Stores> {
    match config.storage_backend {
        StorageBackend::Memory => {
            let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
            let users: Arc<dyn UserStore> = Arc::new(InMemoryUserStore::new());
            Ok((sessions, users))
        }
        StorageBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres stores")?;
            let pool = create_pool(url).await?;
            let sessions: Arc<dyn SessionStore> = Arc::new(PgSessionStore::new(pool.clone()));
            let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool));
            Ok((sessions, users))
        }
    }
}
