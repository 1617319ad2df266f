use std::str::FromStr;

use anyhow::{bail, Context, Result};

/// Where interview sessions are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Postgres,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "in_memory" | "in-memory" => Ok(StorageBackend::Memory),
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            other => bail!("Unknown STORAGE_BACKEND '{other}' (expected 'memory' or 'postgres')"),
        }
    }
}

/// Which scorer answers are evaluated with.
/// `Auto` checks the local model once at startup and keeps the result for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScorerBackend {
    Auto,
    Heuristic,
    Model,
}

impl FromStr for ScorerBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(ScorerBackend::Auto),
            "heuristic" => Ok(ScorerBackend::Heuristic),
            "model" | "llm" => Ok(ScorerBackend::Model),
            other => bail!(
                "Unknown SCORER_BACKEND '{other}' (expected 'auto', 'heuristic' or 'model')"
            ),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub storage_backend: StorageBackend,
    pub database_url: Option<String>,
    pub scorer_backend: ScorerBackend,
    pub ollama_url: String,
    pub ollama_model: String,
    pub llm_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let database_url = std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());

        let storage_backend = match std::env::var("STORAGE_BACKEND") {
            Ok(v) => v.parse()?,
            Err(_) if database_url.is_some() => StorageBackend::Postgres,
            Err(_) => StorageBackend::Memory,
        };
        if storage_backend == StorageBackend::Postgres && database_url.is_none() {
            bail!("STORAGE_BACKEND=postgres requires DATABASE_URL to be set");
        }

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            storage_backend,
            database_url,
            scorer_backend: std::env::var("SCORER_BACKEND")
                .unwrap_or_else(|_| "auto".to_string())
                .parse()?,
            ollama_url: std::env::var("OLLAMA_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            ollama_model: std::env::var("OLLAMA_MODEL")
                .unwrap_or_else(|_| "llama3.1:8b".to_string()),
            llm_timeout_secs: std::env::var("LLM_TIMEOUT_SECS")
                .unwrap_or_else(|_| "120".to_string())
                .parse::<u64>()
                .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
        })
    }
}
