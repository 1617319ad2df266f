//! Registration and login.
//!
//! Login checks credentials and returns the account; there are no tokens.
//! Interview endpoints take the returned `user_id` directly.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::accounts::password::{hash_password, verify_password};
use crate::errors::AppError;
use crate::models::user::User;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub user: User,
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid credentials".to_string())
}

/// POST /api/v1/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<AccountResponse>, AppError> {
    let username = req.username.trim().to_string();
    let email = req.email.trim().to_string();
    if username.is_empty() {
        return Err(AppError::Validation("username is required".to_string()));
    }
    if !email.contains('@') {
        return Err(AppError::Validation("A valid email is required".to_string()));
    }
    if req.password.is_empty() {
        return Err(AppError::Validation("password is required".to_string()));
    }

    let password = req.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing task failed: {e}")))??;

    let user = User::new(username, email, password_hash);
    state.users.insert(&user).await?;
    info!("Registered user {} ({})", user.user_id, user.username);

    Ok(Json(AccountResponse { user }))
}

/// POST /api/v1/auth/login
///
/// Unknown usernames and wrong passwords get the same 401.
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AccountResponse>, AppError> {
    let user = state
        .users
        .find_by_username(req.username.trim())
        .await?
        .ok_or_else(invalid_credentials)?;

    let password = req.password;
    let stored_hash = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password check task failed: {e}")))?;
    if !valid {
        return Err(invalid_credentials());
    }

    info!("User {} logged in", user.user_id);
    Ok(Json(AccountResponse { user }))
}
