//! User persistence behind `UserStore`, on the same backend as sessions.
//!
//! Usernames and emails are unique. A duplicate is a validation error naming
//! the field, checked username first.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::User;

type Result<T> = std::result::Result<T, AppError>;

fn username_taken() -> AppError {
    AppError::Validation("Username already exists".to_string())
}

fn email_taken() -> AppError {
    AppError::Validation("Email already exists".to_string())
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with a validation error if the username or email is already registered.
    async fn insert(&self, user: &User) -> Result<()>;

    async fn get(&self, user_id: Uuid) -> Result<Option<User>>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory store
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: &User) -> Result<()> {
        // Checked under the write lock so two racing registrations cannot both pass.
        let mut users = self.users.write().await;
        if users.values().any(|u| u.username == user.username) {
            return Err(username_taken());
        }
        if users.values().any(|u| u.email == user.email) {
            return Err(email_taken());
        }
        users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn get(&self, user_id: Uuid) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// PostgreSQL store
// ────────────────────────────────────────────────────────────────────────────

/// Expected schema:
///
/// ```sql
/// CREATE TABLE users (
///     user_id        UUID PRIMARY KEY,
///     username       TEXT NOT NULL CONSTRAINT users_username_key UNIQUE,
///     email          TEXT NOT NULL CONSTRAINT users_email_key UNIQUE,
///     password_hash  TEXT NOT NULL,
///     created_at     TIMESTAMPTZ NOT NULL
/// );
/// ```
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: &User) -> Result<()> {
        let (username_exists, email_exists): (bool, bool) = sqlx::query_as(
            r#"
            SELECT
                EXISTS (SELECT 1 FROM users WHERE username = $1),
                EXISTS (SELECT 1 FROM users WHERE email = $2)
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .fetch_one(&self.pool)
        .await?;
        if username_exists {
            return Err(username_taken());
        }
        if email_exists {
            return Err(email_taken());
        }

        let result = sqlx::query(
            r#"
            INSERT INTO users (user_id, username, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.user_id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            // A concurrent registration won the race after the existence check.
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                if db.constraint() == Some("users_email_key") {
                    Err(email_taken())
                } else {
                    Err(username_taken())
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get(&self, user_id: Uuid) -> Result<Option<User>> {
        let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(username: &str, email: &str) -> User {
        User::new(username.to_string(), email.to_string(), "hash".to_string())
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let store = InMemoryUserStore::new();
        let u = user("grace", "grace@example.com");
        store.insert(&u).await.unwrap();

        assert_eq!(store.get(u.user_id).await.unwrap(), Some(u.clone()));
        assert_eq!(store.find_by_username("grace").await.unwrap(), Some(u));
        assert_eq!(store.get(Uuid::new_v4()).await.unwrap(), None);
        assert_eq!(store.find_by_username("Grace").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let store = InMemoryUserStore::new();
        store.insert(&user("grace", "a@example.com")).await.unwrap();
        let err = store.insert(&user("grace", "b@example.com")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg == "Username already exists"));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = InMemoryUserStore::new();
        store.insert(&user("grace", "a@example.com")).await.unwrap();
        let err = store.insert(&user("ada", "a@example.com")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg == "Email already exists"));
    }

    #[tokio::test]
    async fn test_concurrent_registrations_admit_one() {
        let store = std::sync::Arc::new(InMemoryUserStore::new());
        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .insert(&user("same", &format!("u{i}@example.com")))
                        .await
                        .is_ok()
                })
            })
            .collect();
        let mut admitted = 0;
        for task in tasks {
            if task.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 1);
    }
}
