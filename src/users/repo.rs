use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::auth::password;
use crate::error::AppError;
use crate::users::repo_types::{NewUser, UserProfile, UserSummary};

/// Access to the `users` table.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Hash the password and insert the user. `DuplicateKey` if the username is taken.
    async fn register(&self, new_user: NewUser) -> Result<UserProfile, AppError>;
    /// `Ok(false)` for an unknown username, so callers cannot tell the two cases apart.
    async fn verify_password(&self, username: &str, password: &str) -> Result<bool, AppError>;
    async fn touch_login(&self, username: &str) -> Result<(), AppError>;
    async fn list_all(&self) -> Result<Vec<UserSummary>, AppError>;
    async fn get_profile(&self, username: &str) -> Result<UserProfile, AppError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

pub(crate) fn user_not_found(username: &str) -> AppError {
    AppError::NotFound(format!("User {} not found", username))
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn register(&self, new_user: NewUser) -> Result<UserProfile, AppError> {
        let NewUser {
            username,
            password,
            first_name,
            last_name,
            phone,
        } = new_user;
        let hash = password::hash_password_blocking(password).await?;

        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO users (username, password, first_name, last_name, phone, join_at, last_login_at)
            VALUES ($1, $2, $3, $4, $5, current_timestamp, current_timestamp)
            RETURNING username, first_name, last_name, phone, join_at, last_login_at
            "#,
        )
        .bind(&username)
        .bind(&hash)
        .bind(&first_name)
        .bind(&last_name)
        .bind(&phone)
        .fetch_one(&self.db)
        .await?;
        debug!(username = %profile.username, "user inserted");
        Ok(profile)
    }

    async fn verify_password(&self, username: &str, password: &str) -> Result<bool, AppError> {
        let stored = sqlx::query_scalar::<_, String>(
            r#"
            SELECT password
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;

        match stored {
            Some(hash) => Ok(password::verify_password_blocking(password.to_string(), hash).await?),
            None => Ok(password::verify_unknown_user_blocking(password.to_string()).await?),
        }
    }

    async fn touch_login(&self, username: &str) -> Result<(), AppError> {
        sqlx::query_scalar::<_, String>(
            r#"
            UPDATE users
            SET last_login_at = current_timestamp
            WHERE username = $1
            RETURNING username
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| user_not_found(username))?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<UserSummary>, AppError> {
        let users = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT username, first_name, last_name, phone
            FROM users
            ORDER BY join_at
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(users)
    }

    async fn get_profile(&self, username: &str) -> Result<UserProfile, AppError> {
        sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT username, first_name, last_name, phone, join_at, last_login_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| user_not_found(username))
    }
}
