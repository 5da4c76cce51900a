use crate::database::sqlite_repository::SqliteRepository;
use crate::error::app_error::AppError;
use crate::models::user::{NewUser, User, UserProfile};
use chrono::Utc;

#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with [`AppError::Conflict`] when the username or email is taken.
    async fn create_user(&self, user: &NewUser) -> Result<i64, AppError>;
    async fn get_user_by_id(&self, id: i64) -> Result<Option<UserProfile>, AppError>;
    /// Includes the password hash, for credential checks only.
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
}

pub(crate) fn map_unique_violation(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.is_unique_violation()
    {
        let message = if db_err.message().contains("users.email") {
            "Email already registered"
        } else {
            "Username already exists"
        };
        return AppError::Conflict(message.to_string());
    }
    AppError::from(e)
}

#[async_trait::async_trait]
impl UserRepository for SqliteRepository {
    async fn create_user(&self, user: &NewUser) -> Result<i64, AppError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (first_name, last_name, email, username, password_hash, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(id)
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<UserProfile>, AppError> {
        let user = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT id, first_name, last_name, email, username, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, first_name, last_name, email, username, password_hash, created_at
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
