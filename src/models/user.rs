use crate::error::app_error::AppError;
use crate::models::{non_empty, present};
use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use validator::Validate;

/// Full user row, including the stored password hash. Never serialized.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Debug, Clone, PartialEq, sqlx::FromRow, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            username: user.username.clone(),
            created_at: user.created_at,
        }
    }
}

/// Row to insert; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
}

#[derive(Deserialize, Debug, Default, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

/// A registration whose fields are all present and whose passwords match.
#[derive(Debug, Validate)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

impl RegisterRequest {
    /// Checks presence, then password confirmation, then password length.
    pub fn into_registration(self) -> Result<Registration, AppError> {
        let (Some(first_name), Some(last_name), Some(email), Some(username), Some(password), Some(confirm_password)) = (
            present(self.first_name),
            present(self.last_name),
            present(self.email),
            present(self.username),
            non_empty(self.password),
            non_empty(self.confirm_password),
        ) else {
            return Err(AppError::BadRequest("All fields are required".to_string()));
        };

        if password != confirm_password {
            return Err(AppError::BadRequest("Passwords do not match".to_string()));
        }

        let registration = Registration {
            first_name,
            last_name,
            email,
            username,
            password,
        };
        registration.validate()?;

        Ok(registration)
    }
}

#[derive(Deserialize, Debug, Default, Clone, JsonSchema)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    pub fn into_credentials(self) -> Result<(String, String), AppError> {
        match (present(self.username), non_empty(self.password)) {
            (Some(username), Some(password)) => Ok((username, password)),
            _ => Err(AppError::BadRequest("Username and password are required".to_string())),
        }
    }
}
