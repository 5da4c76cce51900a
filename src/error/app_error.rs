use rocket::http::{ContentType, Status};
use rocket::response::Responder;
use rocket::{Request, Response};
use rocket_okapi::OpenApiError;
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::Responses;
use rocket_okapi::response::OpenApiResponderInner;
use std::io::Cursor;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Internal server error")]
    Db {
        message: String,
        #[source]
        source: sqlx::error::Error,
    },
    #[error("Not authenticated")]
    Unauthorized,
    #[error("Not authorized to access this task")]
    Forbidden,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Internal server error")]
    PasswordHash { message: String },
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{}", validation_message(.0))]
    ValidationError(#[from] ValidationErrors),
    #[error("Internal server error")]
    Internal { message: String },
}

/// Field messages only, sorted so the output is stable.
fn validation_message(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .map(|e| e.message.as_ref().map(|m| m.to_string()).unwrap_or_else(|| e.code.to_string()))
        .collect();
    messages.sort();

    if messages.is_empty() {
        "Validation error".to_string()
    } else {
        messages.join("; ")
    }
}

impl AppError {
    pub fn db(message: impl Into<String>, source: sqlx::error::Error) -> Self {
        Self::Db {
            message: message.into(),
            source,
        }
    }

    pub fn password_hash(message: impl Into<String>, source: password_hash::Error) -> Self {
        Self::PasswordHash {
            message: format!("{}: {}", message.into(), source),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }
}

impl From<password_hash::Error> for AppError {
    fn from(e: password_hash::Error) -> Self {
        AppError::password_hash("Password hashing failed", e)
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(e: tokio::task::JoinError) -> Self {
        AppError::internal(format!("Blocking task failed: {}", e))
    }
}

impl From<&AppError> for Status {
    fn from(e: &AppError) -> Self {
        match e {
            AppError::Db { .. } => Status::InternalServerError,
            AppError::Unauthorized => Status::Unauthorized,
            AppError::Forbidden => Status::Forbidden,
            AppError::InvalidCredentials => Status::BadRequest,
            AppError::PasswordHash { .. } => Status::InternalServerError,
            AppError::Conflict(_) => Status::BadRequest,
            AppError::BadRequest(_) => Status::BadRequest,
            AppError::NotFound(_) => Status::NotFound,
            AppError::ValidationError(_) => Status::BadRequest,
            AppError::Internal { .. } => Status::InternalServerError,
        }
    }
}

impl<'r> Responder<'r, 'static> for AppError {
    fn respond_to(self, req: &Request<'_>) -> rocket::response::Result<'static> {
        let method = req.method();
        let uri = req.uri();

        let request_id = crate::middleware::RequestId::of(req).unwrap_or_else(|| "unknown".to_string());

        let user_id = req
            .local_cache(|| None::<crate::auth::CurrentUser>)
            .as_ref()
            .map(|u| u.id.to_string())
            .unwrap_or_else(|| "anonymous".to_string());

        let status = Status::from(&self);
        if status.class().is_server_error() {
            error!(
                error = ?self,
                request_id = %request_id,
                user_id = %user_id,
                method = %method,
                uri = %uri,
                "request failed"
            );
        } else {
            tracing::info!(
                error = %self,
                request_id = %request_id,
                user_id = %user_id,
                method = %method,
                uri = %uri,
                status = %status.code,
                "request rejected"
            );
        }

        let body = serde_json::json!({ "error": self.to_string() }).to_string();

        Response::build()
            .status(status)
            .header(ContentType::JSON)
            .sized_body(body.len(), Cursor::new(body))
            .ok()
    }
}

impl OpenApiResponderInner for AppError {
    fn responses(_gen: &mut OpenApiGenerator) -> Result<Responses, OpenApiError> {
        use rocket_okapi::okapi::openapi3::{RefOr, Response as OpenApiResponse};

        let mut responses = Responses::default();
        for (code, description) in [
            ("400", "Bad Request - missing or invalid input, duplicate account, or wrong credentials"),
            ("401", "Unauthorized - no valid session"),
            ("403", "Forbidden - resource belongs to another user"),
            ("404", "Not Found"),
            ("500", "Internal Server Error"),
        ] {
            responses.responses.insert(
                code.to_string(),
                RefOr::Object(OpenApiResponse {
                    description: description.to_string(),
                    ..Default::default()
                }),
            );
        }
        Ok(responses)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => AppError::NotFound("Resource not found".to_string()),
            _ => AppError::db("Database error", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_follows_error_taxonomy() {
        assert_eq!(Status::from(&AppError::BadRequest("x".into())), Status::BadRequest);
        assert_eq!(Status::from(&AppError::Conflict("x".into())), Status::BadRequest);
        assert_eq!(Status::from(&AppError::InvalidCredentials), Status::BadRequest);
        assert_eq!(Status::from(&AppError::Unauthorized), Status::Unauthorized);
        assert_eq!(Status::from(&AppError::Forbidden), Status::Forbidden);
        assert_eq!(Status::from(&AppError::NotFound("x".into())), Status::NotFound);
        assert_eq!(Status::from(&AppError::internal("boom")), Status::InternalServerError);
        assert_eq!(
            Status::from(&AppError::PasswordHash { message: "bad".into() }),
            Status::InternalServerError
        );
        assert_eq!(Status::from(&AppError::db("down", sqlx::Error::PoolTimedOut)), Status::InternalServerError);
        assert_eq!(Status::from(&AppError::from(ValidationErrors::new())), Status::BadRequest);
    }

    #[test]
    fn every_server_fault_is_a_500() {
        let faults = [
            AppError::db("down", sqlx::Error::PoolClosed),
            AppError::PasswordHash { message: "bad".into() },
            AppError::internal("boom"),
        ];
        for fault in &faults {
            assert!(Status::from(fault).class().is_server_error());
            assert_eq!(fault.to_string(), "Internal server error");
        }
    }

    #[test]
    fn server_faults_hide_details_from_clients() {
        let err = AppError::internal("disk on fire");
        assert_eq!(err.to_string(), "Internal server error");

        let err = AppError::db("Database error", sqlx::Error::PoolTimedOut);
        assert_eq!(err.to_string(), "Internal server error");
    }

    #[test]
    fn validation_errors_render_field_messages() {
        let mut errors = ValidationErrors::new();
        errors.add(
            "password",
            validator::ValidationError::new("length").with_message("Password must be at least 6 characters".into()),
        );
        assert_eq!(AppError::from(errors).to_string(), "Password must be at least 6 characters");
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
