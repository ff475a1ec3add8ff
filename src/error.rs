// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::validate::FieldErrors;

/// HTTP API error rendered as the uniform envelope
/// `{error, statusCode, message, cause?, validation?}`.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest {
        message: String,
        cause: Option<String>,
    },
    Validation {
        message: String,
        validation: FieldErrors,
    },

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict {
        message: String,
        cause: Option<String>,
    },

    // 500 Internal Server Error
    Internal(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest { .. } => 400,
            ApiError::Validation { .. } => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict { .. } => 409,
            ApiError::Internal(_) => 500,
        }
    }

    /// Error label reported in the `error` field
    pub fn error_label(&self) -> &'static str {
        match self {
            ApiError::BadRequest { .. } => "Bad Request",
            ApiError::Validation { .. } => "Invalid Request",
            ApiError::Unauthorized(_) => "Unauthorized",
            ApiError::NotFound(_) => "Not Found",
            ApiError::Conflict { .. } => "Conflict",
            ApiError::Internal(_) => "Internal Server Error",
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest { message, .. } => message,
            ApiError::Validation { message, .. } => message,
            ApiError::Unauthorized(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict { message, .. } => message,
            ApiError::Internal(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "error": self.error_label(),
            "statusCode": self.status_code(),
            "message": self.message(),
        });

        match self {
            ApiError::Validation { validation, .. } => {
                body["validation"] = json!(validation);
            }
            ApiError::BadRequest { cause: Some(c), .. }
            | ApiError::Conflict { cause: Some(c), .. } => {
                body["cause"] = json!(c);
            }
            _ => {}
        }

        body
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
            cause: None,
        }
    }

    pub fn validation(validation: FieldErrors) -> Self {
        ApiError::Validation {
            message: "validation failed".to_string(),
            validation,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>, cause: Option<String>) -> Self {
        ApiError::Conflict {
            message: message.into(),
            cause,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

// Convert other error types to ApiError
impl From<crate::auth::AuthError> for ApiError {
    fn from(err: crate::auth::AuthError) -> Self {
        use crate::auth::AuthError;
        match err {
            AuthError::InvalidPrefix => ApiError::bad_request("invalid authorization prefix"),
            AuthError::Expired => ApiError::unauthorized("token has expired"),
            AuthError::Malformed(msg) => {
                tracing::warn!("token verification failed: {}", msg);
                ApiError::unauthorized("token verification failed")
            }
            AuthError::MissingSecret => ApiError::internal("JWT secret not configured"),
            AuthError::TokenGeneration(msg) => {
                tracing::error!("token generation failed: {}", msg);
                ApiError::internal("failed to issue token")
            }
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        // Log the real error but return a generic message
        tracing::error!("database error: {}", err);
        ApiError::internal("an error occurred while processing your request")
    }
}

impl From<crate::services::user_service::UserServiceError> for ApiError {
    fn from(err: crate::services::user_service::UserServiceError) -> Self {
        use crate::services::user_service::UserServiceError;
        match err {
            UserServiceError::EmailNotFound => ApiError::not_found("no such email"),
            UserServiceError::PasswordMismatch => ApiError::not_found("password does not match"),
            UserServiceError::UserNotFound => ApiError::not_found("no such user"),
            UserServiceError::Duplicate(cause) => {
                ApiError::conflict("email or nickname already in use", Some(cause))
            }
            UserServiceError::Token(e) => e.into(),
            UserServiceError::Database(e) => e.into(),
        }
    }
}

impl From<crate::services::post_service::PostServiceError> for ApiError {
    fn from(err: crate::services::post_service::PostServiceError) -> Self {
        use crate::services::post_service::PostServiceError;
        match err {
            PostServiceError::PostNotFound => ApiError::not_found("post not found"),
            PostServiceError::WriterNotFound => ApiError::not_found("no such user"),
            PostServiceError::Database(e) => e.into(),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
