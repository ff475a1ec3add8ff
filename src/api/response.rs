use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

/// Wrapper for successful responses rendering the uniform envelope
/// `{results, statusCode, message}`.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub results: T,
    pub status_code: StatusCode,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a 200 OK response
    pub fn ok(results: T, message: impl Into<String>) -> Self {
        Self {
            results,
            status_code: StatusCode::OK,
            message: message.into(),
        }
    }

    /// Create a 201 Created response
    pub fn created(results: T, message: impl Into<String>) -> Self {
        Self {
            results,
            status_code: StatusCode::CREATED,
            message: message.into(),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let results = match serde_json::to_value(&self.results) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("failed to serialize response results: {}", e);
                return crate::error::ApiError::internal("failed to format response")
                    .into_response();
            }
        };

        let envelope = json!({
            "results": results,
            "statusCode": self.status_code.as_u16(),
            "message": self.message,
        });

        (self.status_code, Json(envelope)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
