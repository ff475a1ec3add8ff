use axum::extract::State;
use serde::Deserialize;

use crate::api::{ApiResponse, ApiResult};
use crate::services::user_service::LoginResult;
use crate::state::AppState;
use crate::validate::{rules, FieldErrors, ValidJson, Validate};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        rules::not_empty(&mut errors, "email", &self.email);
        rules::email(&mut errors, "email", &self.email);
        rules::not_empty(&mut errors, "password", &self.password);
        errors
    }
}

/// POST /auth/login - authenticate and receive an access token
pub async fn login(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<LoginRequest>,
) -> ApiResult<LoginResult> {
    let results = state.users.login(&request.email, &request.password).await?;
    Ok(ApiResponse::ok(results, "login succeeded"))
}
