use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::{self, Claims};
use crate::error::ApiError;

/// Authenticated user context extracted from a verified token.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.id,
            email: claims.email,
        }
    }
}

/// Token authentication middleware for mutating routes.
///
/// Verifies the `Authorization` header and injects [`AuthUser`] into the
/// request extensions. A missing or unverifiable token terminates the request
/// with the uniform error envelope.
pub async fn jwt_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = headers
        .get("authorization")
        .or_else(|| headers.get("Authorization"))
        .ok_or_else(|| ApiError::unauthorized("missing Authorization header"))?
        .to_str()
        .map_err(|_| ApiError::unauthorized("invalid Authorization header"))?;

    let claims = auth::verify_header(header)?;
    tracing::debug!(user_id = %claims.id, "authenticated request");

    request.extensions_mut().insert(AuthUser::from(claims));
    Ok(next.run(request).await)
}
