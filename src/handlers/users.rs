use axum::extract::{Path, State};
use axum::Extension;
use serde::Deserialize;

use crate::api::{ApiResponse, ApiResult, PageQuery, PageRequest};
use crate::database::users::UserSearchCondition;
use crate::handlers::parse_uuid;
use crate::middleware::AuthUser;
use crate::services::post_service::UserPostPage;
use crate::services::user_service::{
    RegisterResult, UpdateUserResult, UserProfile, UserSearchPage, WithdrawResult,
};
use crate::state::AppState;
use crate::validate::{rules, FieldErrors, ValidJson, ValidQuery, Validate};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub nickname: String,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        rules::not_empty(&mut errors, "email", &self.email);
        rules::email(&mut errors, "email", &self.email);
        rules::not_empty(&mut errors, "password", &self.password);
        rules::not_empty(&mut errors, "nickname", &self.nickname);
        errors
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub nickname: Option<String>,
}

impl Validate for UpdateUserRequest {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        let nickname = self.nickname.as_deref().unwrap_or("");
        rules::not_empty(&mut errors, "nickname", nickname);
        rules::length_between(&mut errors, "nickname", nickname, 2, 10);
        errors
    }
}

/// Search filters and pagination share the query string; serde_urlencoded
/// cannot flatten, so the fields are spelled out.
#[derive(Debug, Deserialize)]
pub struct UserSearchQuery {
    pub email: Option<String>,
    pub nickname: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

/// POST /users - register a new user
pub async fn register(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<RegisterRequest>,
) -> ApiResult<RegisterResult> {
    let results = state
        .users
        .register(&request.email, &request.password, &request.nickname)
        .await?;
    Ok(ApiResponse::created(results, "user registered"))
}

/// GET /users/:user_id - fetch a profile
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<UserProfile> {
    let user_id = parse_uuid(&user_id)?;
    let results = state.users.get_user(user_id).await?;
    Ok(ApiResponse::ok(results, "user retrieved"))
}

/// PATCH /users/:user_id - update nickname (token user is authoritative)
pub async fn update_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(user_id): Path<String>,
    ValidJson(request): ValidJson<UpdateUserRequest>,
) -> ApiResult<UpdateUserResult> {
    parse_uuid(&user_id)?;
    let nickname = request.nickname.as_deref().unwrap_or_default();
    let results = state.users.update_nickname(&user, nickname).await?;
    Ok(ApiResponse::ok(results, "user updated"))
}

/// DELETE /users/:user_id - withdraw (soft delete)
pub async fn withdraw(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> ApiResult<WithdrawResult> {
    parse_uuid(&user_id)?;
    let results = state.users.withdraw(&user).await?;
    Ok(ApiResponse::ok(results, "user withdrawn"))
}

/// GET /users/:user_id/posts - paginated posts by owner
pub async fn user_posts(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    ValidQuery(query): ValidQuery<PageQuery>,
) -> ApiResult<UserPostPage> {
    let user_id = parse_uuid(&user_id)?;
    let page = PageRequest::resolve(&query)?;
    let results = state.posts.list_by_user(user_id, &page).await?;
    Ok(ApiResponse::ok(results, "user posts retrieved"))
}

/// GET /users/search - paginated, filtered user search
pub async fn search(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<UserSearchQuery>,
) -> ApiResult<UserSearchPage> {
    let page = PageRequest::resolve(&PageQuery {
        page: query.page,
        size: query.size,
    })?;
    let condition = UserSearchCondition {
        email: query.email,
        nickname: query.nickname,
    };
    let results = state.users.search(&condition, &page).await?;
    Ok(ApiResponse::ok(results, "user search complete"))
}
