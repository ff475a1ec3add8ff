use axum::extract::{Path, State};
use axum::Extension;
use serde::Deserialize;

use crate::api::{ApiResponse, ApiResult, PageQuery, PageRequest};
use crate::database::posts::PostSearchCondition;
use crate::handlers::parse_uuid;
use crate::middleware::AuthUser;
use crate::services::post_service::{
    CreatePostResult, DeletePostResult, PostPage, PostResult, UpdatePostResult,
};
use crate::state::AppState;
use crate::validate::{rules, FieldErrors, ValidJson, ValidQuery, Validate};

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl Validate for CreatePostRequest {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        rules::not_empty(&mut errors, "title", &self.title);
        rules::not_empty(&mut errors, "content", &self.content);
        errors
    }
}

/// Partial update: absent fields leave the stored value untouched.
#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl Validate for UpdatePostRequest {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if let Some(title) = &self.title {
            rules::min_length(&mut errors, "title", title, 1);
        }
        if let Some(content) = &self.content {
            rules::min_length(&mut errors, "content", content, 1);
        }
        errors
    }
}

#[derive(Debug, Deserialize)]
pub struct PostSearchQuery {
    pub writer: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

/// POST /posts - create a post attributed to the token user
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidJson(request): ValidJson<CreatePostRequest>,
) -> ApiResult<CreatePostResult> {
    let results = state
        .posts
        .create(&user, &request.title, &request.content)
        .await?;
    Ok(ApiResponse::created(results, "post created"))
}

/// GET /posts/:post_id - fetch a post
pub async fn get(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> ApiResult<PostResult> {
    let post_id = parse_uuid(&post_id)?;
    let results = state.posts.get(post_id).await?;
    Ok(ApiResponse::ok(results, "post retrieved"))
}

/// PATCH /posts/:post_id - partial update, owner only
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(post_id): Path<String>,
    ValidJson(request): ValidJson<UpdatePostRequest>,
) -> ApiResult<UpdatePostResult> {
    let post_id = parse_uuid(&post_id)?;
    let results = state
        .posts
        .update(
            post_id,
            user.id,
            request.title.as_deref(),
            request.content.as_deref(),
        )
        .await?;
    Ok(ApiResponse::ok(results, "post updated"))
}

/// DELETE /posts/:post_id - owner-scoped delete, idempotent
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(post_id): Path<String>,
) -> ApiResult<DeletePostResult> {
    let post_id = parse_uuid(&post_id)?;
    let results = state.posts.delete(post_id, user.id).await?;
    Ok(ApiResponse::ok(results, "post deleted"))
}

/// GET /posts - paginated post list
pub async fn list(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<PageQuery>,
) -> ApiResult<PostPage> {
    let page = PageRequest::resolve(&query)?;
    let results = state.posts.list(&page).await?;
    Ok(ApiResponse::ok(results, "post list retrieved"))
}

/// GET /posts/search - paginated, filtered post search
pub async fn search(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<PostSearchQuery>,
) -> ApiResult<PostPage> {
    let page = PageRequest::resolve(&PageQuery {
        page: query.page,
        size: query.size,
    })?;
    let condition = PostSearchCondition {
        writer: query.writer,
        title: query.title,
        content: query.content,
    };
    let results = state.posts.search(&condition, &page).await?;
    Ok(ApiResponse::ok(results, "post search complete"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_post_reports_title_and_content() {
        let request = CreatePostRequest {
            title: String::new(),
            content: String::new(),
        };
        let errors = request.validate();
        let fields: Vec<&str> = errors.fields().collect();
        assert_eq!(fields, vec!["title", "content"]);
    }

    #[test]
    fn absent_update_fields_pass() {
        let request = UpdatePostRequest {
            title: None,
            content: None,
        };
        assert!(request.validate().is_empty());
    }

    #[test]
    fn present_but_empty_update_field_fails() {
        let request = UpdatePostRequest {
            title: Some(String::new()),
            content: Some("X".to_string()),
        };
        let errors = request.validate();
        let fields: Vec<&str> = errors.fields().collect();
        assert_eq!(fields, vec!["title"]);
    }
}
