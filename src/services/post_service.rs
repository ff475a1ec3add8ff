use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::api::{PageMeta, PageRequest};
use crate::database::models::{Post, PostView};
use crate::database::posts::{PostRepository, PostSearchCondition};
use crate::database::users::UserRepository;
use crate::middleware::AuthUser;

#[derive(Debug, Error)]
pub enum PostServiceError {
    #[error("post not found")]
    PostNotFound,
    #[error("no such user")]
    WriterNotFound,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostResult {
    pub post_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResult {
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub writer: String,
    pub title: String,
    pub content: String,
    pub created_date: DateTime<Utc>,
    pub last_modified_date: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostResult {
    pub post_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePostResult {
    pub post_id: Uuid,
    pub user_id: Uuid,
}

/// Post row as listed in pages and search results.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListItem {
    pub post_id: Uuid,
    pub writer: String,
    pub title: String,
    pub content: String,
    pub created_date: DateTime<Utc>,
    pub last_modified_date: DateTime<Utc>,
}

impl From<PostView> for PostListItem {
    fn from(view: PostView) -> Self {
        Self {
            post_id: view.id,
            writer: view.writer,
            title: view.title,
            content: view.content,
            created_date: view.created_at,
            last_modified_date: view.updated_at,
        }
    }
}

/// Compact post shape embedded in user search rows.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub post_id: Uuid,
    pub title: String,
    pub content: String,
    pub created_date: DateTime<Utc>,
    pub last_modified_date: DateTime<Utc>,
}

impl From<Post> for PostSummary {
    fn from(post: Post) -> Self {
        Self {
            post_id: post.id,
            title: post.title,
            content: post.content,
            created_date: post.created_at,
            last_modified_date: post.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPage {
    pub posts: Vec<PostListItem>,
    #[serde(flatten)]
    pub page: PageMeta,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPostPage {
    pub user_id: Uuid,
    pub posts: Vec<PostListItem>,
    #[serde(flatten)]
    pub page: PageMeta,
}

#[derive(Clone)]
pub struct PostService {
    posts: PostRepository,
    users: UserRepository,
}

impl PostService {
    pub fn new(posts: PostRepository, users: UserRepository) -> Self {
        Self { posts, users }
    }

    /// Writer name is captured from the creator's nickname at creation time.
    pub async fn create(
        &self,
        user: &AuthUser,
        title: &str,
        content: &str,
    ) -> Result<CreatePostResult, PostServiceError> {
        let writer = self
            .users
            .find_active_by_id(user.id)
            .await?
            .ok_or(PostServiceError::WriterNotFound)?;

        let post_id = self
            .posts
            .insert(user.id, &writer.nickname, title, content)
            .await?;
        tracing::info!(%post_id, user_id = %user.id, "post created");

        Ok(CreatePostResult {
            post_id,
            user_id: user.id,
        })
    }

    pub async fn get(&self, post_id: Uuid) -> Result<PostResult, PostServiceError> {
        let view = self
            .posts
            .find_view(post_id)
            .await?
            .ok_or(PostServiceError::PostNotFound)?;

        Ok(PostResult {
            post_id: view.id,
            user_id: view.user_id,
            writer: view.writer,
            title: view.title,
            content: view.content,
            created_date: view.created_at,
            last_modified_date: view.updated_at,
        })
    }

    /// Ownership mismatch and missing post are indistinguishable here: both
    /// surface as not found.
    pub async fn update(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<UpdatePostResult, PostServiceError> {
        let matched = self
            .posts
            .update_owned(post_id, user_id, title, content)
            .await?;
        if !matched {
            return Err(PostServiceError::PostNotFound);
        }
        Ok(UpdatePostResult { post_id, user_id })
    }

    /// Zero rows matched is a silent no-op, unlike update.
    pub async fn delete(
        &self,
        post_id: Uuid,
        user_id: Uuid,
    ) -> Result<DeletePostResult, PostServiceError> {
        let deleted = self.posts.delete_owned(post_id, user_id).await?;
        tracing::info!(%post_id, %user_id, deleted, "post delete");
        Ok(DeletePostResult { post_id, user_id })
    }

    pub async fn list(&self, page: &PageRequest) -> Result<PostPage, PostServiceError> {
        let (posts, total) = self.posts.list(page).await?;
        Ok(Self::page_of(posts, total, page))
    }

    pub async fn list_by_user(
        &self,
        user_id: Uuid,
        page: &PageRequest,
    ) -> Result<UserPostPage, PostServiceError> {
        let (posts, total) = self.posts.list_by_user(user_id, page).await?;
        let inner = Self::page_of(posts, total, page);
        Ok(UserPostPage {
            user_id,
            posts: inner.posts,
            page: inner.page,
        })
    }

    pub async fn search(
        &self,
        condition: &PostSearchCondition,
        page: &PageRequest,
    ) -> Result<PostPage, PostServiceError> {
        let (posts, total) = self.posts.search(condition, page).await?;
        Ok(Self::page_of(posts, total, page))
    }

    fn page_of(posts: Vec<PostView>, total: i64, page: &PageRequest) -> PostPage {
        let meta = PageMeta::new(page, total, posts.len());
        PostPage {
            posts: posts.into_iter().map(PostListItem::from).collect(),
            page: meta,
        }
    }
}
