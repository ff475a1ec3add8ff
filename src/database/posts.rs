use sqlx::PgPool;
use uuid::Uuid;

use crate::api::PageRequest;
use crate::database::like_pattern;
use crate::database::models::PostView;

/// Filters for the post search; empty filters match all posts.
/// `writer` matches the owner's live nickname, not the stored copy.
#[derive(Debug, Default, Clone, serde::Deserialize)]
pub struct PostSearchCondition {
    pub writer: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
}

const SELECT_VIEW: &str = "SELECT p.id, p.user_id, u.nickname AS writer, \
     p.title, p.content, p.created_at, p.updated_at \
     FROM posts p LEFT JOIN users u ON u.id = p.user_id";

#[derive(Clone)]
pub struct PostRepository {
    pool: PgPool,
}

impl PostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        user_id: Uuid,
        writer: &str,
        title: &str,
        content: &str,
    ) -> sqlx::Result<Uuid> {
        let (id,): (Uuid,) = sqlx::query_as(
            "INSERT INTO posts (user_id, writer, title, content) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(user_id)
        .bind(writer)
        .bind(title)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    pub async fn find_view(&self, post_id: Uuid) -> sqlx::Result<Option<PostView>> {
        sqlx::query_as(&format!("{} WHERE p.id = $1", SELECT_VIEW))
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Partial update scoped to the owner, in one transaction.
    ///
    /// Only non-null fields overwrite. Returns false when no (post, owner)
    /// pair matched - the caller cannot tell a missing post from someone
    /// else's post, and reports both as not found.
    pub async fn update_owned(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        title: Option<&str>,
        content: Option<&str>,
    ) -> sqlx::Result<bool> {
        let mut tx = self.pool.begin().await?;

        let owned: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM posts WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        if owned.is_none() {
            return Ok(false);
        }

        sqlx::query(
            "UPDATE posts SET title = COALESCE($3, title), \
             content = COALESCE($4, content), updated_at = now() \
             WHERE id = $1 AND user_id = $2",
        )
        .bind(post_id)
        .bind(user_id)
        .bind(title)
        .bind(content)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Delete scoped to the owner. Zero rows matched is not an error:
    /// delete is idempotent, unlike update.
    pub async fn delete_owned(&self, post_id: Uuid, user_id: Uuid) -> sqlx::Result<u64> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn list(&self, page: &PageRequest) -> sqlx::Result<(Vec<PostView>, i64)> {
        let posts: Vec<PostView> = sqlx::query_as(&format!(
            "{} ORDER BY p.created_at DESC LIMIT $1 OFFSET $2",
            SELECT_VIEW
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;

        Ok((posts, total))
    }

    pub async fn list_by_user(
        &self,
        user_id: Uuid,
        page: &PageRequest,
    ) -> sqlx::Result<(Vec<PostView>, i64)> {
        let posts: Vec<PostView> = sqlx::query_as(&format!(
            "{} WHERE p.user_id = $1 ORDER BY p.created_at DESC LIMIT $2 OFFSET $3",
            SELECT_VIEW
        ))
        .bind(user_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok((posts, total))
    }

    /// Substring search over posts joined to their owners, newest first.
    pub async fn search(
        &self,
        condition: &PostSearchCondition,
        page: &PageRequest,
    ) -> sqlx::Result<(Vec<PostView>, i64)> {
        let writer = like_pattern(condition.writer.as_deref());
        let title = like_pattern(condition.title.as_deref());
        let content = like_pattern(condition.content.as_deref());

        let posts: Vec<PostView> = sqlx::query_as(&format!(
            "{} WHERE u.nickname LIKE $1 AND p.title LIKE $2 AND p.content LIKE $3 \
             ORDER BY p.created_at DESC LIMIT $4 OFFSET $5",
            SELECT_VIEW
        ))
        .bind(&writer)
        .bind(&title)
        .bind(&content)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM posts p LEFT JOIN users u ON u.id = p.user_id \
             WHERE u.nickname LIKE $1 AND p.title LIKE $2 AND p.content LIKE $3",
        )
        .bind(&writer)
        .bind(&title)
        .bind(&content)
        .fetch_one(&self.pool)
        .await?;

        Ok((posts, total))
    }
}
