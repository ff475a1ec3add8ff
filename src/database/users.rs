use sqlx::PgPool;
use uuid::Uuid;

use crate::api::PageRequest;
use crate::database::like_pattern;
use crate::database::models::{Post, User};

/// Filters for the user search; empty filters match all non-withdrawn users.
#[derive(Debug, Default, Clone, serde::Deserialize)]
pub struct UserSearchCondition {
    pub email: Option<String>,
    pub nickname: Option<String>,
}

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        email: &str,
        password_digest: &str,
        nickname: &str,
    ) -> sqlx::Result<Uuid> {
        let (id,): (Uuid,) = sqlx::query_as(
            "INSERT INTO users (email, password, nickname) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(email)
        .bind(password_digest)
        .bind(nickname)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    pub async fn find_active_by_email(&self, email: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as("SELECT * FROM users WHERE email = $1 AND quit = false")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn find_active_by_id(&self, id: Uuid) -> sqlx::Result<Option<User>> {
        sqlx::query_as("SELECT * FROM users WHERE id = $1 AND quit = false")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Returns the number of rows changed; 0 means no active user with that id.
    pub async fn update_nickname(&self, id: Uuid, nickname: &str) -> sqlx::Result<u64> {
        let result = sqlx::query(
            "UPDATE users SET nickname = $2, updated_at = now() \
             WHERE id = $1 AND quit = false",
        )
        .bind(id)
        .bind(nickname)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Soft delete: one-way active -> withdrawn transition. Posts are untouched.
    pub async fn withdraw(&self, id: Uuid) -> sqlx::Result<u64> {
        let result = sqlx::query(
            "UPDATE users SET quit = true, updated_at = now() \
             WHERE id = $1 AND quit = false",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Substring search over non-withdrawn users, newest first, with total count.
    pub async fn search(
        &self,
        condition: &UserSearchCondition,
        page: &PageRequest,
    ) -> sqlx::Result<(Vec<User>, i64)> {
        let email = like_pattern(condition.email.as_deref());
        let nickname = like_pattern(condition.nickname.as_deref());

        let users: Vec<User> = sqlx::query_as(
            "SELECT * FROM users \
             WHERE email LIKE $1 AND nickname LIKE $2 AND quit = false \
             ORDER BY created_at DESC LIMIT $3 OFFSET $4",
        )
        .bind(&email)
        .bind(&nickname)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM users \
             WHERE email LIKE $1 AND nickname LIKE $2 AND quit = false",
        )
        .bind(&email)
        .bind(&nickname)
        .fetch_one(&self.pool)
        .await?;

        Ok((users, total))
    }

    /// Posts owned by any of the given users, newest first.
    /// Backs the embedded post lists of the user search.
    pub async fn posts_by_users(&self, user_ids: &[Uuid]) -> sqlx::Result<Vec<Post>> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }
        sqlx::query_as(
            "SELECT * FROM posts WHERE user_id = ANY($1) ORDER BY created_at DESC",
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await
    }
}
