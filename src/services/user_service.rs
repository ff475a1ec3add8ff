use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::api::{PageMeta, PageRequest};
use crate::auth::{self, AuthError};
use crate::database::is_unique_violation;
use crate::database::models::User;
use crate::database::users::{UserRepository, UserSearchCondition};
use crate::middleware::AuthUser;
use crate::services::post_service::PostSummary;

#[derive(Debug, Error)]
pub enum UserServiceError {
    #[error("no such email")]
    EmailNotFound,
    // Deliberately a not-found, not an unauthorized: the API treats a bad
    // password the same as a missing account.
    #[error("password does not match")]
    PasswordMismatch,
    #[error("no such user")]
    UserNotFound,
    #[error("duplicate email or nickname: {0}")]
    Duplicate(String),
    #[error(transparent)]
    Token(#[from] AuthError),
    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for UserServiceError {
    fn from(err: sqlx::Error) -> Self {
        if is_unique_violation(&err) {
            UserServiceError::Duplicate(err.to_string())
        } else {
            UserServiceError::Database(err)
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResult {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResult {
    pub user_id: Uuid,
    pub email: String,
    pub nickname: String,
    pub created_date: DateTime<Utc>,
    pub last_modified_date: DateTime<Utc>,
    pub access_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: Uuid,
    pub email: String,
    pub nickname: String,
    pub created_date: DateTime<Utc>,
    pub last_modified_date: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            email: user.email,
            nickname: user.nickname,
            created_date: user.created_at,
            last_modified_date: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserResult {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawResult {
    pub user_id: Uuid,
    pub quit: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSearchItem {
    pub user_id: Uuid,
    pub email: String,
    pub nickname: String,
    pub quit: bool,
    pub created_date: DateTime<Utc>,
    pub last_modified_date: DateTime<Utc>,
    pub posts: Vec<PostSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSearchPage {
    pub users: Vec<UserSearchItem>,
    #[serde(flatten)]
    pub page: PageMeta,
}

#[derive(Clone)]
pub struct UserService {
    users: UserRepository,
}

impl UserService {
    pub fn new(users: UserRepository) -> Self {
        Self { users }
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        nickname: &str,
    ) -> Result<RegisterResult, UserServiceError> {
        let user_id = self
            .users
            .insert(email, &password_digest(password), nickname)
            .await?;
        tracing::info!(%user_id, "user registered");
        Ok(RegisterResult { user_id })
    }

    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<LoginResult, UserServiceError> {
        let user = self
            .users
            .find_active_by_email(email)
            .await
            .map_err(UserServiceError::Database)?
            .ok_or(UserServiceError::EmailNotFound)?;

        if user.password != password_digest(password) {
            return Err(UserServiceError::PasswordMismatch);
        }

        let access_token = auth::issue_token(user.id, &user.email)?;
        Ok(LoginResult {
            user_id: user.id,
            email: user.email,
            nickname: user.nickname,
            created_date: user.created_at,
            last_modified_date: user.updated_at,
            access_token,
        })
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<UserProfile, UserServiceError> {
        let user = self
            .users
            .find_active_by_id(user_id)
            .await
            .map_err(UserServiceError::Database)?
            .ok_or(UserServiceError::UserNotFound)?;
        Ok(user.into())
    }

    pub async fn update_nickname(
        &self,
        user: &AuthUser,
        nickname: &str,
    ) -> Result<UpdateUserResult, UserServiceError> {
        let changed = self.users.update_nickname(user.id, nickname).await?;
        if changed == 0 {
            return Err(UserServiceError::UserNotFound);
        }
        Ok(UpdateUserResult { user_id: user.id })
    }

    pub async fn withdraw(&self, user: &AuthUser) -> Result<WithdrawResult, UserServiceError> {
        let changed = self
            .users
            .withdraw(user.id)
            .await
            .map_err(UserServiceError::Database)?;
        if changed == 0 {
            return Err(UserServiceError::UserNotFound);
        }
        tracing::info!(user_id = %user.id, "user withdrawn");
        Ok(WithdrawResult {
            user_id: user.id,
            quit: true,
        })
    }

    pub async fn search(
        &self,
        condition: &UserSearchCondition,
        page: &PageRequest,
    ) -> Result<UserSearchPage, UserServiceError> {
        let (users, total) = self
            .users
            .search(condition, page)
            .await
            .map_err(UserServiceError::Database)?;

        let user_ids: Vec<Uuid> = users.iter().map(|u| u.id).collect();
        let mut posts_by_user: std::collections::HashMap<Uuid, Vec<PostSummary>> =
            std::collections::HashMap::new();
        for post in self
            .users
            .posts_by_users(&user_ids)
            .await
            .map_err(UserServiceError::Database)?
        {
            posts_by_user
                .entry(post.user_id)
                .or_default()
                .push(post.into());
        }

        let meta = PageMeta::new(page, total, users.len());
        let items = users
            .into_iter()
            .map(|user| UserSearchItem {
                posts: posts_by_user.remove(&user.id).unwrap_or_default(),
                user_id: user.id,
                email: user.email,
                nickname: user.nickname,
                quit: user.quit,
                created_date: user.created_at,
                last_modified_date: user.updated_at,
            })
            .collect();

        Ok(UserSearchPage {
            users: items,
            page: meta,
        })
    }
}

/// SHA-256 hex digest used for stored credentials.
pub fn password_digest(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_stable_and_discriminating() {
        assert_eq!(password_digest("1234"), password_digest("1234"));
        assert_ne!(password_digest("1234"), password_digest("12345"));
        // SHA-256 of "1234"
        assert_eq!(
            password_digest("1234"),
            "03ac674216f3e15c761ee1a5e255f067953623c8b388b4459e13f978d7c846f4"
        );
    }
}
