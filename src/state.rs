use sqlx::PgPool;

use crate::database::posts::PostRepository;
use crate::database::users::UserRepository;
use crate::services::{PostService, UserService};

/// Explicitly wired application state: repositories and services are
/// constructed once at process start and shared through the router.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub users: UserService,
    pub posts: PostService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let user_repo = UserRepository::new(pool.clone());
        let post_repo = PostRepository::new(pool.clone());
        Self {
            users: UserService::new(user_repo.clone()),
            posts: PostService::new(post_repo, user_repo),
            pool,
        }
    }
}
