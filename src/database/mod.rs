pub mod models;
pub mod pool;
pub mod posts;
pub mod users;

pub use pool::{connect, health_check, DatabaseError};

/// Postgres unique-constraint violation (duplicate key).
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

/// Substring-match pattern for a conditional filter.
/// An absent or empty filter matches everything.
pub fn like_pattern(filter: Option<&str>) -> String {
    format!("%{}%", filter.unwrap_or(""))
}
