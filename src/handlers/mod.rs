pub mod auth;
pub mod posts;
pub mod users;

use uuid::Uuid;

use crate::error::ApiError;

/// Path identifiers arrive as strings; a malformed UUID is a bad request,
/// not a missing resource.
pub(crate) fn parse_uuid(value: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(value).map_err(|_| ApiError::bad_request(format!("invalid UUID: {}", value)))
}

#[cfg(test)]
mod tests {
    use super::parse_uuid;

    #[test]
    fn rejects_malformed_uuid() {
        assert!(parse_uuid("not-a-uuid").is_err());
        assert!(parse_uuid("123e4567-e89b-12d3-a456-426614174000").is_ok());
    }
}
