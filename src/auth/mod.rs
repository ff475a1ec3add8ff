use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config;

const ISSUER: &str = "admin";

/// Decoded payload of an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub id: Uuid,
    pub email: String,
}

impl Claims {
    pub fn new(id: Uuid, email: String, expiration_minutes: i64) -> Self {
        let now = Utc::now();
        Self {
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(expiration_minutes)).timestamp(),
            id,
            email,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid authorization prefix")]
    InvalidPrefix,
    #[error("token has expired")]
    Expired,
    #[error("token verification failed: {0}")]
    Malformed(String),
    #[error("JWT secret not configured")]
    MissingSecret,
    #[error("token generation failed: {0}")]
    TokenGeneration(String),
}

/// Mint a signed access token for the given user identity.
pub fn issue_token(id: Uuid, email: &str) -> Result<String, AuthError> {
    let jwt = &config::config().jwt;
    let claims = Claims::new(id, email.to_string(), jwt.expiration_minutes);
    encode_claims(&claims, &jwt.secret)
}

/// Verify an `Authorization` header value and recover its claims.
///
/// The header must start with the configured prefix (e.g. "Bearer").
/// Verification is a pure function of the header, the secret, and the clock.
pub fn verify_header(header: &str) -> Result<Claims, AuthError> {
    let jwt = &config::config().jwt;
    let token = extract_token(header, &jwt.prefix)?;
    decode_token(token, &jwt.secret)
}

// The prefix and token must be space-separated: "Bearer<token>" is rejected.
fn extract_token<'a>(header: &'a str, prefix: &str) -> Result<&'a str, AuthError> {
    header
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix(' '))
        .map(str::trim)
        .ok_or(AuthError::InvalidPrefix)
}

fn encode_claims(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

fn decode_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::default();
    validation.leeway = 0;

    match decode::<Claims>(token, &decoding_key, &validation) {
        Ok(data) => Ok(data.claims),
        Err(e) => match e.kind() {
            ErrorKind::ExpiredSignature => Err(AuthError::Expired),
            _ => Err(AuthError::Malformed(e.to_string())),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    fn sample_claims(expiration_minutes: i64) -> Claims {
        Claims::new(
            Uuid::new_v4(),
            "a@x.com".to_string(),
            expiration_minutes,
        )
    }

    #[test]
    fn token_round_trips_before_expiry() {
        let claims = sample_claims(30);
        let token = encode_claims(&claims, SECRET).unwrap();

        let decoded = decode_token(&token, SECRET).unwrap();
        assert_eq!(decoded.id, claims.id);
        assert_eq!(decoded.email, claims.email);
        assert_eq!(decoded.iss, "admin");
    }

    #[test]
    fn expired_token_fails_with_expired_kind() {
        let claims = sample_claims(-5);
        let token = encode_claims(&claims, SECRET).unwrap();

        match decode_token(&token, SECRET) {
            Err(AuthError::Expired) => {}
            other => panic!("expected Expired, got {:?}", other),
        }
    }

    #[test]
    fn wrong_secret_fails_with_malformed_kind() {
        let token = encode_claims(&sample_claims(30), SECRET).unwrap();

        match decode_token(&token, "another-secret") {
            Err(AuthError::Malformed(_)) => {}
            other => panic!("expected Malformed, got {:?}", other),
        }
    }

    #[test]
    fn garbage_token_fails_with_malformed_kind() {
        match decode_token("not-a-jwt", SECRET) {
            Err(AuthError::Malformed(_)) => {}
            other => panic!("expected Malformed, got {:?}", other),
        }
    }

    #[test]
    fn missing_prefix_is_rejected() {
        match extract_token("Token abc.def.ghi", "Bearer") {
            Err(AuthError::InvalidPrefix) => {}
            other => panic!("expected InvalidPrefix, got {:?}", other),
        }
    }

    #[test]
    fn prefix_is_stripped_from_header() {
        let token = extract_token("Bearer abc.def.ghi", "Bearer").unwrap();
        assert_eq!(token, "abc.def.ghi");
    }

    #[test]
    fn prefix_without_separator_is_rejected() {
        match extract_token("Bearerabc.def.ghi", "Bearer") {
            Err(AuthError::InvalidPrefix) => {}
            other => panic!("expected InvalidPrefix, got {:?}", other),
        }
    }
}
