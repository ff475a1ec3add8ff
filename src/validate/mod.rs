use async_trait::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::ApiError;

/// Ordered field -> messages map collected from declared constraints.
///
/// Fields appear in the order they are first reported; additional messages for
/// the same field are appended, never deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    entries: Vec<(String, Vec<String>)>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        let message = message.into();
        match self.entries.iter_mut().find(|(name, _)| name == field) {
            Some((_, messages)) => messages.push(message),
            None => self.entries.push((field.to_string(), vec![message])),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn messages_for(&self, field: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, messages)| messages.as_slice())
    }
}

impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, messages) in &self.entries {
            map.serialize_entry(field, messages)?;
        }
        map.end()
    }
}

/// Declared-constraint validation for a request body.
pub trait Validate {
    fn validate(&self) -> FieldErrors;
}

/// JSON extractor that validates the body before the handler body runs.
///
/// Deserialization failures become 400 Bad Request; constraint failures abort
/// the call with the full field-error report attached to the envelope.
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: serde::de::DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

        let errors = value.validate();
        if !errors.is_empty() {
            return Err(ApiError::validation(errors));
        }

        Ok(ValidJson(value))
    }
}

/// Query-string extractor whose rejection renders the uniform envelope.
///
/// A non-numeric `page`, say, is a 400 Bad Request with the same JSON body
/// shape as every other failure, never axum's plain-text rejection.
pub struct ValidQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidQuery<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        Ok(ValidQuery(value))
    }
}

/// Constraint checks shared by the request DTOs.
pub mod rules {
    use super::FieldErrors;

    pub fn not_empty(errors: &mut FieldErrors, field: &str, value: &str) {
        if value.is_empty() {
            errors.add(field, "must not be empty");
        }
    }

    /// Empty values pass; `not_empty` reports those separately.
    pub fn email(errors: &mut FieldErrors, field: &str, value: &str) {
        if value.is_empty() {
            return;
        }
        let mut parts = value.splitn(2, '@');
        let local = parts.next().unwrap_or("");
        let domain = parts.next();
        let well_formed = !local.is_empty()
            && domain.map_or(false, |d| !d.is_empty() && !d.contains('@'))
            && !value.chars().any(char::is_whitespace);
        if !well_formed {
            errors.add(field, "must be a well-formed email address");
        }
    }

    pub fn length_between(
        errors: &mut FieldErrors,
        field: &str,
        value: &str,
        min: usize,
        max: usize,
    ) {
        let len = value.chars().count();
        if len < min || len > max {
            errors.add(
                field,
                format!("must be between {} and {} characters", min, max),
            );
        }
    }

    pub fn min_length(errors: &mut FieldErrors, field: &str, value: &str, min: usize) {
        if value.chars().count() < min {
            errors.add(field, format!("must be at least {} character(s)", min));
        }
    }
}
