use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::validate::FieldErrors;

pub const DEFAULT_PAGE: i64 = 0;
pub const DEFAULT_SIZE: i64 = 10;

/// Raw pagination query parameters, before constraint checks.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

/// Validated pagination request. `page` is zero-based.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: i64,
    pub size: i64,
}

impl PageRequest {
    /// Apply defaults (page 0, size 10) and reject out-of-range parameters
    /// with the per-field validation envelope.
    pub fn resolve(query: &PageQuery) -> Result<Self, ApiError> {
        let mut errors = FieldErrors::new();

        let page = query.page.unwrap_or(DEFAULT_PAGE);
        if page < 0 {
            errors.add("page", "must be greater than or equal to 0");
        }

        let size = query.size.unwrap_or(DEFAULT_SIZE);
        if size < 1 {
            errors.add("size", "must be greater than or equal to 1");
        }

        if !errors.is_empty() {
            return Err(ApiError::validation(errors));
        }

        Ok(Self { page, size })
    }

    pub fn offset(&self) -> i64 {
        self.page * self.size
    }

    pub fn limit(&self) -> i64 {
        self.size
    }
}

/// Page metadata reported alongside the content array.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total_pages: i64,
    pub total_elements: i64,
    pub number_of_elements: usize,
    pub page_number: i64,
    pub page_size: i64,
    pub is_first: bool,
    pub is_next: bool,
}

impl PageMeta {
    pub fn new(request: &PageRequest, total_elements: i64, number_of_elements: usize) -> Self {
        let total_pages = (total_elements + request.size - 1) / request.size;
        Self {
            total_pages,
            total_elements,
            number_of_elements,
            page_number: request.page,
            page_size: request.size,
            is_first: request.page == 0,
            is_next: request.page + 1 < total_pages,
        }
    }
}
