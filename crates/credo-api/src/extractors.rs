//! # Custom Extractors & Validation
//!
//! Provides the [`Validate`] trait for request DTOs, helpers to extract and
//! validate JSON bodies, and the [`Page`] query parameters shared by list
//! endpoints.

use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::AppError;

/// Trait for request types that validate business rules beyond what serde
/// deserialization checks.
pub trait Validate {
    /// Validate business rules. Returns an error message on failure.
    fn validate(&self) -> Result<(), String>;
}

/// Extract a JSON body, mapping deserialization errors to
/// [`AppError::BadRequest`].
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract a JSON body and validate it using the [`Validate`] trait.
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}

/// Pagination window for list endpoints.
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
pub struct Page {
    /// Number of records to skip.
    #[serde(default)]
    pub skip: usize,
    /// Maximum number of records to return. Clamped to [`Page::MAX_LIMIT`].
    #[serde(default = "Page::default_limit")]
    pub limit: usize,
}

impl Page {
    /// Default page size.
    pub const DEFAULT_LIMIT: usize = 25;
    /// Maximum page size.
    pub const MAX_LIMIT: usize = 100;

    fn default_limit() -> usize {
        Self::DEFAULT_LIMIT
    }

    /// Apply the window to a full result set.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.skip)
            .take(self.limit.min(Self::MAX_LIMIT))
            .collect()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}
