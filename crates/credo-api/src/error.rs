//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps domain errors from credo-state, credo-ledger, etc. to HTTP status
//! codes. Returns JSON error response bodies with a machine-readable code,
//! a message, and — for validation errors — the offending field codes.
//! Never exposes internal error details in responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use credo_ledger::LedgerError;
use credo_state::{DependencyError, TransitionError};

/// Structured JSON error response body.
///
/// All error responses use this format across the API surface. The
/// `details` field carries field codes for 422 validation errors and is
/// omitted otherwise.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// The error payload.
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details, present only for validation errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// A field-level validation failure.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    /// The offending field.
    pub field: String,
    /// Machine-readable failure code.
    pub code: String,
}

impl FieldError {
    /// Create a field error.
    pub fn new(field: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
        }
    }
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
///
/// Maps the platform error taxonomy to HTTP status codes and structured
/// JSON bodies. Internal and ledger error details are logged, never
/// returned to clients.
#[derive(Error, Debug)]
pub enum AppError {
    /// No valid actor (401).
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Actor lacks a required capability or a transition guard failed (403).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Referenced entity missing or soft-deleted (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Field-level validation failures (422, with field codes in details).
    #[error("validation error on {} field(s)", .0.len())]
    ValidationFields(Vec<FieldError>),

    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Conflict with current resource state (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// External ledger unreachable or erroring (502). Details are logged
    /// but not returned to the client.
    #[error("system error: {0}")]
    System(String),

    /// Internal server error (500). Message is logged but not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Unauthenticated(_) => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            Self::Unauthorized(_) => (StatusCode::FORBIDDEN, "UNAUTHORIZED"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) | Self::ValidationFields(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR")
            }
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::System(_) => (StatusCode::BAD_GATEWAY, "SYSTEM_ERROR"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal or upstream error messages to clients.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            Self::System(_) => "An external dependency failed".to_string(),
            other => other.to_string(),
        };

        match &self {
            Self::Internal(detail) => tracing::error!(%detail, "internal server error"),
            Self::System(detail) => tracing::error!(%detail, "ledger system error"),
            _ => {}
        }

        let details = match &self {
            Self::ValidationFields(fields) => serde_json::to_value(fields).ok(),
            _ => None,
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// A transition guard rejected the action: the credential was not in a
/// stage the trigger admits.
impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        Self::Unauthorized(err.to_string())
    }
}

/// Dependency-graph failures surface as field-level validation errors.
impl From<DependencyError> for AppError {
    fn from(err: DependencyError) -> Self {
        let code = match &err {
            DependencyError::Unresolvable(_) => "ACHIEVEMENT_DEPENDENCY_NOT_PERSISTENT",
            DependencyError::SelfReference(_) => "ACHIEVEMENT_DEPENDENCY_SELF_REFERENCE",
        };
        Self::ValidationFields(vec![FieldError::new("dependent_achievement_ids", code)])
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        Self::System(err.to_string())
    }
}

impl From<credo_core::ValidationError> for AppError {
    fn from(err: credo_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<credo_notary::NotaryError> for AppError {
    fn from(err: credo_notary::NotaryError) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn response_parts(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[test]
    fn status_codes_follow_the_taxonomy() {
        let cases: Vec<(AppError, StatusCode, &str)> = vec![
            (
                AppError::Unauthenticated("x".into()),
                StatusCode::UNAUTHORIZED,
                "UNAUTHENTICATED",
            ),
            (
                AppError::Unauthorized("x".into()),
                StatusCode::FORBIDDEN,
                "UNAUTHORIZED",
            ),
            (
                AppError::NotFound("x".into()),
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
            ),
            (
                AppError::Validation("x".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
            ),
            (
                AppError::BadRequest("x".into()),
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
            ),
            (
                AppError::Conflict("x".into()),
                StatusCode::CONFLICT,
                "CONFLICT",
            ),
            (
                AppError::System("x".into()),
                StatusCode::BAD_GATEWAY,
                "SYSTEM_ERROR",
            ),
            (
                AppError::Internal("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
        ];
        for (err, status, code) in cases {
            let (s, c) = err.status_and_code();
            assert_eq!(s, status);
            assert_eq!(c, code);
        }
    }

    #[tokio::test]
    async fn validation_fields_carry_details() {
        let err = AppError::ValidationFields(vec![FieldError::new(
            "dependent_achievement_ids",
            "ACHIEVEMENT_DEPENDENCY_SELF_REFERENCE",
        )]);
        let (status, body) = response_parts(err).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let details = body.error.details.unwrap();
        assert_eq!(details[0]["field"], "dependent_achievement_ids");
        assert_eq!(details[0]["code"], "ACHIEVEMENT_DEPENDENCY_SELF_REFERENCE");
    }

    #[tokio::test]
    async fn internal_details_do_not_leak() {
        let (status, body) = response_parts(AppError::Internal("db password is hunter2".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.error.message.contains("hunter2"));
        assert_eq!(body.error.message, "An internal error occurred");
    }

    #[tokio::test]
    async fn system_details_do_not_leak() {
        let (status, body) =
            response_parts(AppError::System("ledger at 10.0.0.5 refused".into())).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(!body.error.message.contains("10.0.0.5"));
    }

    #[test]
    fn transition_error_maps_to_unauthorized() {
        let err = credo_state::CredentialStage::Completed.cancel().unwrap_err();
        let app_err = AppError::from(err);
        let (status, _) = app_err.status_and_code();
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn dependency_error_maps_to_field_validation() {
        let id = credo_core::AchievementId::new();
        let app_err = AppError::from(DependencyError::SelfReference(id));
        match &app_err {
            AppError::ValidationFields(fields) => {
                assert_eq!(fields[0].field, "dependent_achievement_ids");
            }
            other => panic!("expected ValidationFields, got: {other:?}"),
        }
    }
}
