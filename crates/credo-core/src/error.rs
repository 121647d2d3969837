//! # Error Hierarchy
//!
//! Structured error types shared across the workspace, built with
//! `thiserror`. No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! Subsystems define their own error enums (transition errors in
//! `credo-state`, ledger errors in `credo-ledger`); this module holds the
//! variants that cut across crates.

use thiserror::Error;

/// Top-level error type for core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Canonicalization failure during digest computation.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// Domain primitive validation failure.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    /// Numeric attributes must be strings or integers.
    #[error("float values are not permitted in canonical representations; use string or integer: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed during canonicalization.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Validation errors for domain primitive newtypes.
///
/// Each carries the invalid input so operators can diagnose bad data
/// without guesswork.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Wallet address is not `0x` + 40 hex characters.
    #[error("invalid wallet address: \"{0}\" (expected 0x followed by 40 hex characters)")]
    InvalidWalletAddress(String),

    /// An identifier string failed to parse as a UUID.
    #[error("invalid identifier: \"{0}\"")]
    InvalidIdentifier(String),

    /// An email address failed basic format validation.
    #[error("invalid email address: \"{0}\"")]
    InvalidEmail(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_carries_input() {
        let err = ValidationError::InvalidWalletAddress("nope".to_string());
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn canonicalization_error_converts_to_core_error() {
        let err = CoreError::from(CanonicalizationError::FloatRejected(2.5));
        assert!(err.to_string().contains("canonicalization"));
    }
}
