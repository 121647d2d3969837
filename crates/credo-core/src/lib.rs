#![deny(missing_docs)]

//! # credo-core — Foundational Types for the Credo Platform
//!
//! This crate defines the types that every other crate in the workspace
//! depends on. It has no internal crate dependencies — only `serde`,
//! `serde_json`, `thiserror`, `chrono`, `uuid`, and `sha2` from the
//! external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** Every identifier is a
//!    distinct type. You cannot pass a [`CommunityId`] where a
//!    [`ProfileId`] is expected.
//!
//! 2. **[`CanonicalBytes`] is the sole path to digest computation.** All
//!    content-addressed digests flow through `CanonicalBytes::new()`, which
//!    applies canonicalization (float rejection, datetime normalization,
//!    sorted keys) before hashing.
//!
//! 3. **[`CoreError`] hierarchy.** Structured errors with `thiserror` — no
//!    `Box<dyn Error>`, no `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

// Re-export primary types at crate root for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::{sha256_bytes, sha256_digest, ContentDigest, DigestAlgorithm};
pub use error::{CanonicalizationError, CoreError, ValidationError};
pub use identity::{
    AbilityId, AchievementId, CommunityId, CredentialId, KeyId, OrderRef, ProfileId, WalletAddress,
};
pub use temporal::Timestamp;
