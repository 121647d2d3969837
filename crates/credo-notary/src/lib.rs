#![deny(missing_docs)]
#![recursion_limit = "256"]

//! # credo-notary — Credential Notarization
//!
//! Turns a credential into tamper-evident content for the ledger:
//!
//! 1. [`attributes::CredentialAttributes`] assembles the fixed attribute
//!    record from the achievement snapshot, the holder profile, and the
//!    credential itself.
//! 2. [`notarize::Notary`] computes a content-derived **imprint** over the
//!    schema-ordered record — the value embedded in the ledger order's
//!    asset payload — and the **evidence**: per-attribute digests that let
//!    a third party re-derive the imprint from the published metadata.
//! 3. [`schema`] serves the JSON Schema describing the attribute record.
//!
//! Every digest flows through `credo-core`'s [`CanonicalBytes`] so the
//! imprint is deterministic regardless of field ordering or datetime
//! formatting at the call site.
//!
//! [`CanonicalBytes`]: credo_core::CanonicalBytes

pub mod attributes;
pub mod notarize;
pub mod schema;

pub use attributes::{
    redact_public_view, strip_transient, CredentialAttributes, REDACTED_METADATA_FIELDS,
    TRANSIENT_FIELDS,
};
pub use notarize::{AttributeProof, Evidence, Notary, NotaryError};
pub use schema::{credential_schema, SCHEMA_FIELD_ORDER};
