//! # Imprint & Evidence Computation
//!
//! The notary derives two artifacts from a metadata record:
//!
//! - **Imprint** — a single digest embedded in the ledger order's asset
//!   payload. Computed over per-attribute digests in schema order, so a
//!   verifier holding the evidence can re-derive it without trusting the
//!   platform.
//! - **Evidence** — the per-attribute digest list (plus algorithm tag),
//!   stored alongside the credential and served after completion.
//!
//! Each attribute leaf is the digest of the canonical `[name, value]` pair;
//! binding the name into the leaf prevents two attributes with equal values
//! from producing interchangeable proofs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use credo_core::{sha256_bytes, sha256_digest, CanonicalBytes, CanonicalizationError};

use crate::schema::SCHEMA_FIELD_ORDER;

/// Errors during notarization.
#[derive(Error, Debug)]
pub enum NotaryError {
    /// The metadata record is not a JSON object.
    #[error("metadata record must be a JSON object")]
    NotAnObject,

    /// The metadata record is missing a schema attribute.
    #[error("metadata record is missing schema attribute \"{0}\"")]
    MissingAttribute(&'static str),

    /// Canonicalization failed for an attribute value.
    #[error("canonicalization failed for attribute \"{attribute}\": {source}")]
    Canonicalization {
        /// The attribute that failed.
        attribute: &'static str,
        /// The underlying canonicalization failure.
        #[source]
        source: CanonicalizationError,
    },

    /// Evidence serialization failed.
    #[error("evidence serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Digest of a single attribute, bound to its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeProof {
    /// The schema attribute name.
    pub attribute: String,
    /// Lowercase hex digest of the canonical `[name, value]` pair.
    pub digest: String,
}

/// The evidence document stored with a credential and served after
/// completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    /// The digest algorithm used for every proof and the imprint.
    pub algorithm: String,
    /// The derived imprint, lowercase hex.
    pub imprint: String,
    /// Per-attribute digests in schema order.
    pub proofs: Vec<AttributeProof>,
}

impl Evidence {
    /// Re-derive the imprint from the proofs and compare.
    ///
    /// Lets a verifier confirm that served evidence is internally
    /// consistent before checking individual attributes against published
    /// metadata.
    pub fn is_consistent(&self) -> bool {
        derive_imprint(self.proofs.iter().map(|p| p.digest.as_str())) == self.imprint
    }
}

/// Stateless notarization engine over the fixed credential schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct Notary;

impl Notary {
    /// Compute the imprint of a metadata record.
    pub fn imprint(&self, metadata: &serde_json::Value) -> Result<String, NotaryError> {
        Ok(self.notarize(metadata)?.imprint)
    }

    /// Compute the full evidence (per-attribute digests plus imprint) of a
    /// metadata record.
    pub fn notarize(&self, metadata: &serde_json::Value) -> Result<Evidence, NotaryError> {
        let map = metadata.as_object().ok_or(NotaryError::NotAnObject)?;

        let mut proofs = Vec::with_capacity(SCHEMA_FIELD_ORDER.len());
        for name in SCHEMA_FIELD_ORDER {
            let value = map
                .get(name)
                .ok_or(NotaryError::MissingAttribute(name))?;
            let leaf = CanonicalBytes::new(&serde_json::json!([name, value])).map_err(
                |source| NotaryError::Canonicalization {
                    attribute: name,
                    source,
                },
            )?;
            proofs.push(AttributeProof {
                attribute: name.to_string(),
                digest: sha256_digest(&leaf).to_hex(),
            });
        }

        let imprint = derive_imprint(proofs.iter().map(|p| p.digest.as_str()));
        Ok(Evidence {
            algorithm: "sha256".to_string(),
            imprint,
            proofs,
        })
    }
}

/// Digest the concatenated attribute digests into the imprint.
fn derive_imprint<'a>(digests: impl Iterator<Item = &'a str>) -> String {
    let mut concatenated = Vec::new();
    for digest in digests {
        concatenated.extend_from_slice(digest.as_bytes());
    }
    sha256_bytes(&concatenated)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
