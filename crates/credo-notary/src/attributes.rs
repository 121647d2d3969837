//! # Credential Attribute Record
//!
//! The fixed record assembled for notarization. Fields come from three
//! sources: the achievement snapshot embedded in the credential, the
//! holder profile, and the credential instance itself. Absent values
//! serialize as `null` — every schema attribute is always present so the
//! imprint covers the full record.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata fields removed from the public view because they carry
/// grading or personally identifying information.
pub const REDACTED_METADATA_FIELDS: [&str; 10] = [
    "dateModified",
    "changeNote",
    "historyNote",
    "additionalNote",
    "holder",
    "dateOfBirth",
    "studentId",
    "grade",
    "cheating",
    "creditsAwarded",
];

/// Fields present at imprint time but stripped before the metadata is
/// stored; read endpoints re-attach them with request-derived URLs.
pub const TRANSIENT_FIELDS: [&str; 2] = ["$evidence", "$schema"];

/// The fixed attribute record notarized for a credential.
///
/// Field names serialize to the schema's property names; see
/// [`credential_schema`](crate::schema::credential_schema).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialAttributes {
    /// Identifier of the qualification (the achievement id).
    pub identifier: Option<String>,
    /// Name of the asset.
    pub name: Option<String>,
    /// Official title of the qualification.
    pub title: Option<String>,
    /// Detailed description of the asset.
    pub description: Option<String>,
    /// Short description of the qualification.
    pub definition: Option<String>,
    /// ISO 639-1 code of the qualification language.
    pub ref_language: Option<String>,
    /// Alternative name of the qualification.
    pub alt_label: Option<String>,
    /// Full learning outcome description.
    pub learning_outcome_desc: Option<String>,
    /// Field of Education and Training Code.
    pub field: Option<String>,
    /// European Qualification Framework level.
    #[serde(rename = "EQFLevel")]
    pub eqf_level: Option<String>,
    /// National/Regional Qualification Framework level.
    #[serde(rename = "NQFLevel")]
    pub nqf_level: Option<String>,
    /// Name of the credit system in use.
    pub credit_system: Option<String>,
    /// Official title of the credit system.
    pub credit_sys_title: Option<String>,
    /// Short description of the credit system.
    pub credit_sys_def: Option<String>,
    /// Value in hours/certificates/accomplishments.
    pub credit_sys_value: Option<String>,
    /// Who regulates issuance under the credit system.
    pub credit_sys_issuer: Option<String>,
    /// Credential types usable to build this system.
    pub can_consist_of: Option<String>,
    /// Credit system reference number.
    pub credit_sys_ref_num: Option<String>,
    /// Credit points under the declared system.
    pub num_credit_points: Option<i64>,
    /// Credit points under ECTS.
    #[serde(rename = "ECTSCreditPoints")]
    pub ects_credit_points: Option<i64>,
    /// Notional learning hours.
    pub volume_of_learning: Option<String>,
    /// Whether this is a partial qualification.
    pub is_partial_qual: Option<bool>,
    /// Prerequisite credentials by unique identifier.
    pub consists_of: Option<String>,
    /// Ways the qualification can be acquired.
    pub ways_to_acquire: Option<String>,
    /// Educational credential type.
    pub edu_cred_type: Option<String>,
    /// Entry requirements.
    pub entry_req: Option<String>,
    /// Learning outcome identifiers.
    pub learning_outcome: Option<String>,
    /// Related occupations.
    pub related_occupation: Option<String>,
    /// Formal recognition information.
    pub recognition: Option<String>,
    /// Profile that awarded the credential.
    pub awarding_body: Option<String>,
    /// Activity through which the award was obtained.
    pub awarding_activity: Option<String>,
    /// Method of awarding.
    pub awarding_method: Option<String>,
    /// Grading scheme description.
    pub grade_scheme: Option<String>,
    /// Mode of study.
    pub mode_of_study: Option<String>,
    /// Issuer public key.
    pub public_key: Option<String>,
    /// Assessment method description.
    pub assessment_method: Option<String>,
    /// Accreditation information.
    pub accreditation: Option<String>,
    /// Issuer home page.
    pub home_page: Option<String>,
    /// Qualification landing page.
    pub landing_page: Option<String>,
    /// Supplementary documents.
    pub suppl_doc: Option<String>,
    /// When the credential was issued.
    pub date_issued: Option<String>,
    /// When the credential was last modified.
    pub date_modified: Option<String>,
    /// Note about a modification.
    pub change_note: Option<String>,
    /// Historical note.
    pub history_note: Option<String>,
    /// Additional notes.
    pub additional_note: Option<String>,
    /// Qualification status.
    pub status: Option<String>,
    /// Qualification this one replaces.
    pub replaces: Option<String>,
    /// Qualification replacing this one.
    pub replaced_by: Option<String>,
    /// Owner of the qualification definition.
    pub owner: Option<String>,
    /// Creator of the qualification definition.
    pub creator: Option<String>,
    /// Publisher of the qualification definition.
    pub publisher: Option<String>,
    /// Name of the credential holder.
    pub holder: Option<String>,
    /// Holder date of birth.
    pub date_of_birth: Option<String>,
    /// Holder identifier at the platform.
    pub student_id: Option<String>,
    /// Grade achieved.
    pub grade: Option<String>,
    /// Number of credits awarded.
    pub credits_awarded: Option<i64>,
    /// Unique identifier of the credential instance.
    pub unique_id: Option<String>,
    /// Name of the awarded credential.
    pub credential: Option<String>,
    /// When the credential expires.
    pub expiry_period: Option<String>,
    /// Methods used for cheating prevention.
    pub cheating: Option<String>,
    /// URI of the evidence JSON. Stripped after imprinting.
    #[serde(rename = "$evidence")]
    pub evidence_url: Option<String>,
    /// URI of the schema definition. Stripped after imprinting.
    #[serde(rename = "$schema")]
    pub schema_url: Option<String>,
}

impl CredentialAttributes {
    /// Serialize the record to a JSON object with every schema attribute
    /// present (absent values as `null`).
    pub fn to_metadata(&self) -> Result<Value, serde_json::Error> {
        // serde produces nulls for None because no field skips serialization.
        serde_json::to_value(self)
    }
}

/// Remove the transient `$evidence`/`$schema` entries from a stored
/// metadata object.
pub fn strip_transient(metadata: &mut Value) {
    if let Value::Object(map) = metadata {
        for field in TRANSIENT_FIELDS {
            map.remove(field);
        }
    }
}

/// Produce the public view of stored metadata: grading and PII fields
/// removed.
pub fn redact_public_view(metadata: &Value) -> Value {
    let mut public = metadata.clone();
    if let Value::Object(map) = &mut public {
        for field in REDACTED_METADATA_FIELDS {
            map.remove(field);
        }
    }
    public
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SCHEMA_FIELD_ORDER;

    #[test]
    fn metadata_contains_every_schema_attribute() {
        let metadata = CredentialAttributes::default().to_metadata().unwrap();
        let map = metadata.as_object().unwrap();
        for name in SCHEMA_FIELD_ORDER {
            assert!(map.contains_key(name), "metadata missing: {name}");
        }
        assert_eq!(map.len(), SCHEMA_FIELD_ORDER.len());
    }

    #[test]
    fn absent_values_serialize_as_null() {
        let metadata = CredentialAttributes::default().to_metadata().unwrap();
        assert!(metadata["holder"].is_null());
        assert!(metadata["EQFLevel"].is_null());
    }

    #[test]
    fn strip_transient_removes_both_urls() {
        let mut metadata = CredentialAttributes {
            evidence_url: Some("https://api.example.org/credentials/1/evidence".into()),
            schema_url: Some("https://api.example.org/credentials/schema".into()),
            ..Default::default()
        }
        .to_metadata()
        .unwrap();
        strip_transient(&mut metadata);
        let map = metadata.as_object().unwrap();
        assert!(!map.contains_key("$evidence"));
        assert!(!map.contains_key("$schema"));
    }

    #[test]
    fn public_view_redacts_pii_and_grading() {
        let metadata = CredentialAttributes {
            holder: Some("Ada Lovelace".into()),
            grade: Some("A".into()),
            credits_awarded: Some(6),
            title: Some("Applied Cryptography".into()),
            ..Default::default()
        }
        .to_metadata()
        .unwrap();

        let public = redact_public_view(&metadata);
        let map = public.as_object().unwrap();
        for field in REDACTED_METADATA_FIELDS {
            assert!(!map.contains_key(field), "should be redacted: {field}");
        }
        assert_eq!(public["title"], "Applied Cryptography");
    }
}
