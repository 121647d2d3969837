//! # Credential Metadata Schema
//!
//! The JSON Schema for the fixed attribute record notarized onto the
//! ledger. Served verbatim at `/credentials/schema` so verifiers can
//! interpret published metadata and evidence.
//!
//! [`SCHEMA_FIELD_ORDER`] is the canonical attribute ordering used by the
//! notary when deriving the imprint; it must list every property of the
//! schema exactly once.

use serde_json::{json, Value};

/// Canonical attribute ordering for imprint computation.
pub const SCHEMA_FIELD_ORDER: [&str; 62] = [
    "identifier",
    "name",
    "title",
    "description",
    "definition",
    "refLanguage",
    "altLabel",
    "learningOutcomeDesc",
    "field",
    "EQFLevel",
    "NQFLevel",
    "creditSystem",
    "creditSysTitle",
    "creditSysDef",
    "creditSysValue",
    "creditSysIssuer",
    "canConsistOf",
    "creditSysRefNum",
    "numCreditPoints",
    "ECTSCreditPoints",
    "volumeOfLearning",
    "isPartialQual",
    "consistsOf",
    "waysToAcquire",
    "eduCredType",
    "entryReq",
    "learningOutcome",
    "relatedOccupation",
    "recognition",
    "awardingBody",
    "awardingActivity",
    "awardingMethod",
    "gradeScheme",
    "modeOfStudy",
    "publicKey",
    "assessmentMethod",
    "accreditation",
    "homePage",
    "landingPage",
    "supplDoc",
    "dateIssued",
    "dateModified",
    "changeNote",
    "historyNote",
    "additionalNote",
    "status",
    "replaces",
    "replacedBy",
    "owner",
    "creator",
    "publisher",
    "holder",
    "dateOfBirth",
    "studentId",
    "grade",
    "creditsAwarded",
    "uniqueId",
    "credential",
    "expiryPeriod",
    "cheating",
    "$evidence",
    "$schema",
];

/// The JSON Schema document for credential metadata.
pub fn credential_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema",
        "title": "Credential Meta-Data",
        "description": "Attribute record notarized for an issued credential",
        "type": "object",
        "properties": {
            "$schema": { "description": "A path to the JSON Schema definition file", "type": "string" },
            "$evidence": { "description": "A URI pointing to the evidence JSON needed to certify this asset", "type": "string" },
            "identifier": { "description": "Identifier of the qualification", "type": "string" },
            "name": { "description": "Name of the asset", "type": "string" },
            "title": { "description": "Official title of the qualification", "type": "string" },
            "description": { "description": "Detailed description of the asset", "type": "string" },
            "definition": { "description": "Short description of the qualification", "type": "string" },
            "refLanguage": { "description": "ISO 639-1 code of the qualification language", "type": "string" },
            "altLabel": { "description": "Alternative name of the qualification", "type": "string" },
            "learningOutcomeDesc": { "description": "Full learning outcome description", "type": "string" },
            "field": { "description": "Field of Education and Training Code (ISCED FoET 2013)", "type": "string" },
            "EQFLevel": { "description": "European Qualification Framework level", "type": "string" },
            "NQFLevel": { "description": "National/Regional Qualification Framework level", "type": "string" },
            "creditSystem": { "description": "Name of the credit system in use", "type": "string" },
            "creditSysTitle": { "description": "Official title of the credit system", "type": "string" },
            "creditSysDef": { "description": "Short description of the credit system", "type": "string" },
            "creditSysValue": { "description": "Value in terms of hours/certificates/accomplishments", "type": "string" },
            "creditSysIssuer": { "description": "Who regulates issuance under this credit system", "type": "string" },
            "canConsistOf": { "description": "Credential types usable to build this system", "type": "string" },
            "creditSysRefNum": { "description": "Credit system reference number", "type": "string" },
            "numCreditPoints": { "description": "Credit points under the declared system", "type": "number" },
            "ECTSCreditPoints": { "description": "Credit points under ECTS", "type": "number" },
            "volumeOfLearning": { "description": "Notional learning hours", "type": "string" },
            "isPartialQual": { "description": "Whether this is a partial qualification", "type": "boolean" },
            "consistsOf": { "description": "Credentials making up this credential, by unique identifier", "type": "string" },
            "waysToAcquire": { "description": "Whether acquirable by formal/non-formal/informal learning", "type": "string" },
            "eduCredType": { "description": "Educational credential type", "type": "string" },
            "entryReq": { "description": "Entry requirements", "type": "string" },
            "learningOutcome": { "description": "Learning outcome identifiers", "type": "string" },
            "relatedOccupation": { "description": "Related occupations", "type": "string" },
            "recognition": { "description": "Formal recognition information", "type": "string" },
            "awardingBody": { "description": "Profile that awarded the credential", "type": "string" },
            "awardingActivity": { "description": "Activity through which the award was obtained", "type": "string" },
            "awardingMethod": { "description": "Method of awarding", "type": "string" },
            "gradeScheme": { "description": "Grading scheme description", "type": "string" },
            "modeOfStudy": { "description": "Mode of study", "type": "string" },
            "publicKey": { "description": "Issuer public key", "type": "string" },
            "assessmentMethod": { "description": "Assessment method description", "type": "string" },
            "accreditation": { "description": "Accreditation information", "type": "string" },
            "homePage": { "description": "Issuer home page", "type": "string" },
            "landingPage": { "description": "Qualification landing page", "type": "string" },
            "supplDoc": { "description": "Supplementary documents", "type": "string" },
            "dateIssued": { "description": "When the credential was issued", "type": "string" },
            "dateModified": { "description": "When the credential was last modified", "type": "string" },
            "changeNote": { "description": "Note about a modification", "type": "string" },
            "historyNote": { "description": "Historical note", "type": "string" },
            "additionalNote": { "description": "Additional notes", "type": "string" },
            "status": { "description": "Qualification status", "type": "string" },
            "replaces": { "description": "Qualification this one replaces", "type": "string" },
            "replacedBy": { "description": "Qualification replacing this one", "type": "string" },
            "owner": { "description": "Owner of the qualification definition", "type": "string" },
            "creator": { "description": "Creator of the qualification definition", "type": "string" },
            "publisher": { "description": "Publisher of the qualification definition", "type": "string" },
            "holder": { "description": "Name of the credential holder", "type": "string" },
            "dateOfBirth": { "description": "Holder date of birth", "type": "string" },
            "studentId": { "description": "Holder identifier at the platform", "type": "string" },
            "grade": { "description": "Grade achieved", "type": "string" },
            "creditsAwarded": { "description": "Number of credits awarded", "type": "number" },
            "uniqueId": { "description": "Unique identifier of the credential instance", "type": "string" },
            "credential": { "description": "Name of the awarded credential", "type": "string" },
            "expiryPeriod": { "description": "When the credential expires", "type": "string" },
            "cheating": { "description": "Methods used for cheating prevention", "type": "string" }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_order_has_no_duplicates() {
        let mut seen = std::collections::HashSet::new();
        for name in SCHEMA_FIELD_ORDER {
            assert!(seen.insert(name), "duplicate schema field: {name}");
        }
    }

    #[test]
    fn every_ordered_field_is_a_schema_property() {
        let schema = credential_schema();
        let properties = schema["properties"].as_object().unwrap();
        for name in SCHEMA_FIELD_ORDER {
            assert!(properties.contains_key(name), "schema missing: {name}");
        }
    }

    #[test]
    fn schema_declares_draft_07() {
        let schema = credential_schema();
        assert_eq!(
            schema["$schema"],
            "http://json-schema.org/draft-07/schema"
        );
    }
}
