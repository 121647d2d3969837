//! # Credential Issuance Engine
//!
//! The action surface of the credential lifecycle. Every handler follows
//! the same shape: authenticate, authorize, run the stage guard, then
//! commit the transition through an atomic guarded write on the credential
//! document — so a stale actor's guard fails against whatever another
//! transition already committed.
//!
//! ## Endpoints
//!
//! - `POST /profile/credentials` — self-request (REQUEST stage).
//! - `POST /credentials` — direct grant (PENDING stage).
//! - `POST /credentials/:id/complete` — finalize: notarize, submit the
//!   ledger order, move to ISSUING.
//! - `POST /credentials/:id/reject` — REQUEST → REJECTED.
//! - `POST /credentials/:id/fail` — any non-terminal → FAILED.
//! - `POST /profile/credentials/:id/cancel` — REQUEST → CANCELED.
//! - `DELETE /credentials/:id` — soft delete (refused for COMPLETED).
//! - `GET /profile/credentials` — the caller's credentials.
//! - `GET /credentials/:id/metadata` — public redacted view, once COMPLETED.
//! - `GET /credentials/:id/evidence` — notarization evidence, once COMPLETED.
//! - `GET /credentials/schema` — the metadata schema document.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;

use credo_auth::ProfileAbilityKind;
use credo_core::{AchievementId, CredentialId, ProfileId};
use credo_notary::{redact_public_view, strip_transient, CredentialAttributes, Notary};
use credo_state::{dependencies_satisfied, CredentialStage, TransitionError};

use crate::auth::{require_authenticated, require_profile_permission, Caller};
use crate::error::{AppError, FieldError};
use crate::extractors::{extract_json, Page};
use crate::state::{AppState, CredentialRecord, ProfileRecord};

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Body for the self-request endpoint.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RequestCredentialBody {
    /// The achievement being requested.
    #[schema(value_type = String)]
    pub achievement_id: AchievementId,
}

/// Body for the direct-grant endpoint.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCredentialBody {
    /// The receiving profile.
    #[schema(value_type = String)]
    pub profile_id: ProfileId,
    /// The achievement being granted.
    #[schema(value_type = String)]
    pub achievement_id: AchievementId,
}

/// Optional grading inputs applied with finalization.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CompleteCredentialBody {
    /// Grade achieved.
    pub grade: Option<String>,
    /// Credits awarded.
    pub credits_awarded: Option<i64>,
    /// Credential expiry.
    pub expiry_period: Option<DateTime<Utc>>,
    /// Cheating-prevention description.
    pub cheating: Option<String>,
}

/// Optional note attached on rejection.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RejectCredentialBody {
    /// Reason communicated to the requester.
    pub note: Option<String>,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the credentials router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile/credentials", post(request_credential).get(list_profile_credentials))
        .route("/profile/credentials/:id/cancel", post(cancel_credential_request))
        .route("/credentials", post(create_credential))
        .route("/credentials/:id/complete", post(complete_credential))
        .route("/credentials/:id/reject", post(reject_credential))
        .route("/credentials/:id/fail", post(fail_credential))
        .route("/credentials/:id", delete(delete_credential))
        .route("/credentials/:id/metadata", get(credential_metadata))
        .route("/credentials/:id/evidence", get(credential_evidence))
        .route("/credentials/schema", get(credential_schema))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn fetch_credential(state: &AppState, id: CredentialId) -> Result<CredentialRecord, AppError> {
    state
        .credentials
        .get(&id)
        .filter(CredentialRecord::is_persistent)
        .ok_or_else(|| AppError::NotFound(format!("credential {id} does not exist")))
}

fn wallet_of(profile: &ProfileRecord) -> Result<credo_core::WalletAddress, AppError> {
    profile.wallet.clone().ok_or_else(|| {
        AppError::ValidationFields(vec![FieldError::new("wallet", "PROFILE_WALLET_NOT_LINKED")])
    })
}

/// Create a credential document binding the profile to snapshots of the
/// achievement and its community.
fn new_credential(
    state: &AppState,
    profile: &ProfileRecord,
    achievement_id: AchievementId,
    stage: CredentialStage,
) -> Result<CredentialRecord, AppError> {
    let achievement = state
        .achievements
        .get(&achievement_id)
        .filter(|a| a.is_persistent())
        .ok_or_else(|| AppError::NotFound(format!("achievement {achievement_id} does not exist")))?;
    let community = state
        .communities
        .get(&achievement.community_id)
        .filter(|c| c.is_persistent())
        .ok_or_else(|| {
            AppError::NotFound(format!("community {} does not exist", achievement.community_id))
        })?;
    let wallet = wallet_of(profile)?;

    let now = Utc::now();
    Ok(CredentialRecord {
        id: CredentialId::new(),
        profile_id: profile.id,
        achievement,
        community: community.snapshot(),
        stage,
        wallet,
        note: None,
        grade: None,
        awarding_body_id: None,
        credits_awarded: None,
        expiry_period: None,
        cheating: None,
        order_ref: None,
        metadata: None,
        evidence: None,
        tx_hash: None,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    })
}

/// The asset identifier anchored on the ledger for a credential.
fn asset_id_hex(id: CredentialId) -> String {
    format!("0x{}", id.as_uuid().simple())
}

fn join_ids(ids: &[AchievementId]) -> Option<String> {
    if ids.is_empty() {
        None
    } else {
        Some(
            ids.iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(","),
        )
    }
}

/// Assemble the fixed attribute record from the achievement snapshot, the
/// holder profile, and the credential itself.
fn compose_attributes(
    credential: &CredentialRecord,
    holder: &ProfileRecord,
    base_url: &str,
) -> CredentialAttributes {
    let achievement = &credential.achievement;
    let details = &achievement.details;

    CredentialAttributes {
        identifier: Some(achievement.id.to_string()),
        name: Some(achievement.name.clone()),
        title: Some(achievement.name.clone()),
        description: details.definition.clone(),
        definition: details.definition.clone(),
        ref_language: details.ref_language.clone(),
        alt_label: details.alt_label.clone(),
        learning_outcome_desc: details.learning_outcome_desc.clone(),
        field: details.field.clone(),
        eqf_level: details.eqf_level.clone(),
        nqf_level: details.nqf_level.clone(),
        credit_system: details.credit_system.clone(),
        credit_sys_title: details.credit_sys_title.clone(),
        credit_sys_def: details.credit_sys_def.clone(),
        credit_sys_value: details.credit_sys_value.clone(),
        credit_sys_issuer: details.credit_sys_issuer.clone(),
        can_consist_of: join_ids(&achievement.can_consist_of_ids),
        credit_sys_ref_num: details.credit_sys_ref_num.clone(),
        num_credit_points: details.num_credit_points,
        ects_credit_points: details.ects_credit_points,
        volume_of_learning: details.volume_of_learning.clone(),
        is_partial_qual: details.is_partial_qual,
        consists_of: join_ids(&achievement.dependent_achievement_ids),
        ways_to_acquire: details.ways_to_acquire.clone(),
        edu_cred_type: details.edu_cred_type.clone(),
        entry_req: details.entry_req.clone(),
        learning_outcome: details.learning_outcome.clone(),
        related_occupation: details.related_occupation.clone(),
        recognition: details.recognition.clone(),
        awarding_body: credential.awarding_body_id.map(|id| id.to_string()),
        awarding_activity: details.awarding_activity.clone(),
        awarding_method: details.awarding_method.clone(),
        grade_scheme: details.grade_scheme.clone(),
        mode_of_study: details.mode_of_study.clone(),
        public_key: details.public_key.clone(),
        assessment_method: details.assessment_method.clone(),
        accreditation: details.accreditation.clone(),
        home_page: details.home_page.clone(),
        landing_page: details.landing_page.clone(),
        suppl_doc: details.suppl_doc.clone(),
        date_issued: Some(credential.created_at.to_rfc3339()),
        date_modified: Some(credential.created_at.to_rfc3339()),
        change_note: None,
        history_note: details.history_note.clone(),
        additional_note: details.additional_note.clone(),
        status: details.status.clone(),
        replaces: details.replaces_id.map(|id| id.to_string()),
        replaced_by: details.replaced_by_id.map(|id| id.to_string()),
        owner: details.owner.clone(),
        creator: details.creator.clone(),
        publisher: details.publisher.clone(),
        holder: Some(holder.display_name()),
        date_of_birth: None,
        student_id: Some(holder.id.to_string()),
        grade: credential.grade.clone(),
        credits_awarded: credential.credits_awarded,
        unique_id: Some(credential.id.to_string()),
        credential: Some(achievement.name.clone()),
        expiry_period: credential.expiry_period.map(|d| d.to_rfc3339()),
        cheating: credential.cheating.clone(),
        evidence_url: Some(format!("{base_url}/credentials/{}/evidence", credential.id)),
        schema_url: Some(format!("{base_url}/credentials/schema")),
    }
}

// ---------------------------------------------------------------------------
// Handlers — lifecycle entry points
// ---------------------------------------------------------------------------

/// POST /profile/credentials — self-request a credential.
///
/// Creates a REQUEST-stage credential for the caller. Refused when a
/// non-deleted REQUEST already exists for the same (profile, achievement)
/// pair.
#[utoipa::path(
    post,
    path = "/profile/credentials",
    request_body = RequestCredentialBody,
    responses(
        (status = 201, description = "Credential request created", body = CredentialRecord),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorBody),
        (status = 403, description = "Missing REQUEST_CREDENTIAL ability", body = crate::error::ErrorBody),
        (status = 409, description = "Open request already exists", body = crate::error::ErrorBody),
    ),
    tag = "credentials"
)]
pub(crate) async fn request_credential(
    State(state): State<AppState>,
    Caller(actor): Caller,
    body: Result<Json<RequestCredentialBody>, JsonRejection>,
) -> Result<(StatusCode, Json<CredentialRecord>), AppError> {
    let req = extract_json(body)?;
    let profile_id = require_authenticated(&actor)?;
    require_profile_permission(&actor, ProfileAbilityKind::RequestCredential)?;

    let profile = state
        .profiles
        .get(&profile_id)
        .filter(ProfileRecord::is_persistent)
        .ok_or_else(|| AppError::NotFound(format!("profile {profile_id} does not exist")))?;

    if state.has_open_request(profile_id, req.achievement_id) {
        return Err(AppError::Conflict(
            "an open credential request already exists for this achievement".into(),
        ));
    }

    let credential = new_credential(&state, &profile, req.achievement_id, CredentialStage::Request)?;
    state.credentials.insert(credential.id, credential.clone());
    tracing::info!(credential_id = %credential.id, profile_id = %profile_id, "credential requested");
    Ok((StatusCode::CREATED, Json(credential)))
}

/// POST /credentials — directly grant a credential to a named profile.
#[utoipa::path(
    post,
    path = "/credentials",
    request_body = CreateCredentialBody,
    responses(
        (status = 201, description = "Credential created in PENDING stage", body = CredentialRecord),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorBody),
        (status = 403, description = "Missing CREATE_CREDENTIAL ability", body = crate::error::ErrorBody),
        (status = 404, description = "Profile or achievement not found", body = crate::error::ErrorBody),
    ),
    tag = "credentials"
)]
pub(crate) async fn create_credential(
    State(state): State<AppState>,
    Caller(actor): Caller,
    body: Result<Json<CreateCredentialBody>, JsonRejection>,
) -> Result<(StatusCode, Json<CredentialRecord>), AppError> {
    let req = extract_json(body)?;
    require_authenticated(&actor)?;
    require_profile_permission(&actor, ProfileAbilityKind::CreateCredential)?;

    let profile = state
        .profiles
        .get(&req.profile_id)
        .filter(ProfileRecord::is_persistent)
        .ok_or_else(|| AppError::NotFound(format!("profile {} does not exist", req.profile_id)))?;

    let credential = new_credential(&state, &profile, req.achievement_id, CredentialStage::Pending)?;
    state.credentials.insert(credential.id, credential.clone());
    tracing::info!(credential_id = %credential.id, profile_id = %profile.id, "credential granted");
    Ok((StatusCode::CREATED, Json(credential)))
}

/// POST /credentials/:id/complete — finalize a credential.
///
/// PENDING | ISSUING_FAILED → ISSUING. Validates dependency satisfaction,
/// notarizes the attribute record, submits the ledger order, and only then
/// commits the stage under the atomic guarded write. A ledger failure
/// surfaces as a system error with the stage untouched.
#[utoipa::path(
    post,
    path = "/credentials/{id}/complete",
    params(("id" = String, Path, description = "Credential ID")),
    request_body = CompleteCredentialBody,
    responses(
        (status = 200, description = "Ledger order submitted; credential ISSUING", body = CredentialRecord),
        (status = 403, description = "Missing ability or stage guard failed", body = crate::error::ErrorBody),
        (status = 422, description = "Dependencies not satisfied", body = crate::error::ErrorBody),
        (status = 502, description = "Ledger unavailable", body = crate::error::ErrorBody),
    ),
    tag = "credentials"
)]
pub(crate) async fn complete_credential(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<CredentialId>,
    body: Result<Json<CompleteCredentialBody>, JsonRejection>,
) -> Result<Json<CredentialRecord>, AppError> {
    // An absent body is treated as "no grading inputs".
    let inputs = body.map(|Json(v)| v).unwrap_or_default();

    let finalizer = require_authenticated(&actor)?;
    let credential = fetch_credential(&state, id)?;
    require_profile_permission(&actor, ProfileAbilityKind::FinaliseCredential)?;

    // Fast-fail the stage guard before any I/O; it is re-checked under the
    // write lock when committing.
    credential.stage.finalize()?;

    let holder = state
        .profiles
        .get(&credential.profile_id)
        .filter(ProfileRecord::is_persistent)
        .ok_or_else(|| {
            AppError::NotFound(format!("profile {} does not exist", credential.profile_id))
        })?;
    wallet_of(&holder)?;
    // The asset receiver is the wallet snapshotted when the credential was
    // created, not the holder's current one.
    let receiver = credential.wallet.clone();

    let completed = state.completed_achievement_ids(credential.profile_id);
    if !dependencies_satisfied(&credential.achievement.dependent_achievement_ids, completed) {
        return Err(AppError::ValidationFields(vec![FieldError::new(
            "achievement",
            "CREDENTIAL_CONDITIONS_NOT_MET",
        )]));
    }

    // Notarize over the record as it will be committed: grading inputs and
    // the finalizing actor applied.
    let mut working = credential.clone();
    working.grade = inputs.grade.clone().or(working.grade);
    working.credits_awarded = inputs.credits_awarded.or(working.credits_awarded);
    working.expiry_period = inputs.expiry_period.or(working.expiry_period);
    working.cheating = inputs.cheating.clone().or(working.cheating);
    working.awarding_body_id = Some(finalizer);

    let attributes = compose_attributes(&working, &holder, &state.config.public_base_url);
    let mut metadata = attributes
        .to_metadata()
        .map_err(|e| AppError::Internal(format!("attribute serialization failed: {e}")))?;
    let evidence = Notary.notarize(&metadata)?;
    let evidence_json = serde_json::to_string(&evidence)
        .map_err(|e| AppError::Internal(format!("evidence serialization failed: {e}")))?;

    let gateway = state
        .ledger
        .clone()
        .ok_or_else(|| AppError::System("ledger gateway not configured".into()))?;

    // Suspension point: the order is submitted before the stage is written,
    // and a submission failure leaves the credential in its pre-call stage.
    let receipt = gateway
        .submit_asset_creation(&asset_id_hex(id), &receiver, &evidence.imprint)
        .await?;

    strip_transient(&mut metadata);

    let updated = state
        .credentials
        .try_update(&id, |c| {
            let next = c.stage.finalize()?;
            c.stage = next;
            c.grade = working.grade.clone();
            c.credits_awarded = working.credits_awarded;
            c.expiry_period = working.expiry_period;
            c.cheating = working.cheating.clone();
            c.awarding_body_id = Some(finalizer);
            c.order_ref = Some(receipt.order_ref);
            c.metadata = Some(metadata.clone());
            c.evidence = Some(evidence_json.clone());
            c.updated_at = Utc::now();
            Ok::<_, TransitionError>(c.clone())
        })
        .ok_or_else(|| AppError::NotFound(format!("credential {id} does not exist")))?
        .map_err(AppError::from)?;

    tracing::info!(credential_id = %id, order_ref = %receipt.order_ref, "credential issuing");
    Ok(Json(updated))
}

/// POST /credentials/:id/reject — reject a credential request.
#[utoipa::path(
    post,
    path = "/credentials/{id}/reject",
    params(("id" = String, Path, description = "Credential ID")),
    request_body = RejectCredentialBody,
    responses(
        (status = 200, description = "Request rejected", body = CredentialRecord),
        (status = 403, description = "Missing ability or stage guard failed", body = crate::error::ErrorBody),
        (status = 404, description = "Credential not found", body = crate::error::ErrorBody),
    ),
    tag = "credentials"
)]
pub(crate) async fn reject_credential(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<CredentialId>,
    body: Result<Json<RejectCredentialBody>, JsonRejection>,
) -> Result<Json<CredentialRecord>, AppError> {
    let inputs = body.map(|Json(v)| v).unwrap_or_default();
    require_authenticated(&actor)?;
    fetch_credential(&state, id)?;
    require_profile_permission(&actor, ProfileAbilityKind::ManageRequestCredential)?;

    let updated = state
        .credentials
        .try_update(&id, |c| {
            let next = c.stage.reject()?;
            c.stage = next;
            if let Some(note) = inputs.note.clone() {
                c.note = Some(note);
            }
            c.updated_at = Utc::now();
            Ok::<_, TransitionError>(c.clone())
        })
        .ok_or_else(|| AppError::NotFound(format!("credential {id} does not exist")))?
        .map_err(AppError::from)?;

    Ok(Json(updated))
}

/// POST /credentials/:id/fail — administratively fail a credential.
#[utoipa::path(
    post,
    path = "/credentials/{id}/fail",
    params(("id" = String, Path, description = "Credential ID")),
    responses(
        (status = 200, description = "Credential failed", body = CredentialRecord),
        (status = 403, description = "Missing ability or stage already terminal", body = crate::error::ErrorBody),
    ),
    tag = "credentials"
)]
pub(crate) async fn fail_credential(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<CredentialId>,
) -> Result<Json<CredentialRecord>, AppError> {
    require_authenticated(&actor)?;
    fetch_credential(&state, id)?;
    require_profile_permission(&actor, ProfileAbilityKind::FinaliseCredential)?;

    let updated = state
        .credentials
        .try_update(&id, |c| {
            let next = c.stage.fail()?;
            c.stage = next;
            c.updated_at = Utc::now();
            Ok::<_, TransitionError>(c.clone())
        })
        .ok_or_else(|| AppError::NotFound(format!("credential {id} does not exist")))?
        .map_err(AppError::from)?;

    Ok(Json(updated))
}

/// POST /profile/credentials/:id/cancel — withdraw an own request.
#[utoipa::path(
    post,
    path = "/profile/credentials/{id}/cancel",
    params(("id" = String, Path, description = "Credential ID")),
    responses(
        (status = 200, description = "Request canceled", body = CredentialRecord),
        (status = 403, description = "Not the requester or stage guard failed", body = crate::error::ErrorBody),
    ),
    tag = "credentials"
)]
pub(crate) async fn cancel_credential_request(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<CredentialId>,
) -> Result<Json<CredentialRecord>, AppError> {
    require_authenticated(&actor)?;
    let credential = fetch_credential(&state, id)?;

    if !actor.is_authenticated_as(credential.profile_id) {
        return Err(AppError::Unauthorized(
            "only the requesting profile may cancel".into(),
        ));
    }

    let updated = state
        .credentials
        .try_update(&id, |c| {
            let next = c.stage.cancel()?;
            c.stage = next;
            c.updated_at = Utc::now();
            Ok::<_, TransitionError>(c.clone())
        })
        .ok_or_else(|| AppError::NotFound(format!("credential {id} does not exist")))?
        .map_err(AppError::from)?;

    Ok(Json(updated))
}

/// DELETE /credentials/:id — soft-delete a credential.
///
/// A credential in COMPLETED stage may never be deleted.
#[utoipa::path(
    delete,
    path = "/credentials/{id}",
    params(("id" = String, Path, description = "Credential ID")),
    responses(
        (status = 200, description = "Credential soft-deleted", body = CredentialRecord),
        (status = 403, description = "Missing ability or credential is COMPLETED", body = crate::error::ErrorBody),
    ),
    tag = "credentials"
)]
pub(crate) async fn delete_credential(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<CredentialId>,
) -> Result<Json<CredentialRecord>, AppError> {
    require_authenticated(&actor)?;
    fetch_credential(&state, id)?;
    require_profile_permission(&actor, ProfileAbilityKind::DeleteCredential)?;

    let updated = state
        .credentials
        .try_update(&id, |c| {
            if c.stage == CredentialStage::Completed {
                return Err(AppError::Unauthorized(
                    "credential in COMPLETED stage cannot be deleted".into(),
                ));
            }
            c.deleted_at = Some(Utc::now());
            c.updated_at = Utc::now();
            Ok(c.clone())
        })
        .ok_or_else(|| AppError::NotFound(format!("credential {id} does not exist")))??;

    Ok(Json(updated))
}

// ---------------------------------------------------------------------------
// Handlers — reads
// ---------------------------------------------------------------------------

/// GET /profile/credentials — the caller's credentials, paged.
#[utoipa::path(
    get,
    path = "/profile/credentials",
    params(Page),
    responses(
        (status = 200, description = "The caller's credentials", body = Vec<CredentialRecord>),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorBody),
    ),
    tag = "credentials"
)]
pub(crate) async fn list_profile_credentials(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Query(page): Query<Page>,
) -> Result<Json<Vec<CredentialRecord>>, AppError> {
    let profile_id = require_authenticated(&actor)?;
    let mut credentials = state
        .credentials
        .filter(|c| c.is_persistent() && c.profile_id == profile_id);
    credentials.sort_by_key(|c| c.created_at);
    Ok(Json(page.apply(credentials)))
}

/// Fetch a credential that is persistent and COMPLETED, as required by the
/// public notarization reads.
fn fetch_completed(state: &AppState, id: CredentialId) -> Result<CredentialRecord, AppError> {
    state
        .credentials
        .get(&id)
        .filter(|c| c.is_persistent() && c.stage == CredentialStage::Completed)
        .ok_or_else(|| AppError::NotFound(format!("credential {id} does not exist")))
}

/// GET /credentials/:id/metadata — public metadata view.
///
/// Available once COMPLETED. Grading and PII fields are redacted; the
/// transient `$evidence`/`$schema` links are re-attached from the public
/// base URL.
#[utoipa::path(
    get,
    path = "/credentials/{id}/metadata",
    params(("id" = String, Path, description = "Credential ID")),
    responses(
        (status = 200, description = "Redacted metadata"),
        (status = 404, description = "Credential missing or not COMPLETED", body = crate::error::ErrorBody),
    ),
    tag = "credentials"
)]
pub(crate) async fn credential_metadata(
    State(state): State<AppState>,
    Path(id): Path<CredentialId>,
) -> Result<Json<serde_json::Value>, AppError> {
    let credential = fetch_completed(&state, id)?;
    let stored = credential
        .metadata
        .ok_or_else(|| AppError::NotFound(format!("credential {id} has no metadata")))?;

    let mut public = redact_public_view(&stored);
    let base_url = &state.config.public_base_url;
    public["$evidence"] = serde_json::json!(format!("{base_url}/credentials/{id}/evidence"));
    public["$schema"] = serde_json::json!(format!("{base_url}/credentials/schema"));
    Ok(Json(public))
}

/// GET /credentials/:id/evidence — notarization evidence.
#[utoipa::path(
    get,
    path = "/credentials/{id}/evidence",
    params(("id" = String, Path, description = "Credential ID")),
    responses(
        (status = 200, description = "Evidence document"),
        (status = 404, description = "Credential missing or not COMPLETED", body = crate::error::ErrorBody),
    ),
    tag = "credentials"
)]
pub(crate) async fn credential_evidence(
    State(state): State<AppState>,
    Path(id): Path<CredentialId>,
) -> Result<Json<serde_json::Value>, AppError> {
    let credential = fetch_completed(&state, id)?;
    let raw = credential
        .evidence
        .ok_or_else(|| AppError::NotFound(format!("credential {id} has no evidence")))?;
    let evidence: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|e| AppError::Internal(format!("stored evidence unreadable: {e}")))?;
    Ok(Json(evidence))
}

/// GET /credentials/schema — the metadata schema document.
#[utoipa::path(
    get,
    path = "/credentials/schema",
    responses((status = 200, description = "The credential metadata JSON Schema")),
    tag = "credentials"
)]
pub(crate) async fn credential_schema() -> Json<serde_json::Value> {
    Json(credo_notary::credential_schema())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
