//! # Profile Routes
//!
//! Signup, wallet linking, and soft deletion. Password hashing and email
//! delivery are external boundaries — signup stores an optional opaque
//! hash and never computes one.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;

use credo_auth::{ProfileAbility, ProfileAbilityKind};
use credo_core::{ProfileId, WalletAddress};

use crate::auth::{require_authenticated, require_profile_permission, Caller};
use crate::error::AppError;
use crate::extractors::{extract_validated_json, extract_json, Validate};
use crate::state::{AppState, ProfileRecord};

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Signup body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProfileBody {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Email address, unique among persistent profiles.
    pub email: String,
    /// Opaque password hash from the external credential boundary.
    #[serde(default)]
    pub password_hash: Option<String>,
    /// Optional wallet to link immediately.
    #[serde(default)]
    pub wallet: Option<String>,
}

impl Validate for CreateProfileBody {
    fn validate(&self) -> Result<(), String> {
        if self.first_name.trim().is_empty() {
            return Err("first_name must not be empty".into());
        }
        if self.last_name.trim().is_empty() {
            return Err("last_name must not be empty".into());
        }
        if !self.email.contains('@') {
            return Err(format!("invalid email address: \"{}\"", self.email));
        }
        Ok(())
    }
}

/// Wallet-linking body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateWalletBody {
    /// The wallet address to link.
    pub address: String,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the profiles router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profiles", post(create_profile))
        .route("/profiles/:id", delete(delete_profile))
        .route("/profile/wallet", put(update_wallet))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /profiles — open signup.
///
/// Grants the baseline ability set; administrative abilities are granted
/// later through administrative routes.
#[utoipa::path(
    post,
    path = "/profiles",
    request_body = CreateProfileBody,
    responses(
        (status = 201, description = "Profile created", body = ProfileRecord),
        (status = 409, description = "Email already registered", body = crate::error::ErrorBody),
        (status = 422, description = "Validation failed", body = crate::error::ErrorBody),
    ),
    tag = "profiles"
)]
pub(crate) async fn create_profile(
    State(state): State<AppState>,
    body: Result<Json<CreateProfileBody>, JsonRejection>,
) -> Result<(StatusCode, Json<ProfileRecord>), AppError> {
    let req = extract_validated_json(body)?;

    if state.profile_by_email(&req.email).is_some() {
        return Err(AppError::Conflict(format!(
            "email {} is already registered",
            req.email
        )));
    }

    let wallet = req
        .wallet
        .map(WalletAddress::new)
        .transpose()
        .map_err(AppError::from)?;

    let now = Utc::now();
    let profile = ProfileRecord {
        id: ProfileId::new(),
        first_name: req.first_name,
        last_name: req.last_name,
        email: req.email,
        password_hash: req.password_hash,
        wallet,
        profile_abilities: ProfileAbilityKind::signup_defaults()
            .into_iter()
            .map(ProfileAbility::new)
            .collect(),
        community_abilities: Vec::new(),
        created_at: now,
        updated_at: now,
        deleted_at: None,
    };

    state.profiles.insert(profile.id, profile.clone());
    tracing::info!(profile_id = %profile.id, "profile created");
    Ok((StatusCode::CREATED, Json(profile)))
}

/// PUT /profile/wallet — link a wallet to the calling profile.
#[utoipa::path(
    put,
    path = "/profile/wallet",
    request_body = UpdateWalletBody,
    responses(
        (status = 200, description = "Wallet linked", body = ProfileRecord),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid wallet address", body = crate::error::ErrorBody),
    ),
    tag = "profiles"
)]
pub(crate) async fn update_wallet(
    State(state): State<AppState>,
    Caller(actor): Caller,
    body: Result<Json<UpdateWalletBody>, JsonRejection>,
) -> Result<Json<ProfileRecord>, AppError> {
    let req = extract_json(body)?;
    let profile_id = require_authenticated(&actor)?;
    let wallet = WalletAddress::new(req.address)?;

    let updated = state
        .profiles
        .update(&profile_id, |p| {
            p.wallet = Some(wallet.clone());
            p.updated_at = Utc::now();
        })
        .ok_or_else(|| AppError::NotFound(format!("profile {profile_id} does not exist")))?;

    Ok(Json(updated))
}

/// DELETE /profiles/:id — soft-delete a profile.
#[utoipa::path(
    delete,
    path = "/profiles/{id}",
    params(("id" = String, Path, description = "Profile ID")),
    responses(
        (status = 200, description = "Profile soft-deleted", body = ProfileRecord),
        (status = 403, description = "Missing DELETE ability", body = crate::error::ErrorBody),
        (status = 404, description = "Profile not found", body = crate::error::ErrorBody),
    ),
    tag = "profiles"
)]
pub(crate) async fn delete_profile(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<ProfileId>,
) -> Result<Json<ProfileRecord>, AppError> {
    require_authenticated(&actor)?;
    require_profile_permission(&actor, ProfileAbilityKind::Delete)?;

    state
        .profiles
        .get(&id)
        .filter(ProfileRecord::is_persistent)
        .ok_or_else(|| AppError::NotFound(format!("profile {id} does not exist")))?;

    let updated = state
        .profiles
        .update(&id, |p| {
            p.deleted_at = Some(Utc::now());
            p.updated_at = Utc::now();
        })
        .ok_or_else(|| AppError::NotFound(format!("profile {id} does not exist")))?;

    Ok(Json(updated))
}
