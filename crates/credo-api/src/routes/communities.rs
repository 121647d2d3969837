//! # Community Routes
//!
//! Community CRUD plus the two embedded collections: ability grants on
//! profiles and API keys with delegated abilities. Every embedded-
//! collection mutation targets exactly one document; the community
//! deletion cascade walks the profile store under a single write lock.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use credo_auth::{
    CommunityAbility, CommunityAbilityKind, Key, KeyAbility, KeyAbilityKind,
};
use credo_core::{AbilityId, CommunityId, KeyId, ProfileId, Timestamp};

use crate::auth::{
    require_authenticated, require_community_permission, require_profile_permission, Caller,
};
use crate::error::AppError;
use crate::extractors::{extract_json, extract_validated_json, Page, Validate};
use crate::state::{AppState, CommunityRecord, ProfileRecord};

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Community creation body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCommunityBody {
    /// Community name.
    pub name: String,
    /// Community description.
    #[serde(default)]
    pub description: String,
}

impl Validate for CreateCommunityBody {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".into());
        }
        Ok(())
    }
}

/// Community update body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCommunityBody {
    /// New name, if changing.
    pub name: Option<String>,
    /// New description, if changing.
    pub description: Option<String>,
}

/// Ability grant body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GrantAbilityBody {
    /// The receiving profile.
    #[schema(value_type = String)]
    pub profile_id: ProfileId,
    /// The ability to grant.
    pub kind: CommunityAbilityKind,
}

/// Key creation body.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateKeyBody {
    /// Optional time-to-live in seconds.
    #[serde(default)]
    pub ttl: Option<i64>,
    /// Abilities delegated to the key.
    #[serde(default)]
    pub abilities: Vec<KeyAbilityKind>,
}

/// Whole-collection replacement of a key's abilities.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReplaceKeyAbilitiesBody {
    /// The new delegated ability set.
    pub kinds: Vec<KeyAbilityKind>,
}

/// Query selecting the profile an ability operation targets.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ProfileSelector {
    /// The target profile.
    #[param(value_type = String)]
    pub profile_id: ProfileId,
}

/// Community list filters.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CommunityFilter {
    /// Case-insensitive substring match over name and description.
    pub q: Option<String>,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the communities router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/communities", post(create_community).get(list_communities))
        .route(
            "/communities/:id",
            put(update_community).delete(delete_community),
        )
        .route(
            "/communities/:id/abilities",
            post(grant_ability).get(list_abilities),
        )
        .route("/communities/:id/abilities/:ability_id", delete(revoke_ability))
        .route("/communities/:id/keys", post(create_key))
        .route("/communities/:id/keys/:key_id", delete(delete_key))
        .route(
            "/communities/:id/keys/:key_id/abilities",
            put(replace_key_abilities).get(list_key_abilities),
        )
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn fetch_community(state: &AppState, id: CommunityId) -> Result<CommunityRecord, AppError> {
    state
        .communities
        .get(&id)
        .filter(CommunityRecord::is_persistent)
        .ok_or_else(|| AppError::NotFound(format!("community {id} does not exist")))
}

fn fetch_profile(state: &AppState, id: ProfileId) -> Result<ProfileRecord, AppError> {
    state
        .profiles
        .get(&id)
        .filter(ProfileRecord::is_persistent)
        .ok_or_else(|| AppError::NotFound(format!("profile {id} does not exist")))
}

// ---------------------------------------------------------------------------
// Handlers — communities
// ---------------------------------------------------------------------------

/// POST /communities — create a community.
///
/// The creator receives the full community-scope ability set for the new
/// community.
#[utoipa::path(
    post,
    path = "/communities",
    request_body = CreateCommunityBody,
    responses(
        (status = 201, description = "Community created", body = CommunityRecord),
        (status = 403, description = "Missing CREATE_COMMUNITY ability", body = crate::error::ErrorBody),
    ),
    tag = "communities"
)]
pub(crate) async fn create_community(
    State(state): State<AppState>,
    Caller(actor): Caller,
    body: Result<Json<CreateCommunityBody>, JsonRejection>,
) -> Result<(StatusCode, Json<CommunityRecord>), AppError> {
    let req = extract_validated_json(body)?;
    let creator = require_authenticated(&actor)?;
    require_profile_permission(&actor, credo_auth::ProfileAbilityKind::CreateCommunity)?;

    let now = Utc::now();
    let community = CommunityRecord {
        id: CommunityId::new(),
        name: req.name,
        description: req.description,
        keys: Vec::new(),
        created_at: now,
        updated_at: now,
        deleted_at: None,
    };
    state.communities.insert(community.id, community.clone());

    // Push the full grant set onto the creator's document.
    let community_id = community.id;
    state.profiles.update(&creator, |p| {
        p.community_abilities.extend(
            CommunityAbilityKind::full_set()
                .into_iter()
                .map(|kind| CommunityAbility::new(community_id, kind)),
        );
        p.updated_at = Utc::now();
    });

    tracing::info!(community_id = %community.id, creator = %creator, "community created");
    Ok((StatusCode::CREATED, Json(community)))
}

/// GET /communities — paged list with optional text search.
#[utoipa::path(
    get,
    path = "/communities",
    params(Page, CommunityFilter),
    responses((status = 200, description = "Communities", body = Vec<CommunityRecord>)),
    tag = "communities"
)]
pub(crate) async fn list_communities(
    State(state): State<AppState>,
    Query(page): Query<Page>,
    Query(filter): Query<CommunityFilter>,
) -> Json<Vec<CommunityRecord>> {
    let needle = filter.q.map(|q| q.to_lowercase());
    let mut communities = state.communities.filter(|c| {
        c.is_persistent()
            && needle.as_ref().map_or(true, |q| {
                c.name.to_lowercase().contains(q) || c.description.to_lowercase().contains(q)
            })
    });
    communities.sort_by_key(|c| c.created_at);
    Json(page.apply(communities))
}

/// PUT /communities/:id — update community fields.
#[utoipa::path(
    put,
    path = "/communities/{id}",
    params(("id" = String, Path, description = "Community ID")),
    request_body = UpdateCommunityBody,
    responses(
        (status = 200, description = "Community updated", body = CommunityRecord),
        (status = 403, description = "Missing UPDATE ability for this community", body = crate::error::ErrorBody),
    ),
    tag = "communities"
)]
pub(crate) async fn update_community(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<CommunityId>,
    body: Result<Json<UpdateCommunityBody>, JsonRejection>,
) -> Result<Json<CommunityRecord>, AppError> {
    let req = extract_json(body)?;
    require_authenticated(&actor)?;
    fetch_community(&state, id)?;
    require_community_permission(&actor, id, CommunityAbilityKind::Update)?;

    let updated = state
        .communities
        .update(&id, |c| {
            if let Some(name) = req.name.clone() {
                c.name = name;
            }
            if let Some(description) = req.description.clone() {
                c.description = description;
            }
            c.updated_at = Utc::now();
        })
        .ok_or_else(|| AppError::NotFound(format!("community {id} does not exist")))?;

    Ok(Json(updated))
}

/// DELETE /communities/:id — soft-delete a community.
///
/// Cascades removal of every profile's CommunityAbility entries
/// referencing it; grants for other communities are untouched.
#[utoipa::path(
    delete,
    path = "/communities/{id}",
    params(("id" = String, Path, description = "Community ID")),
    responses(
        (status = 200, description = "Community soft-deleted", body = CommunityRecord),
        (status = 403, description = "Missing DELETE ability for this community", body = crate::error::ErrorBody),
    ),
    tag = "communities"
)]
pub(crate) async fn delete_community(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<CommunityId>,
) -> Result<Json<CommunityRecord>, AppError> {
    require_authenticated(&actor)?;
    fetch_community(&state, id)?;
    require_community_permission(&actor, id, CommunityAbilityKind::Delete)?;

    state.profiles.update_all(|p| {
        let before = p.community_abilities.len();
        p.community_abilities.retain(|a| a.community_id != id);
        if p.community_abilities.len() != before {
            p.updated_at = Utc::now();
        }
    });

    let updated = state
        .communities
        .update(&id, |c| {
            c.deleted_at = Some(Utc::now());
            c.updated_at = Utc::now();
        })
        .ok_or_else(|| AppError::NotFound(format!("community {id} does not exist")))?;

    tracing::info!(community_id = %id, "community deleted, ability cascade applied");
    Ok(Json(updated))
}

// ---------------------------------------------------------------------------
// Handlers — ability grants
// ---------------------------------------------------------------------------

/// POST /communities/:id/abilities — grant a community ability to a
/// profile.
#[utoipa::path(
    post,
    path = "/communities/{id}/abilities",
    params(("id" = String, Path, description = "Community ID")),
    request_body = GrantAbilityBody,
    responses(
        (status = 201, description = "Ability granted", body = CommunityAbility),
        (status = 403, description = "Missing CREATE_ABILITY for this community", body = crate::error::ErrorBody),
    ),
    tag = "communities"
)]
pub(crate) async fn grant_ability(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<CommunityId>,
    body: Result<Json<GrantAbilityBody>, JsonRejection>,
) -> Result<(StatusCode, Json<CommunityAbility>), AppError> {
    let req = extract_json(body)?;
    require_authenticated(&actor)?;
    fetch_community(&state, id)?;
    require_community_permission(&actor, id, CommunityAbilityKind::CreateAbility)?;
    fetch_profile(&state, req.profile_id)?;

    let ability = CommunityAbility::new(id, req.kind);
    let pushed = ability.clone();
    state.profiles.update(&req.profile_id, move |p| {
        p.community_abilities.push(pushed);
        p.updated_at = Utc::now();
    });

    Ok((StatusCode::CREATED, Json(ability)))
}

/// GET /communities/:id/abilities?profile_id= — list a profile's grants for
/// one community.
#[utoipa::path(
    get,
    path = "/communities/{id}/abilities",
    params(("id" = String, Path, description = "Community ID"), ProfileSelector),
    responses(
        (status = 200, description = "The profile's grants", body = Vec<CommunityAbility>),
        (status = 403, description = "Missing READ_ABILITY for this community", body = crate::error::ErrorBody),
    ),
    tag = "communities"
)]
pub(crate) async fn list_abilities(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<CommunityId>,
    Query(selector): Query<ProfileSelector>,
) -> Result<Json<Vec<CommunityAbility>>, AppError> {
    require_authenticated(&actor)?;
    fetch_community(&state, id)?;
    require_community_permission(&actor, id, CommunityAbilityKind::ReadAbility)?;

    let profile = fetch_profile(&state, selector.profile_id)?;
    let abilities = profile
        .community_abilities
        .into_iter()
        .filter(|a| a.community_id == id)
        .collect();
    Ok(Json(abilities))
}

/// DELETE /communities/:id/abilities/:ability_id?profile_id= — revoke one
/// grant.
#[utoipa::path(
    delete,
    path = "/communities/{id}/abilities/{ability_id}",
    params(
        ("id" = String, Path, description = "Community ID"),
        ("ability_id" = String, Path, description = "Ability record ID"),
        ProfileSelector,
    ),
    responses(
        (status = 200, description = "Ability revoked"),
        (status = 403, description = "Missing DELETE_ABILITY for this community", body = crate::error::ErrorBody),
        (status = 404, description = "Grant not found", body = crate::error::ErrorBody),
    ),
    tag = "communities"
)]
pub(crate) async fn revoke_ability(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path((id, ability_id)): Path<(CommunityId, Uuid)>,
    Query(selector): Query<ProfileSelector>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_authenticated(&actor)?;
    fetch_community(&state, id)?;
    require_community_permission(&actor, id, CommunityAbilityKind::DeleteAbility)?;
    fetch_profile(&state, selector.profile_id)?;

    let ability_id = AbilityId::from_uuid(ability_id);
    let removed = state
        .profiles
        .try_update(&selector.profile_id, |p| {
            let before = p.community_abilities.len();
            p.community_abilities
                .retain(|a| !(a.id == ability_id && a.community_id == id));
            if p.community_abilities.len() == before {
                return Err(());
            }
            p.updated_at = Utc::now();
            Ok(())
        })
        .ok_or_else(|| {
            AppError::NotFound(format!("profile {} does not exist", selector.profile_id))
        })?;

    removed.map_err(|()| AppError::NotFound(format!("ability {ability_id} does not exist")))?;
    Ok(Json(serde_json::json!({})))
}

// ---------------------------------------------------------------------------
// Handlers — API keys
// ---------------------------------------------------------------------------

/// POST /communities/:id/keys — create an API key.
///
/// The opaque key secret is generated server-side and returned once in the
/// response.
#[utoipa::path(
    post,
    path = "/communities/{id}/keys",
    params(("id" = String, Path, description = "Community ID")),
    request_body = CreateKeyBody,
    responses(
        (status = 201, description = "Key created", body = Key),
        (status = 403, description = "Missing CREATE_KEY for this community", body = crate::error::ErrorBody),
    ),
    tag = "communities"
)]
pub(crate) async fn create_key(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<CommunityId>,
    body: Result<Json<CreateKeyBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Key>), AppError> {
    let req = body.map(|Json(v)| v).unwrap_or_default();
    require_authenticated(&actor)?;
    fetch_community(&state, id)?;
    require_community_permission(&actor, id, CommunityAbilityKind::CreateKey)?;

    let key = Key {
        id: KeyId::new(),
        value: Uuid::new_v4().simple().to_string(),
        ttl: req.ttl,
        abilities: req.abilities.into_iter().map(KeyAbility::new).collect(),
        created_at: Timestamp::now(),
    };
    let stored = key.clone();
    state.communities.update(&id, move |c| {
        c.keys.push(stored);
        c.updated_at = Utc::now();
    });

    Ok((StatusCode::CREATED, Json(key)))
}

/// DELETE /communities/:id/keys/:key_id — delete an API key.
#[utoipa::path(
    delete,
    path = "/communities/{id}/keys/{key_id}",
    params(
        ("id" = String, Path, description = "Community ID"),
        ("key_id" = String, Path, description = "Key ID"),
    ),
    responses(
        (status = 200, description = "Key deleted"),
        (status = 403, description = "Missing DELETE_KEY for this community", body = crate::error::ErrorBody),
        (status = 404, description = "Key not found", body = crate::error::ErrorBody),
    ),
    tag = "communities"
)]
pub(crate) async fn delete_key(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path((id, key_id)): Path<(CommunityId, KeyId)>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_authenticated(&actor)?;
    fetch_community(&state, id)?;
    require_community_permission(&actor, id, CommunityAbilityKind::DeleteKey)?;

    let removed = state
        .communities
        .try_update(&id, |c| {
            let before = c.keys.len();
            c.keys.retain(|k| k.id != key_id);
            if c.keys.len() == before {
                return Err(());
            }
            c.updated_at = Utc::now();
            Ok(())
        })
        .ok_or_else(|| AppError::NotFound(format!("community {id} does not exist")))?;

    removed.map_err(|()| AppError::NotFound(format!("key {key_id} does not exist")))?;
    Ok(Json(serde_json::json!({})))
}

/// PUT /communities/:id/keys/:key_id/abilities — replace a key's delegated
/// ability set.
#[utoipa::path(
    put,
    path = "/communities/{id}/keys/{key_id}/abilities",
    params(
        ("id" = String, Path, description = "Community ID"),
        ("key_id" = String, Path, description = "Key ID"),
    ),
    request_body = ReplaceKeyAbilitiesBody,
    responses(
        (status = 200, description = "Ability set replaced", body = Vec<KeyAbility>),
        (status = 403, description = "Missing CREATE_KEY_ABILITY for this community", body = crate::error::ErrorBody),
        (status = 404, description = "Key not found", body = crate::error::ErrorBody),
    ),
    tag = "communities"
)]
pub(crate) async fn replace_key_abilities(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path((id, key_id)): Path<(CommunityId, KeyId)>,
    body: Result<Json<ReplaceKeyAbilitiesBody>, JsonRejection>,
) -> Result<Json<Vec<KeyAbility>>, AppError> {
    let req = extract_json(body)?;
    require_authenticated(&actor)?;
    fetch_community(&state, id)?;
    require_community_permission(&actor, id, CommunityAbilityKind::CreateKeyAbility)?;
    require_community_permission(&actor, id, CommunityAbilityKind::DeleteKeyAbility)?;

    let abilities: Vec<KeyAbility> = req.kinds.into_iter().map(KeyAbility::new).collect();
    let stored = abilities.clone();
    let replaced = state
        .communities
        .try_update(&id, move |c| {
            match c.keys.iter_mut().find(|k| k.id == key_id) {
                Some(key) => {
                    key.abilities = stored;
                    c.updated_at = Utc::now();
                    Ok(())
                }
                None => Err(()),
            }
        })
        .ok_or_else(|| AppError::NotFound(format!("community {id} does not exist")))?;

    replaced.map_err(|()| AppError::NotFound(format!("key {key_id} does not exist")))?;
    Ok(Json(abilities))
}

/// GET /communities/:id/keys/:key_id/abilities — read a key's delegated
/// abilities.
#[utoipa::path(
    get,
    path = "/communities/{id}/keys/{key_id}/abilities",
    params(
        ("id" = String, Path, description = "Community ID"),
        ("key_id" = String, Path, description = "Key ID"),
    ),
    responses(
        (status = 200, description = "The key's abilities", body = Vec<KeyAbility>),
        (status = 403, description = "Missing READ_KEY for this community", body = crate::error::ErrorBody),
    ),
    tag = "communities"
)]
pub(crate) async fn list_key_abilities(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path((id, key_id)): Path<(CommunityId, KeyId)>,
) -> Result<Json<Vec<KeyAbility>>, AppError> {
    require_authenticated(&actor)?;
    let community = fetch_community(&state, id)?;
    require_community_permission(&actor, id, CommunityAbilityKind::ReadKey)?;

    let key = community
        .keys
        .into_iter()
        .find(|k| k.id == key_id)
        .ok_or_else(|| AppError::NotFound(format!("key {key_id} does not exist")))?;
    Ok(Json(key.abilities))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
