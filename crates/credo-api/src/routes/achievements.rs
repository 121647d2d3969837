//! # Achievement Routes
//!
//! CRUD over achievement definitions. Every save path runs the dependency
//! graph validation — a malformed prerequisite list fails the whole save
//! as a field-level validation error.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use credo_auth::CommunityAbilityKind;
use credo_core::{AchievementId, CommunityId};
use credo_state::validate_dependencies;

use crate::auth::{require_authenticated, require_community_permission, Caller};
use crate::error::AppError;
use crate::extractors::{extract_json, extract_validated_json, Page, Validate};
use crate::state::{AchievementDetails, AchievementRecord, AppState};

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Achievement creation body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAchievementBody {
    /// Qualification name.
    pub name: String,
    /// Search tags, lowercased on input.
    #[serde(default)]
    pub tag: Vec<String>,
    /// Prerequisite achievement ids.
    #[serde(default)]
    #[schema(value_type = Vec<String>)]
    pub dependent_achievement_ids: Vec<AchievementId>,
    /// Achievements whose credit systems can build this one.
    #[serde(default)]
    #[schema(value_type = Vec<String>)]
    pub can_consist_of_ids: Vec<AchievementId>,
    /// Descriptive fields used for notarization.
    #[serde(default)]
    pub details: AchievementDetails,
}

impl Validate for CreateAchievementBody {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".into());
        }
        Ok(())
    }
}

/// Achievement update body. Absent fields are left unchanged.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAchievementBody {
    /// New name, if changing.
    pub name: Option<String>,
    /// New tag list, if changing.
    pub tag: Option<Vec<String>>,
    /// New prerequisite list, if changing.
    #[schema(value_type = Option<Vec<String>>)]
    pub dependent_achievement_ids: Option<Vec<AchievementId>>,
    /// New composition list, if changing.
    #[schema(value_type = Option<Vec<String>>)]
    pub can_consist_of_ids: Option<Vec<AchievementId>>,
    /// New descriptive fields, if changing.
    pub details: Option<AchievementDetails>,
}

/// Achievement list filters.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct AchievementFilter {
    /// Case-insensitive substring match over name and tags.
    pub q: Option<String>,
    /// Restrict to one community.
    #[param(value_type = Option<String>)]
    pub community_id: Option<CommunityId>,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the achievements router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/communities/:id/achievements", post(create_achievement))
        .route(
            "/achievements/:id",
            put(update_achievement).delete(delete_achievement),
        )
        .route("/achievements", get(list_achievements))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn fetch_achievement(state: &AppState, id: AchievementId) -> Result<AchievementRecord, AppError> {
    state
        .achievements
        .get(&id)
        .filter(AchievementRecord::is_persistent)
        .ok_or_else(|| AppError::NotFound(format!("achievement {id} does not exist")))
}

/// Run the dependency-graph validation against the achievement store.
fn validate_graph(
    state: &AppState,
    own_id: AchievementId,
    dependent_ids: &[AchievementId],
) -> Result<(), AppError> {
    validate_dependencies(Some(own_id), dependent_ids, |id| {
        state
            .achievements
            .get(&id)
            .map_or(false, |a| a.is_persistent())
    })
    .map_err(AppError::from)
}

fn lowercase_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter().map(|t| t.to_lowercase()).collect()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /communities/:id/achievements — create an achievement.
#[utoipa::path(
    post,
    path = "/communities/{id}/achievements",
    params(("id" = String, Path, description = "Community ID")),
    request_body = CreateAchievementBody,
    responses(
        (status = 201, description = "Achievement created", body = AchievementRecord),
        (status = 403, description = "Missing CREATE_ACHIEVEMENT for this community", body = crate::error::ErrorBody),
        (status = 422, description = "Dependency graph validation failed", body = crate::error::ErrorBody),
    ),
    tag = "achievements"
)]
pub(crate) async fn create_achievement(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(community_id): Path<CommunityId>,
    body: Result<Json<CreateAchievementBody>, JsonRejection>,
) -> Result<(StatusCode, Json<AchievementRecord>), AppError> {
    let req = extract_validated_json(body)?;
    require_authenticated(&actor)?;
    state
        .communities
        .get(&community_id)
        .filter(|c| c.is_persistent())
        .ok_or_else(|| AppError::NotFound(format!("community {community_id} does not exist")))?;
    require_community_permission(&actor, community_id, CommunityAbilityKind::CreateAchievement)?;

    let id = AchievementId::new();
    validate_graph(&state, id, &req.dependent_achievement_ids)?;

    let now = Utc::now();
    let achievement = AchievementRecord {
        id,
        community_id,
        name: req.name,
        tag: lowercase_tags(req.tag),
        dependent_achievement_ids: req.dependent_achievement_ids,
        can_consist_of_ids: req.can_consist_of_ids,
        details: req.details,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    };
    state.achievements.insert(achievement.id, achievement.clone());
    tracing::info!(achievement_id = %achievement.id, community_id = %community_id, "achievement created");
    Ok((StatusCode::CREATED, Json(achievement)))
}

/// PUT /achievements/:id — update an achievement.
///
/// The dependency list is revalidated whether or not it changed, so a
/// reference that became stale since creation is caught on the next save.
#[utoipa::path(
    put,
    path = "/achievements/{id}",
    params(("id" = String, Path, description = "Achievement ID")),
    request_body = UpdateAchievementBody,
    responses(
        (status = 200, description = "Achievement updated", body = AchievementRecord),
        (status = 403, description = "Missing UPDATE_ACHIEVEMENT for the owning community", body = crate::error::ErrorBody),
        (status = 422, description = "Dependency graph validation failed", body = crate::error::ErrorBody),
    ),
    tag = "achievements"
)]
pub(crate) async fn update_achievement(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<AchievementId>,
    body: Result<Json<UpdateAchievementBody>, JsonRejection>,
) -> Result<Json<AchievementRecord>, AppError> {
    let req = extract_json(body)?;
    require_authenticated(&actor)?;
    let achievement = fetch_achievement(&state, id)?;
    require_community_permission(
        &actor,
        achievement.community_id,
        CommunityAbilityKind::UpdateAchievement,
    )?;

    let dependent_ids = req
        .dependent_achievement_ids
        .clone()
        .unwrap_or_else(|| achievement.dependent_achievement_ids.clone());
    validate_graph(&state, id, &dependent_ids)?;

    let updated = state
        .achievements
        .update(&id, |a| {
            if let Some(name) = req.name.clone() {
                a.name = name;
            }
            if let Some(tag) = req.tag.clone() {
                a.tag = lowercase_tags(tag);
            }
            a.dependent_achievement_ids = dependent_ids.clone();
            if let Some(can_consist_of_ids) = req.can_consist_of_ids.clone() {
                a.can_consist_of_ids = can_consist_of_ids;
            }
            if let Some(details) = req.details.clone() {
                a.details = details;
            }
            a.updated_at = Utc::now();
        })
        .ok_or_else(|| AppError::NotFound(format!("achievement {id} does not exist")))?;

    Ok(Json(updated))
}

/// DELETE /achievements/:id — soft-delete an achievement.
#[utoipa::path(
    delete,
    path = "/achievements/{id}",
    params(("id" = String, Path, description = "Achievement ID")),
    responses(
        (status = 200, description = "Achievement soft-deleted", body = AchievementRecord),
        (status = 403, description = "Missing DELETE_ACHIEVEMENT for the owning community", body = crate::error::ErrorBody),
    ),
    tag = "achievements"
)]
pub(crate) async fn delete_achievement(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<AchievementId>,
) -> Result<Json<AchievementRecord>, AppError> {
    require_authenticated(&actor)?;
    let achievement = fetch_achievement(&state, id)?;
    require_community_permission(
        &actor,
        achievement.community_id,
        CommunityAbilityKind::DeleteAchievement,
    )?;

    let updated = state
        .achievements
        .update(&id, |a| {
            a.deleted_at = Some(Utc::now());
            a.updated_at = Utc::now();
        })
        .ok_or_else(|| AppError::NotFound(format!("achievement {id} does not exist")))?;

    Ok(Json(updated))
}

/// GET /achievements — paged list with optional text search.
#[utoipa::path(
    get,
    path = "/achievements",
    params(Page, AchievementFilter),
    responses((status = 200, description = "Achievements", body = Vec<AchievementRecord>)),
    tag = "achievements"
)]
pub(crate) async fn list_achievements(
    State(state): State<AppState>,
    Query(page): Query<Page>,
    Query(filter): Query<AchievementFilter>,
) -> Json<Vec<AchievementRecord>> {
    let needle = filter.q.map(|q| q.to_lowercase());
    let mut achievements = state.achievements.filter(|a| {
        a.is_persistent()
            && filter.community_id.map_or(true, |c| a.community_id == c)
            && needle.as_ref().map_or(true, |q| {
                a.name.to_lowercase().contains(q) || a.tag.iter().any(|t| t.contains(q))
            })
    });
    achievements.sort_by_key(|a| a.created_at);
    Json(page.apply(achievements))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    use crate::testutil::{
        assert_error, bare_request, body_json, grant_community, json_request, seed_achievement,
        seed_community, seed_profile, send,
    };

    #[tokio::test]
    async fn create_with_resolvable_dependencies_succeeds() {
        let state = AppState::new();
        let community = seed_community(&state);
        let prerequisite = seed_achievement(&state, community.id, &[]);
        let author = seed_profile(&state, "author@example.org", &[]);
        grant_community(&state, author.id, community.id, &[CommunityAbilityKind::CreateAchievement]);

        let resp = send(
            &state,
            json_request(
                "POST",
                &format!("/communities/{}/achievements", community.id),
                Some(&author),
                serde_json::json!({
                    "name": "Advanced Cryptography",
                    "tag": ["Security", "CRYPTO"],
                    "dependent_achievement_ids": [prerequisite.id],
                }),
            ),
        )
        .await;

        assert_eq!(resp.status(), StatusCode::CREATED);
        let achievement: AchievementRecord = body_json(resp).await;
        assert_eq!(achievement.dependent_achievement_ids, vec![prerequisite.id]);
        // Tags are lowercased on input.
        assert_eq!(achievement.tag, vec!["security", "crypto"]);
    }

    #[tokio::test]
    async fn create_with_unresolvable_dependency_fails_closed() {
        let state = AppState::new();
        let community = seed_community(&state);
        let author = seed_profile(&state, "author@example.org", &[]);
        grant_community(&state, author.id, community.id, &[CommunityAbilityKind::CreateAchievement]);

        let resp = send(
            &state,
            json_request(
                "POST",
                &format!("/communities/{}/achievements", community.id),
                Some(&author),
                serde_json::json!({
                    "name": "Advanced Cryptography",
                    "dependent_achievement_ids": [AchievementId::new()],
                }),
            ),
        )
        .await;

        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: serde_json::Value = body_json(resp).await;
        assert_eq!(
            body["error"]["details"][0]["code"],
            "ACHIEVEMENT_DEPENDENCY_NOT_PERSISTENT"
        );
        assert!(state.achievements.count(|a| a.name == "Advanced Cryptography") == 0);
    }

    #[tokio::test]
    async fn update_making_a_self_loop_is_rejected() {
        let state = AppState::new();
        let community = seed_community(&state);
        let achievement = seed_achievement(&state, community.id, &[]);
        let author = seed_profile(&state, "author@example.org", &[]);
        grant_community(&state, author.id, community.id, &[CommunityAbilityKind::UpdateAchievement]);

        let resp = send(
            &state,
            json_request(
                "PUT",
                &format!("/achievements/{}", achievement.id),
                Some(&author),
                serde_json::json!({ "dependent_achievement_ids": [achievement.id] }),
            ),
        )
        .await;

        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: serde_json::Value = body_json(resp).await;
        assert_eq!(
            body["error"]["details"][0]["code"],
            "ACHIEVEMENT_DEPENDENCY_SELF_REFERENCE"
        );
        // The stored list is unchanged.
        assert!(state
            .achievements
            .get(&achievement.id)
            .unwrap()
            .dependent_achievement_ids
            .is_empty());
    }

    #[tokio::test]
    async fn soft_deleted_dependency_invalidates_a_later_save() {
        let state = AppState::new();
        let community = seed_community(&state);
        let prerequisite = seed_achievement(&state, community.id, &[]);
        let dependent = seed_achievement(&state, community.id, &[prerequisite.id]);
        let author = seed_profile(&state, "author@example.org", &[]);
        grant_community(&state, author.id, community.id, &[CommunityAbilityKind::UpdateAchievement]);

        state
            .achievements
            .update(&prerequisite.id, |a| a.deleted_at = Some(Utc::now()));

        // Renaming revalidates the (unchanged) dependency list.
        let resp = send(
            &state,
            json_request(
                "PUT",
                &format!("/achievements/{}", dependent.id),
                Some(&author),
                serde_json::json!({ "name": "Renamed" }),
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn update_requires_owning_community_permission() {
        let state = AppState::new();
        let home = seed_community(&state);
        let other = seed_community(&state);
        let achievement = seed_achievement(&state, home.id, &[]);
        let author = seed_profile(&state, "author@example.org", &[]);
        // Permission in the wrong community does not carry over.
        grant_community(&state, author.id, other.id, &[CommunityAbilityKind::UpdateAchievement]);

        let resp = send(
            &state,
            json_request(
                "PUT",
                &format!("/achievements/{}", achievement.id),
                Some(&author),
                serde_json::json!({ "name": "Renamed" }),
            ),
        )
        .await;
        assert_error(resp, StatusCode::FORBIDDEN, "UNAUTHORIZED").await;
    }

    #[tokio::test]
    async fn delete_soft_deletes() {
        let state = AppState::new();
        let community = seed_community(&state);
        let achievement = seed_achievement(&state, community.id, &[]);
        let author = seed_profile(&state, "author@example.org", &[]);
        grant_community(&state, author.id, community.id, &[CommunityAbilityKind::DeleteAchievement]);

        let resp = send(
            &state,
            bare_request("DELETE", &format!("/achievements/{}", achievement.id), Some(&author)),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(!state.achievements.get(&achievement.id).unwrap().is_persistent());
    }

    #[tokio::test]
    async fn list_filters_by_text_and_community() {
        let state = AppState::new();
        let a = seed_community(&state);
        let b = seed_community(&state);
        let in_a = seed_achievement(&state, a.id, &[]);
        seed_achievement(&state, b.id, &[]);

        let resp = send(
            &state,
            bare_request("GET", &format!("/achievements?community_id={}", a.id), None),
        )
        .await;
        let found: Vec<AchievementRecord> = body_json(resp).await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, in_a.id);

        let resp = send(&state, bare_request("GET", "/achievements?q=cryptography", None)).await;
        let found: Vec<AchievementRecord> = body_json(resp).await;
        assert_eq!(found.len(), 2);

        let resp = send(&state, bare_request("GET", "/achievements?q=nomatch", None)).await;
        let found: Vec<AchievementRecord> = body_json(resp).await;
        assert!(found.is_empty());
    }
}
