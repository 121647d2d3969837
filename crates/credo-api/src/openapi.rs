//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Credo API — Credential Issuance Platform",
        version = "0.3.2",
        description = "Verifiable credential issuance: profiles, communities, achievements with prerequisite graphs, the credential lifecycle engine, and ledger-anchored notarization.",
        license(name = "MIT")
    ),
    paths(
        // Profiles
        crate::routes::profiles::create_profile,
        crate::routes::profiles::update_wallet,
        crate::routes::profiles::delete_profile,
        // Communities
        crate::routes::communities::create_community,
        crate::routes::communities::list_communities,
        crate::routes::communities::update_community,
        crate::routes::communities::delete_community,
        crate::routes::communities::grant_ability,
        crate::routes::communities::list_abilities,
        crate::routes::communities::revoke_ability,
        crate::routes::communities::create_key,
        crate::routes::communities::delete_key,
        crate::routes::communities::replace_key_abilities,
        crate::routes::communities::list_key_abilities,
        // Achievements
        crate::routes::achievements::create_achievement,
        crate::routes::achievements::update_achievement,
        crate::routes::achievements::delete_achievement,
        crate::routes::achievements::list_achievements,
        // Credentials
        crate::routes::credentials::request_credential,
        crate::routes::credentials::create_credential,
        crate::routes::credentials::complete_credential,
        crate::routes::credentials::reject_credential,
        crate::routes::credentials::fail_credential,
        crate::routes::credentials::cancel_credential_request,
        crate::routes::credentials::delete_credential,
        crate::routes::credentials::list_profile_credentials,
        crate::routes::credentials::credential_metadata,
        crate::routes::credentials::credential_evidence,
        crate::routes::credentials::credential_schema,
        // Webhook
        crate::routes::webhook::receive_webhook,
    ),
    components(schemas(
        // Record types
        crate::state::ProfileRecord,
        crate::state::CommunityRecord,
        crate::state::CommunitySnapshot,
        crate::state::AchievementRecord,
        crate::state::AchievementDetails,
        crate::state::CredentialRecord,
        // Capability model
        credo_auth::ProfileAbility,
        credo_auth::CommunityAbility,
        credo_auth::Key,
        credo_auth::KeyAbility,
        credo_auth::ProfileAbilityKind,
        credo_auth::CommunityAbilityKind,
        credo_auth::KeyAbilityKind,
        // Lifecycle & ledger vocabulary
        credo_state::CredentialStage,
        credo_ledger::OrderStatus,
        credo_ledger::WebhookEvent,
        credo_ledger::WebhookEventKind,
        // Error types
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::error::FieldError,
        // DTOs
        crate::routes::profiles::CreateProfileBody,
        crate::routes::profiles::UpdateWalletBody,
        crate::routes::communities::CreateCommunityBody,
        crate::routes::communities::UpdateCommunityBody,
        crate::routes::communities::GrantAbilityBody,
        crate::routes::communities::CreateKeyBody,
        crate::routes::communities::ReplaceKeyAbilitiesBody,
        crate::routes::achievements::CreateAchievementBody,
        crate::routes::achievements::UpdateAchievementBody,
        crate::routes::credentials::RequestCredentialBody,
        crate::routes::credentials::CreateCredentialBody,
        crate::routes::credentials::CompleteCredentialBody,
        crate::routes::credentials::RejectCredentialBody,
    )),
    tags(
        (name = "profiles", description = "Account holders"),
        (name = "communities", description = "Issuing organizations, keys, and ability grants"),
        (name = "achievements", description = "Awardable qualifications and their prerequisite graph"),
        (name = "credentials", description = "Credential lifecycle and notarization reads"),
        (name = "webhook", description = "Ledger order callbacks"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_generates_and_covers_the_lifecycle_surface() {
        let spec = ApiDoc::openapi();
        let json = serde_json::to_value(&spec).unwrap();
        let paths = json["paths"].as_object().unwrap();
        for path in [
            "/profile/credentials",
            "/credentials",
            "/credentials/{id}/complete",
            "/credentials/{id}/reject",
            "/credentials/{id}/fail",
            "/profile/credentials/{id}/cancel",
            "/webhook",
            "/credentials/schema",
        ] {
            assert!(paths.contains_key(path), "spec missing path: {path}");
        }
    }
}
