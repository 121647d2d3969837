//! # Authentication Middleware
//!
//! Bearer token middleware resolving an [`Actor`] for every request.
//!
//! ## Token Format
//!
//! ```text
//! Bearer {profile_id}:{secret}   — secret checked constant-time against APP_SECRET
//! Bearer {profile_id}            — accepted only when no APP_SECRET is configured
//! ```
//!
//! The token service proper is an external boundary; this middleware only
//! needs a token to resolve to a profile id. Absence or invalidity of the
//! token yields [`Actor::Anonymous`] rather than a middleware-level
//! rejection, because the webhook and the public notarization reads take no
//! actor — each route decides whether an anonymous actor is acceptable.
//!
//! ## Caller
//!
//! Every request gets an [`Actor`] injected into the request extensions.
//! Handlers extract it via the [`Caller`] extractor.

use axum::extract::{Request, State};
use axum::http::request::Parts;
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use subtle::ConstantTimeEq;

use credo_auth::{Actor, ProfileAbilityKind};
use credo_core::{CommunityId, ProfileId};

use crate::error::AppError;
use crate::state::AppState;

// ── Token Validation ────────────────────────────────────────────────────────

/// Constant-time comparison of bearer secrets.
///
/// Prevents timing side-channels that could reveal secret length or prefix.
/// When lengths differ, performs a dummy comparison to avoid leaking length
/// information through timing variance.
fn constant_time_secret_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Parse a bearer token into the profile id it claims.
///
/// With a configured secret the format is `{profile_id}:{secret}`; without
/// one, a bare `{profile_id}` is accepted (development mode).
fn parse_bearer_token(provided: &str, expected_secret: Option<&str>) -> Result<ProfileId, String> {
    match expected_secret {
        Some(expected) => {
            let (profile_part, secret_part) = provided
                .split_once(':')
                .ok_or_else(|| "invalid token format — expected {profile_id}:{secret}".to_string())?;
            if !constant_time_secret_eq(secret_part, expected) {
                return Err("invalid bearer secret".to_string());
            }
            profile_part
                .parse::<ProfileId>()
                .map_err(|e| format!("invalid profile id: {e}"))
        }
        None => provided
            .parse::<ProfileId>()
            .map_err(|e| format!("invalid profile id: {e}")),
    }
}

// ── Middleware ──────────────────────────────────────────────────────────────

/// Resolve the request's [`Actor`] and inject it into extensions.
///
/// A valid token resolving to a persistent profile yields
/// [`Actor::Profile`] carrying a snapshot of the profile's ability lists;
/// anything else yields [`Actor::Anonymous`].
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let actor = resolve_actor(&state, &request);
    request.extensions_mut().insert(actor);
    next.run(request).await
}

fn resolve_actor(state: &AppState, request: &Request) -> Actor {
    let header_value = match request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        Some(v) => v,
        None => return Actor::Anonymous,
    };

    let Some(token) = header_value.strip_prefix("Bearer ") else {
        tracing::warn!("authentication failed: non-Bearer authorization scheme");
        return Actor::Anonymous;
    };

    let profile_id = match parse_bearer_token(token, state.config.auth_secret.as_deref()) {
        Ok(id) => id,
        Err(reason) => {
            tracing::warn!(%reason, "authentication failed: invalid bearer token");
            return Actor::Anonymous;
        }
    };

    match state.profiles.get(&profile_id) {
        Some(profile) if profile.is_persistent() => Actor::Profile {
            id: profile.id,
            profile_abilities: profile.profile_abilities,
            community_abilities: profile.community_abilities,
        },
        _ => {
            tracing::warn!(%profile_id, "authentication failed: profile not persistent");
            Actor::Anonymous
        }
    }
}

// ── Caller extractor ────────────────────────────────────────────────────────

/// Extractor recovering the [`Actor`] the auth middleware injected.
///
/// Requests that bypass the middleware (none in the assembled app) resolve
/// to an anonymous actor rather than an error — route guards make the
/// actual authentication decision.
#[derive(Debug, Clone)]
pub struct Caller(pub Actor);

#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for Caller {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            parts
                .extensions
                .get::<Actor>()
                .cloned()
                .unwrap_or(Actor::Anonymous),
        ))
    }
}

// ── Route guards ────────────────────────────────────────────────────────────

/// Require an authenticated actor; return its profile id.
pub fn require_authenticated(actor: &Actor) -> Result<ProfileId, AppError> {
    actor
        .profile_id()
        .ok_or_else(|| AppError::Unauthenticated("profile not identified".into()))
}

/// Require a platform-wide ability.
pub fn require_profile_permission(
    actor: &Actor,
    kind: ProfileAbilityKind,
) -> Result<(), AppError> {
    if actor.has_profile_permission(kind) {
        Ok(())
    } else {
        Err(AppError::Unauthorized(format!(
            "{} ability required",
            kind.as_str()
        )))
    }
}

/// Require a community-scoped ability.
pub fn require_community_permission(
    actor: &Actor,
    community_id: CommunityId,
    kind: credo_auth::CommunityAbilityKind,
) -> Result<(), AppError> {
    if actor.has_community_permission(community_id, kind) {
        Ok(())
    } else {
        Err(AppError::Unauthorized(format!(
            "community permission missing for {community_id}"
        )))
    }
}
