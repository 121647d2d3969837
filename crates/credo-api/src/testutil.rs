//! Shared fixtures for route tests: seeded records, a scripted ledger
//! gateway double, and request/response helpers.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use http_body_util::BodyExt;
use parking_lot::Mutex;
use tower::ServiceExt;

use async_trait::async_trait;
use credo_auth::{
    CommunityAbility, CommunityAbilityKind, ProfileAbility, ProfileAbilityKind,
};
use credo_core::{AchievementId, CommunityId, CredentialId, OrderRef, ProfileId, WalletAddress};
use credo_ledger::{
    LedgerError, LedgerGateway, OrderReceipt, OrderStatus, OrderStatusView,
};
use credo_state::CredentialStage;

use crate::state::{
    AchievementDetails, AchievementRecord, AppState, CommunityRecord, CredentialRecord,
    ProfileRecord,
};

/// A valid wallet used by seeded profiles.
pub fn test_wallet() -> WalletAddress {
    WalletAddress::new("0xB257f4eF17c81Eb4d15A741A8D09e1EBb3953201").unwrap()
}

/// Seed a persistent profile with a wallet and the given platform
/// abilities (on top of nothing else — no signup defaults).
pub fn seed_profile(
    state: &AppState,
    email: &str,
    kinds: &[ProfileAbilityKind],
) -> ProfileRecord {
    let now = Utc::now();
    let profile = ProfileRecord {
        id: ProfileId::new(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: email.to_string(),
        password_hash: None,
        wallet: Some(test_wallet()),
        profile_abilities: kinds.iter().copied().map(ProfileAbility::new).collect(),
        community_abilities: Vec::new(),
        created_at: now,
        updated_at: now,
        deleted_at: None,
    };
    state.profiles.insert(profile.id, profile.clone());
    profile
}

/// Remove a seeded profile's wallet.
pub fn unlink_wallet(state: &AppState, id: ProfileId) {
    state.profiles.update(&id, |p| p.wallet = None);
}

/// Grant community-scoped abilities to a seeded profile.
pub fn grant_community(
    state: &AppState,
    profile_id: ProfileId,
    community_id: CommunityId,
    kinds: &[CommunityAbilityKind],
) {
    state.profiles.update(&profile_id, |p| {
        p.community_abilities.extend(
            kinds
                .iter()
                .map(|kind| CommunityAbility::new(community_id, *kind)),
        );
    });
}

/// Seed a persistent community.
pub fn seed_community(state: &AppState) -> CommunityRecord {
    let now = Utc::now();
    let community = CommunityRecord {
        id: CommunityId::new(),
        name: "Open University".to_string(),
        description: "Issues micro-credentials".to_string(),
        keys: Vec::new(),
        created_at: now,
        updated_at: now,
        deleted_at: None,
    };
    state.communities.insert(community.id, community.clone());
    community
}

/// Seed a persistent achievement owned by `community_id`.
pub fn seed_achievement(
    state: &AppState,
    community_id: CommunityId,
    dependent_ids: &[AchievementId],
) -> AchievementRecord {
    let now = Utc::now();
    let achievement = AchievementRecord {
        id: AchievementId::new(),
        community_id,
        name: "Applied Cryptography".to_string(),
        tag: vec!["security".to_string()],
        dependent_achievement_ids: dependent_ids.to_vec(),
        can_consist_of_ids: Vec::new(),
        details: AchievementDetails {
            definition: Some("Intro to applied cryptography".to_string()),
            ..Default::default()
        },
        created_at: now,
        updated_at: now,
        deleted_at: None,
    };
    state.achievements.insert(achievement.id, achievement.clone());
    achievement
}

/// Seed a credential at the given stage.
pub fn seed_credential(
    state: &AppState,
    profile: &ProfileRecord,
    achievement: &AchievementRecord,
    stage: CredentialStage,
) -> CredentialRecord {
    let now = Utc::now();
    let community = state
        .communities
        .get(&achievement.community_id)
        .expect("achievement's community seeded");
    let credential = CredentialRecord {
        id: CredentialId::new(),
        profile_id: profile.id,
        achievement: achievement.clone(),
        community: community.snapshot(),
        stage,
        wallet: profile.wallet.clone().unwrap_or_else(test_wallet),
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
    };
    state.credentials.insert(credential.id, credential.clone());
    credential
}

// ── Scripted ledger double ──────────────────────────────────────────────────

/// What the scripted gateway does on submission.
#[derive(Debug, Clone)]
pub enum SubmitScript {
    /// Accept and return a receipt with this reference.
    Accept(OrderRef),
    /// Fail with a transport-style error.
    Fail,
}

/// Scripted [`LedgerGateway`] for route tests.
pub struct ScriptedLedger {
    submit: SubmitScript,
    status: Mutex<Option<OrderStatusView>>,
}

impl ScriptedLedger {
    /// Gateway that accepts submissions under the given reference.
    pub fn accepting(order_ref: OrderRef) -> Arc<Self> {
        Arc::new(Self {
            submit: SubmitScript::Accept(order_ref),
            status: Mutex::new(None),
        })
    }

    /// Gateway that fails every submission.
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            submit: SubmitScript::Fail,
            status: Mutex::new(None),
        })
    }

    /// Script the response to the next status query.
    pub fn set_status(&self, order_ref: OrderRef, status: OrderStatus, tx_hash: Option<&str>) {
        *self.status.lock() = Some(OrderStatusView {
            order_ref,
            status,
            tx_hash: tx_hash.map(str::to_string),
        });
    }
}

#[async_trait]
impl LedgerGateway for ScriptedLedger {
    async fn submit_asset_creation(
        &self,
        _asset_id: &str,
        _receiver: &WalletAddress,
        _imprint: &str,
    ) -> Result<OrderReceipt, LedgerError> {
        match &self.submit {
            SubmitScript::Accept(order_ref) => Ok(OrderReceipt {
                order_ref: *order_ref,
                status: OrderStatus::Pending,
            }),
            SubmitScript::Fail => Err(LedgerError::Api {
                endpoint: "POST /orders".to_string(),
                status: 503,
                body: "scripted failure".to_string(),
            }),
        }
    }

    async fn order_status(&self, order_ref: &OrderRef) -> Result<OrderStatusView, LedgerError> {
        match self.status.lock().clone() {
            Some(view) if view.order_ref == *order_ref => Ok(view),
            _ => Err(LedgerError::OrderNotFound(*order_ref)),
        }
    }
}

// ── Request helpers ─────────────────────────────────────────────────────────

/// Bearer token for a seeded profile (dev mode: no secret configured).
pub fn bearer(profile: &ProfileRecord) -> String {
    format!("Bearer {}", profile.id)
}

/// Build a JSON request with an optional actor.
pub fn json_request(
    method: &str,
    uri: &str,
    actor: Option<&ProfileRecord>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(profile) = actor {
        builder = builder.header("Authorization", bearer(profile));
    }
    builder
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

/// Build a bodyless request with an optional actor.
pub fn bare_request(method: &str, uri: &str, actor: Option<&ProfileRecord>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(profile) = actor {
        builder = builder.header("Authorization", bearer(profile));
    }
    builder.body(Body::empty()).unwrap()
}

/// Send a request through a fresh app built over `state`.
pub async fn send(state: &AppState, request: Request<Body>) -> axum::response::Response {
    crate::app(state.clone()).oneshot(request).await.unwrap()
}

/// Read a response body as JSON.
pub async fn body_json<T: serde::de::DeserializeOwned>(resp: axum::response::Response) -> T {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert a response carries the given status and error code.
pub async fn assert_error(resp: axum::response::Response, status: StatusCode, code: &str) {
    assert_eq!(resp.status(), status);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["error"]["code"], code);
}
