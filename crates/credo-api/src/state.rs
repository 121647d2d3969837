//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers via
//! the `State` extractor.
//!
//! ## Document stores
//!
//! Each record collection lives in a [`Store`], an in-memory document store
//! with atomic single-document updates. [`Store::try_update`] is the
//! platform's synchronization point: a credential stage transition runs its
//! guard and its write under one lock acquisition, so concurrent
//! conflicting transitions resolve to "last guarded write wins" — a stale
//! actor's guard simply fails against the stage another transition already
//! committed.
//!
//! Embedded collections (abilities inside profiles, keys inside
//! communities) are mutated through the same single-document closures;
//! no cross-document transaction exists or is needed.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use credo_auth::{CommunityAbility, Key, ProfileAbility};
use credo_core::{
    AchievementId, CommunityId, CredentialId, OrderRef, ProfileId, WalletAddress,
};
use credo_ledger::LedgerGateway;
use credo_state::CredentialStage;

// -- Generic In-Memory Store --------------------------------------------------

/// Thread-safe, cloneable in-memory document store.
///
/// All operations are synchronous (the RwLock is `parking_lot`, not
/// `tokio::sync`) because the lock is never held across `.await` points.
/// `parking_lot::RwLock` is non-poisonable — a panicking writer does not
/// permanently corrupt the store.
#[derive(Debug)]
pub struct Store<K, T> {
    data: Arc<RwLock<HashMap<K, T>>>,
}

impl<K, T> Clone for Store<K, T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<K: Eq + Hash + Clone, T: Clone> Store<K, T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: K, value: T) -> Option<T> {
        self.data.write().insert(id, value)
    }

    /// Retrieve a record by ID.
    pub fn get(&self, id: &K) -> Option<T> {
        self.data.read().get(id).cloned()
    }

    /// List all records.
    pub fn list(&self) -> Vec<T> {
        self.data.read().values().cloned().collect()
    }

    /// List records satisfying a predicate.
    pub fn filter(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.data
            .read()
            .values()
            .filter(|v| predicate(v))
            .cloned()
            .collect()
    }

    /// Find the first record satisfying a predicate.
    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<T> {
        self.data.read().values().find(|v| predicate(v)).cloned()
    }

    /// Count records satisfying a predicate.
    pub fn count(&self, predicate: impl Fn(&T) -> bool) -> usize {
        self.data.read().values().filter(|v| predicate(v)).count()
    }

    /// Update a record in place. Returns the updated record, or `None` if
    /// not found.
    pub fn update(&self, id: &K, f: impl FnOnce(&mut T)) -> Option<T> {
        let mut guard = self.data.write();
        if let Some(entry) = guard.get_mut(id) {
            f(entry);
            Some(entry.clone())
        } else {
            None
        }
    }

    /// Atomically read-validate-update a record.
    ///
    /// The closure receives a `&mut T` and may inspect the current state,
    /// validate preconditions, mutate the record, and return `Ok(R)` or
    /// `Err(E)`. The entire operation runs under a single write lock,
    /// eliminating TOCTOU races between guard check and write.
    ///
    /// Returns `None` if the record doesn't exist, or `Some(result)` with
    /// the closure's `Result`.
    pub fn try_update<R, E>(
        &self,
        id: &K,
        f: impl FnOnce(&mut T) -> Result<R, E>,
    ) -> Option<Result<R, E>> {
        self.data.write().get_mut(id).map(f)
    }

    /// Mutate every record in the store under one write lock.
    ///
    /// Used for cascades that touch an unbounded set of documents (e.g.
    /// pulling a deleted community's abilities out of every profile).
    pub fn update_all(&self, mut f: impl FnMut(&mut T)) {
        let mut guard = self.data.write();
        for entry in guard.values_mut() {
            f(entry);
        }
    }

    /// Check if a record exists.
    pub fn contains(&self, id: &K) -> bool {
        self.data.read().contains_key(id)
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Eq + Hash + Clone, T: Clone> Default for Store<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

// -- Record Types -------------------------------------------------------------

/// Profile record (API-layer representation).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileRecord {
    /// Unique profile identifier.
    #[schema(value_type = String)]
    pub id: ProfileId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Email address, unique among persistent profiles.
    pub email: String,
    /// Opaque password hash supplied by the external credential boundary.
    /// Never serialized into responses.
    #[serde(skip_serializing, default)]
    #[schema(value_type = Option<String>, write_only)]
    pub password_hash: Option<String>,
    /// Linked ledger wallet, required before credentials can be issued.
    #[schema(value_type = Option<String>)]
    pub wallet: Option<WalletAddress>,
    /// Platform-wide abilities.
    pub profile_abilities: Vec<ProfileAbility>,
    /// Community-scoped abilities.
    pub community_abilities: Vec<CommunityAbility>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete tombstone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl ProfileRecord {
    /// Whether the record is stored and not tombstoned.
    pub fn is_persistent(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// The profile's display name, as notarized for issued credentials.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Community record, with embedded API keys.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommunityRecord {
    /// Unique community identifier.
    #[schema(value_type = String)]
    pub id: CommunityId,
    /// Community name.
    pub name: String,
    /// Community description.
    pub description: String,
    /// Embedded API keys with delegated abilities.
    pub keys: Vec<Key>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete tombstone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl CommunityRecord {
    /// Whether the record is stored and not tombstoned.
    pub fn is_persistent(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// The snapshot embedded into credentials at creation time.
    pub fn snapshot(&self) -> CommunitySnapshot {
        CommunitySnapshot {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

/// The community fields frozen into a credential when it is created.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommunitySnapshot {
    /// The community's id at snapshot time.
    #[schema(value_type = String)]
    pub id: CommunityId,
    /// The community's name at snapshot time.
    pub name: String,
    /// The community's description at snapshot time.
    pub description: String,
}

/// Descriptive fields of an achievement used for notarization.
///
/// All optional; absent values notarize as `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AchievementDetails {
    /// Short description of the qualification.
    pub definition: Option<String>,
    /// ISO 639-1 code of the qualification language.
    pub ref_language: Option<String>,
    /// Alternative name.
    pub alt_label: Option<String>,
    /// Full learning outcome description.
    pub learning_outcome_desc: Option<String>,
    /// Field of Education and Training Code.
    pub field: Option<String>,
    /// European Qualification Framework level.
    pub eqf_level: Option<String>,
    /// National/Regional Qualification Framework level.
    pub nqf_level: Option<String>,
    /// Name of the credit system.
    pub credit_system: Option<String>,
    /// Official title of the credit system.
    pub credit_sys_title: Option<String>,
    /// Short description of the credit system.
    pub credit_sys_def: Option<String>,
    /// Value in hours/certificates/accomplishments.
    pub credit_sys_value: Option<String>,
    /// Who regulates issuance under the credit system.
    pub credit_sys_issuer: Option<String>,
    /// Credit system reference number.
    pub credit_sys_ref_num: Option<String>,
    /// Credit points under the declared system.
    pub num_credit_points: Option<i64>,
    /// Credit points under ECTS.
    pub ects_credit_points: Option<i64>,
    /// Notional learning hours.
    pub volume_of_learning: Option<String>,
    /// Whether this is a partial qualification.
    pub is_partial_qual: Option<bool>,
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
    /// Activity through which the award is obtained.
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
    /// Historical note.
    pub history_note: Option<String>,
    /// Additional notes.
    pub additional_note: Option<String>,
    /// Qualification status.
    pub status: Option<String>,
    /// Achievement this one replaces.
    #[schema(value_type = Option<String>)]
    pub replaces_id: Option<AchievementId>,
    /// Achievement replacing this one.
    #[schema(value_type = Option<String>)]
    pub replaced_by_id: Option<AchievementId>,
    /// Owner of the qualification definition.
    pub owner: Option<String>,
    /// Creator of the qualification definition.
    pub creator: Option<String>,
    /// Publisher of the qualification definition.
    pub publisher: Option<String>,
}

/// Achievement record: an awardable qualification owned by a community.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AchievementRecord {
    /// Unique achievement identifier.
    #[schema(value_type = String)]
    pub id: AchievementId,
    /// The owning community.
    #[schema(value_type = String)]
    pub community_id: CommunityId,
    /// Qualification name.
    pub name: String,
    /// Search tags, lowercased on input.
    pub tag: Vec<String>,
    /// Prerequisite achievements — the directed dependency graph's edges.
    #[schema(value_type = Vec<String>)]
    pub dependent_achievement_ids: Vec<AchievementId>,
    /// Achievements whose credit systems can build this one.
    #[schema(value_type = Vec<String>)]
    pub can_consist_of_ids: Vec<AchievementId>,
    /// Descriptive fields used for notarization.
    pub details: AchievementDetails,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete tombstone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl AchievementRecord {
    /// Whether the record is stored and not tombstoned.
    pub fn is_persistent(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Credential record — the central entity, binding one profile, one
/// achievement snapshot, and one community snapshot through a staged
/// lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CredentialRecord {
    /// Unique credential identifier.
    #[schema(value_type = String)]
    pub id: CredentialId,
    /// The holder (or requester).
    #[schema(value_type = String)]
    pub profile_id: ProfileId,
    /// Achievement definition frozen at creation time.
    pub achievement: AchievementRecord,
    /// Community frozen at creation time.
    pub community: CommunitySnapshot,
    /// Current lifecycle stage.
    pub stage: CredentialStage,
    /// The holder's wallet at creation time — the asset receiver.
    #[schema(value_type = String)]
    pub wallet: WalletAddress,
    /// Optional note (e.g. attached on rejection).
    pub note: Option<String>,
    /// Grade achieved, set at finalization.
    pub grade: Option<String>,
    /// The finalizing actor.
    #[schema(value_type = Option<String>)]
    pub awarding_body_id: Option<ProfileId>,
    /// Credits awarded, set at finalization.
    pub credits_awarded: Option<i64>,
    /// Expiry of the credential, set at finalization.
    pub expiry_period: Option<DateTime<Utc>>,
    /// Cheating-prevention description, set at finalization.
    pub cheating: Option<String>,
    /// The ledger order reference, set when finalization submits an order.
    #[schema(value_type = Option<String>)]
    pub order_ref: Option<OrderRef>,
    /// Notarized metadata (transient URL fields stripped).
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<serde_json::Value>,
    /// Serialized evidence JSON for later retrieval.
    pub evidence: Option<String>,
    /// Ledger transaction hash, set on completion.
    pub tx_hash: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete tombstone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl CredentialRecord {
    /// Whether the record is stored and not tombstoned.
    pub fn is_persistent(&self) -> bool {
        self.deleted_at.is_none()
    }
}

// -- Configuration ------------------------------------------------------------

/// Application configuration.
///
/// Custom `Debug` redacts the auth secret to prevent credential leakage in
/// logs.
#[derive(Clone)]
pub struct AppConfig {
    /// Listen port.
    pub port: u16,
    /// Shared secret validated (constant-time) against bearer tokens.
    /// `None` disables the secret check (development mode).
    pub auth_secret: Option<String>,
    /// Public base URL used to build `$evidence`/`$schema` links.
    pub public_base_url: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("auth_secret", &self.auth_secret.as_ref().map(|_| "[REDACTED]"))
            .field("public_base_url", &self.public_base_url)
            .finish()
    }
}

impl AppConfig {
    /// Build configuration from environment variables.
    ///
    /// Variables:
    /// - `PORT` (default: 8080)
    /// - `APP_SECRET` (optional — absent disables the secret check)
    /// - `PUBLIC_BASE_URL` (default: `http://localhost:{port}`)
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);
        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{port}"));
        Self {
            port,
            auth_secret: std::env::var("APP_SECRET").ok(),
            public_base_url,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_secret: None,
            public_base_url: "http://localhost:8080".to_string(),
        }
    }
}

// -- AppState -----------------------------------------------------------------

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: AppConfig,
    /// Profile documents.
    pub profiles: Store<ProfileId, ProfileRecord>,
    /// Community documents.
    pub communities: Store<CommunityId, CommunityRecord>,
    /// Achievement documents.
    pub achievements: Store<AchievementId, AchievementRecord>,
    /// Credential documents.
    pub credentials: Store<CredentialId, CredentialRecord>,
    /// The external ledger gateway. Absent in deployments without ledger
    /// configuration; finalization then fails with a system error.
    pub ledger: Option<Arc<dyn LedgerGateway>>,
}

impl AppState {
    /// Create empty state with default configuration and no ledger gateway.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create empty state with the given configuration.
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            config,
            profiles: Store::new(),
            communities: Store::new(),
            achievements: Store::new(),
            credentials: Store::new(),
            ledger: None,
        }
    }

    /// Attach a ledger gateway.
    pub fn with_ledger(mut self, ledger: Arc<dyn LedgerGateway>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Look up a persistent profile by email.
    pub fn profile_by_email(&self, email: &str) -> Option<ProfileRecord> {
        self.profiles
            .find(|p| p.is_persistent() && p.email.eq_ignore_ascii_case(email))
    }

    /// Look up a persistent credential by its stored ledger order
    /// reference. Used by the webhook path.
    pub fn credential_by_order_ref(&self, order_ref: &OrderRef) -> Option<CredentialRecord> {
        self.credentials
            .find(|c| c.is_persistent() && c.order_ref.as_ref() == Some(order_ref))
    }

    /// Achievement ids of a profile's COMPLETED credentials, duplicates
    /// included. Feeds the count-based dependency satisfaction check.
    pub fn completed_achievement_ids(&self, profile_id: ProfileId) -> Vec<AchievementId> {
        self.credentials
            .filter(|c| c.profile_id == profile_id && c.stage == CredentialStage::Completed)
            .into_iter()
            .map(|c| c.achievement.id)
            .collect()
    }

    /// Whether a persistent REQUEST-stage credential already exists for the
    /// (profile, achievement) pair.
    pub fn has_open_request(&self, profile_id: ProfileId, achievement_id: AchievementId) -> bool {
        self.credentials.count(|c| {
            c.is_persistent()
                && c.stage == CredentialStage::Request
                && c.profile_id == profile_id
                && c.achievement.id == achievement_id
        }) > 0
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_insert_get_round_trip() {
        let store: Store<ProfileId, u32> = Store::new();
        let id = ProfileId::new();
        assert!(store.insert(id, 7).is_none());
        assert_eq!(store.get(&id), Some(7));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn store_try_update_runs_guard_under_one_lock() {
        let store: Store<ProfileId, u32> = Store::new();
        let id = ProfileId::new();
        store.insert(id, 1);

        let result = store.try_update(&id, |v| {
            if *v == 1 {
                *v = 2;
                Ok(*v)
            } else {
                Err("stale")
            }
        });
        assert_eq!(result, Some(Ok(2)));

        // A second actor whose guard expects the old value fails without
        // mutating.
        let result = store.try_update(&id, |v| {
            if *v == 1 {
                *v = 3;
                Ok(*v)
            } else {
                Err("stale")
            }
        });
        assert_eq!(result, Some(Err("stale")));
        assert_eq!(store.get(&id), Some(2));
    }

    #[test]
    fn store_try_update_missing_key_is_none() {
        let store: Store<ProfileId, u32> = Store::new();
        let result: Option<Result<(), ()>> = store.try_update(&ProfileId::new(), |_| Ok(()));
        assert!(result.is_none());
    }

    #[test]
    fn store_update_all_touches_every_record() {
        let store: Store<ProfileId, u32> = Store::new();
        for _ in 0..3 {
            store.insert(ProfileId::new(), 1);
        }
        store.update_all(|v| *v += 1);
        assert!(store.list().iter().all(|v| *v == 2));
    }

    #[test]
    fn clones_share_the_same_data() {
        let store: Store<ProfileId, u32> = Store::new();
        let id = ProfileId::new();
        let clone = store.clone();
        store.insert(id, 9);
        assert_eq!(clone.get(&id), Some(9));
    }

    #[test]
    fn app_config_debug_redacts_secret() {
        let config = AppConfig {
            auth_secret: Some("hunter2".into()),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
    }
}
