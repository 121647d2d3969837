//! # Ability Records
//!
//! The persisted shapes of granted abilities. Each record is an owned value
//! embedded in its parent document (profile or community) and keyed by a
//! stable [`AbilityId`]; records have no independent lifecycle and are
//! mutated only through their owner.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use credo_core::{AbilityId, CommunityId, KeyId, Timestamp};

use crate::kinds::{CommunityAbilityKind, KeyAbilityKind, ProfileAbilityKind};

/// A platform-wide ability granted to a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProfileAbility {
    /// Stable identifier, unique within the owning profile's ability list.
    #[schema(value_type = String)]
    pub id: AbilityId,
    /// The granted ability.
    pub kind: ProfileAbilityKind,
}

impl ProfileAbility {
    /// Create a new ability record with a fresh id.
    pub fn new(kind: ProfileAbilityKind) -> Self {
        Self {
            id: AbilityId::new(),
            kind,
        }
    }
}

/// An ability granted to a profile within a single community.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CommunityAbility {
    /// Stable identifier, unique within the owning profile's ability list.
    #[schema(value_type = String)]
    pub id: AbilityId,
    /// The community the grant is scoped to.
    #[schema(value_type = String)]
    pub community_id: CommunityId,
    /// The granted ability.
    pub kind: CommunityAbilityKind,
}

impl CommunityAbility {
    /// Create a new ability record with a fresh id.
    pub fn new(community_id: CommunityId, kind: CommunityAbilityKind) -> Self {
        Self {
            id: AbilityId::new(),
            community_id,
            kind,
        }
    }
}

/// An ability delegated to an API key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct KeyAbility {
    /// Stable identifier, unique within the owning key's ability list.
    #[schema(value_type = String)]
    pub id: AbilityId,
    /// The delegated ability.
    pub kind: KeyAbilityKind,
}

impl KeyAbility {
    /// Create a new ability record with a fresh id.
    pub fn new(kind: KeyAbilityKind) -> Self {
        Self {
            id: AbilityId::new(),
            kind,
        }
    }
}

/// An API credential embedded in a community.
///
/// The `value` is an opaque secret issued at creation time; the platform
/// stores it for constant-time comparison by the programmatic access path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Key {
    /// Stable identifier, unique within the owning community's key list.
    #[schema(value_type = String)]
    pub id: KeyId,
    /// The opaque key secret.
    pub value: String,
    /// Optional time-to-live in seconds.
    pub ttl: Option<i64>,
    /// Abilities delegated to this key.
    pub abilities: Vec<KeyAbility>,
    /// When the key was created.
    #[schema(value_type = String)]
    pub created_at: Timestamp,
}

/// Check whether a key holds a delegated ability.
///
/// The delegated scope mirrors the profile/community lookups: a linear scan
/// for the kind, `false` on no match, no errors. This path is consulted by
/// programmatic access only — human-actor routes never resolve key
/// abilities.
pub fn key_has_permission(key: &Key, kind: KeyAbilityKind) -> bool {
    key.abilities.iter().any(|a| a.kind == kind)
}
