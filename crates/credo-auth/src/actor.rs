//! # Actor & Authorization Lookups
//!
//! An [`Actor`] is the authenticated principal of a request, carrying the
//! ability lists resolved at authentication time. The permission checks are
//! pure lookups: scan the relevant list for a matching kind (and, for
//! community checks, a matching community id). No match means `false`, and
//! the caller must refuse the action; nothing here mutates state or errors.

use credo_core::{CommunityId, ProfileId};

use crate::kinds::{CommunityAbilityKind, ProfileAbilityKind};
use crate::record::{CommunityAbility, ProfileAbility};

/// The authenticated principal of a request.
///
/// Anonymous actors fail every permission check. An authenticated actor
/// carries a snapshot of the profile's ability lists taken when the bearer
/// token was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    /// No valid bearer token was presented.
    Anonymous,
    /// A resolved, persistent profile.
    Profile {
        /// The authenticated profile's id.
        id: ProfileId,
        /// Platform-wide abilities held by the profile.
        profile_abilities: Vec<ProfileAbility>,
        /// Community-scoped abilities held by the profile.
        community_abilities: Vec<CommunityAbility>,
    },
}

impl Actor {
    /// Whether a profile is authenticated.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Profile { .. })
    }

    /// The authenticated profile's id, if any.
    pub fn profile_id(&self) -> Option<ProfileId> {
        match self {
            Self::Profile { id, .. } => Some(*id),
            Self::Anonymous => None,
        }
    }

    /// Whether the actor is the profile with the given id.
    pub fn is_authenticated_as(&self, profile_id: ProfileId) -> bool {
        self.profile_id() == Some(profile_id)
    }

    /// Whether the actor holds a platform-wide ability.
    pub fn has_profile_permission(&self, kind: ProfileAbilityKind) -> bool {
        match self {
            Self::Profile {
                profile_abilities, ..
            } => profile_abilities.iter().any(|a| a.kind == kind),
            Self::Anonymous => false,
        }
    }

    /// Whether the actor holds an ability within the given community.
    pub fn has_community_permission(
        &self,
        community_id: CommunityId,
        kind: CommunityAbilityKind,
    ) -> bool {
        match self {
            Self::Profile {
                community_abilities,
                ..
            } => community_abilities
                .iter()
                .any(|a| a.kind == kind && a.community_id == community_id),
            Self::Anonymous => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(
        profile_kinds: &[ProfileAbilityKind],
        community_kinds: &[(CommunityId, CommunityAbilityKind)],
    ) -> Actor {
        Actor::Profile {
            id: ProfileId::new(),
            profile_abilities: profile_kinds
                .iter()
                .copied()
                .map(ProfileAbility::new)
                .collect(),
            community_abilities: community_kinds
                .iter()
                .map(|(cid, kind)| CommunityAbility::new(*cid, *kind))
                .collect(),
        }
    }

    #[test]
    fn anonymous_fails_every_check() {
        let anon = Actor::Anonymous;
        assert!(!anon.is_authenticated());
        assert!(!anon.has_profile_permission(ProfileAbilityKind::Auth));
        assert!(!anon.has_community_permission(CommunityId::new(), CommunityAbilityKind::Read));
        assert!(anon.profile_id().is_none());
    }

    #[test]
    fn profile_permission_present() {
        let actor = actor(&[ProfileAbilityKind::RequestCredential], &[]);
        assert!(actor.has_profile_permission(ProfileAbilityKind::RequestCredential));
    }

    #[test]
    fn profile_permission_absent_is_false_not_error() {
        let actor = actor(&[ProfileAbilityKind::Auth], &[]);
        assert!(!actor.has_profile_permission(ProfileAbilityKind::FinaliseCredential));
    }

    #[test]
    fn community_permission_requires_matching_community() {
        let home = CommunityId::new();
        let other = CommunityId::new();
        let actor = actor(&[], &[(home, CommunityAbilityKind::CreateAchievement)]);

        assert!(actor.has_community_permission(home, CommunityAbilityKind::CreateAchievement));
        assert!(!actor.has_community_permission(other, CommunityAbilityKind::CreateAchievement));
    }

    #[test]
    fn community_permission_requires_matching_kind() {
        let home = CommunityId::new();
        let actor = actor(&[], &[(home, CommunityAbilityKind::Read)]);
        assert!(!actor.has_community_permission(home, CommunityAbilityKind::Delete));
    }

    #[test]
    fn multi_tenant_grants_stay_isolated() {
        // Administering one community confers nothing in another.
        let admin_of = CommunityId::new();
        let holder_in = CommunityId::new();
        let actor = actor(
            &[],
            &[
                (admin_of, CommunityAbilityKind::Update),
                (admin_of, CommunityAbilityKind::Delete),
                (holder_in, CommunityAbilityKind::Read),
            ],
        );

        assert!(actor.has_community_permission(admin_of, CommunityAbilityKind::Delete));
        assert!(!actor.has_community_permission(holder_in, CommunityAbilityKind::Delete));
        assert!(actor.has_community_permission(holder_in, CommunityAbilityKind::Read));
    }

    #[test]
    fn is_authenticated_as_matches_own_id_only() {
        let id = ProfileId::new();
        let actor = Actor::Profile {
            id,
            profile_abilities: vec![],
            community_abilities: vec![],
        };
        assert!(actor.is_authenticated_as(id));
        assert!(!actor.is_authenticated_as(ProfileId::new()));
    }
}
