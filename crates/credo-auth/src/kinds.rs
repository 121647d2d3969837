//! # Ability Kinds
//!
//! Closed enumerations of the abilities grantable in each scope. Persisted
//! ability records carry one of these kinds; writes are validated against
//! the enum by construction (serde rejects unknown values).

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Platform-wide abilities attached directly to a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfileAbilityKind {
    /// Sign in and hold a session.
    Auth,
    /// Update own profile data.
    Update,
    /// Soft-delete profiles.
    Delete,
    /// Reset own password.
    ResetPassword,
    /// Reset own email.
    ResetEmail,
    /// Create new communities.
    CreateCommunity,
    /// Directly issue a credential to a named profile (PENDING stage).
    CreateCredential,
    /// Soft-delete credentials (never COMPLETED ones).
    DeleteCredential,
    /// Finalize or administratively fail credentials.
    FinaliseCredential,
    /// Accept or reject profile-initiated credential requests.
    ManageRequestCredential,
    /// Read own credentials.
    ReadCredential,
    /// Read any profile's credentials.
    ReadAllCredentials,
    /// Self-request a credential (REQUEST stage).
    RequestCredential,
}

impl ProfileAbilityKind {
    /// The baseline ability set granted to every profile at signup.
    pub fn signup_defaults() -> Vec<Self> {
        vec![
            Self::Auth,
            Self::Update,
            Self::ResetPassword,
            Self::ResetEmail,
            Self::Delete,
            Self::ReadCredential,
            Self::RequestCredential,
        ]
    }

    /// Return the string representation of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auth => "AUTH",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::ResetPassword => "RESET_PASSWORD",
            Self::ResetEmail => "RESET_EMAIL",
            Self::CreateCommunity => "CREATE_COMMUNITY",
            Self::CreateCredential => "CREATE_CREDENTIAL",
            Self::DeleteCredential => "DELETE_CREDENTIAL",
            Self::FinaliseCredential => "FINALISE_CREDENTIAL",
            Self::ManageRequestCredential => "MANAGE_REQUEST_CREDENTIAL",
            Self::ReadCredential => "READ_CREDENTIAL",
            Self::ReadAllCredentials => "READ_ALL_CREDENTIALS",
            Self::RequestCredential => "REQUEST_CREDENTIAL",
        }
    }
}

/// Abilities attached to a profile within a single community.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommunityAbilityKind {
    /// Read the community document.
    Read,
    /// Update community fields.
    Update,
    /// Soft-delete the community.
    Delete,
    /// Read ability grants within the community.
    ReadAbility,
    /// Grant a community ability to a profile.
    CreateAbility,
    /// Revoke a community ability from a profile.
    DeleteAbility,
    /// Create an API key for the community.
    CreateKey,
    /// Delete an API key.
    DeleteKey,
    /// Read API keys and their abilities.
    ReadKey,
    /// Add an ability to an API key.
    CreateKeyAbility,
    /// Remove an ability from an API key.
    DeleteKeyAbility,
    /// Create achievements owned by the community.
    CreateAchievement,
    /// Soft-delete community achievements.
    DeleteAchievement,
    /// Update community achievements.
    UpdateAchievement,
    /// Read community achievements.
    ReadAchievement,
}

impl CommunityAbilityKind {
    /// Every community-scope ability. Granted in full to a community's
    /// creator.
    pub fn full_set() -> Vec<Self> {
        vec![
            Self::Read,
            Self::Update,
            Self::Delete,
            Self::ReadAbility,
            Self::CreateAbility,
            Self::DeleteAbility,
            Self::CreateKey,
            Self::DeleteKey,
            Self::ReadKey,
            Self::CreateKeyAbility,
            Self::DeleteKeyAbility,
            Self::CreateAchievement,
            Self::DeleteAchievement,
            Self::UpdateAchievement,
            Self::ReadAchievement,
        ]
    }
}

/// Abilities delegated to an API key, scoped to asset operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeyAbilityKind {
    /// Submit asset-creation orders.
    CreateAsset,
    /// Read asset state.
    ReadAsset,
    /// Revoke an issued asset.
    RevokeAsset,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_serialize_screaming_snake() {
        let json = serde_json::to_string(&ProfileAbilityKind::FinaliseCredential).unwrap();
        assert_eq!(json, "\"FINALISE_CREDENTIAL\"");
        let json = serde_json::to_string(&CommunityAbilityKind::CreateKeyAbility).unwrap();
        assert_eq!(json, "\"CREATE_KEY_ABILITY\"");
        let json = serde_json::to_string(&KeyAbilityKind::CreateAsset).unwrap();
        assert_eq!(json, "\"CREATE_ASSET\"");
    }

    #[test]
    fn unknown_kind_fails_deserialization() {
        let result: Result<ProfileAbilityKind, _> = serde_json::from_str("\"SUPERADMIN\"");
        assert!(result.is_err());
    }

    #[test]
    fn signup_defaults_exclude_administrative_kinds() {
        let defaults = ProfileAbilityKind::signup_defaults();
        assert!(defaults.contains(&ProfileAbilityKind::RequestCredential));
        assert!(!defaults.contains(&ProfileAbilityKind::CreateCredential));
        assert!(!defaults.contains(&ProfileAbilityKind::FinaliseCredential));
        assert!(!defaults.contains(&ProfileAbilityKind::ManageRequestCredential));
    }

    #[test]
    fn full_community_set_covers_every_variant() {
        assert_eq!(CommunityAbilityKind::full_set().len(), 15);
    }

    #[test]
    fn as_str_matches_serde_rename() {
        let json = serde_json::to_string(&ProfileAbilityKind::ManageRequestCredential).unwrap();
        assert_eq!(
            json.trim_matches('"'),
            ProfileAbilityKind::ManageRequestCredential.as_str()
        );
    }
}
