//! # Identity Newtypes
//!
//! Domain-primitive newtypes for identifiers throughout the platform.
//! Each identifier is a distinct type — you cannot pass an [`AchievementId`]
//! where a [`CredentialId`] is expected.
//!
//! ## Validation
//!
//! UUID-based identifiers are always valid by construction. The string-based
//! [`WalletAddress`] validates format when it is created.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create an identifier from an existing UUID.
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

uuid_id! {
    /// A unique identifier for an account holder who can request or hold
    /// credentials.
    ProfileId
}

uuid_id! {
    /// A unique identifier for an issuing organization that owns
    /// achievements and delegated API keys.
    CommunityId
}

uuid_id! {
    /// A unique identifier for an achievement definition.
    AchievementId
}

uuid_id! {
    /// A unique identifier for a credential instance.
    CredentialId
}

uuid_id! {
    /// A unique identifier for an ability record embedded in a profile,
    /// community, or key document.
    AbilityId
}

uuid_id! {
    /// A unique identifier for an API key embedded in a community.
    KeyId
}

uuid_id! {
    /// A reference to an order submitted to the external ledger. The ledger
    /// reports the order's asynchronous outcome against this reference.
    OrderRef
}

// ---------------------------------------------------------------------------
// String-based identifiers (validated at construction)
// ---------------------------------------------------------------------------

/// A ledger wallet address linked to a profile.
///
/// Format: `0x` followed by 40 hexadecimal characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Create a wallet address from a string, validating format.
    pub fn new(s: impl Into<String>) -> Result<Self, ValidationError> {
        let s = s.into();
        let hex = s
            .strip_prefix("0x")
            .ok_or_else(|| ValidationError::InvalidWalletAddress(s.clone()))?;
        if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValidationError::InvalidWalletAddress(s));
        }
        Ok(Self(s))
    }

    /// Access the address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for WalletAddress {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
