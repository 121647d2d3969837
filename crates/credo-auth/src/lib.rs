#![deny(missing_docs)]

//! # credo-auth — Capability Model
//!
//! Three independent capability scopes gate every action on the platform:
//!
//! - **Profile scope** — platform-wide abilities attached to a profile
//!   (e.g. [`ProfileAbilityKind::CreateCommunity`]).
//! - **Community scope** — abilities attached to a profile *within* a
//!   community. Communities are multi-tenant: a profile may administer one
//!   community and be a mere holder in another.
//! - **Key scope** — abilities delegated to an API key embedded in a
//!   community, for programmatic (non-human) access. Checked by a separate
//!   code path that resolves a key's abilities rather than a profile's.
//!
//! Each scope is a closed tagged enum; unknown kinds fail deserialization
//! rather than slipping through as inert array entries.
//!
//! The lookups themselves ([`Actor::has_profile_permission`],
//! [`Actor::has_community_permission`], [`key_has_permission`]) are pure
//! scans. Absence of permission is a normal `false`, never an error, and an
//! unauthenticated actor fails every check.

pub mod actor;
pub mod kinds;
pub mod record;

pub use actor::Actor;
pub use kinds::{CommunityAbilityKind, KeyAbilityKind, ProfileAbilityKind};
pub use record::{key_has_permission, CommunityAbility, Key, KeyAbility, ProfileAbility};
