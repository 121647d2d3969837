//! # Achievement Dependency Graph
//!
//! Achievements form a directed graph through their prerequisite lists.
//! This module owns the two queries the issuance engine needs:
//!
//! - [`validate_dependencies`] — is a prerequisite list well-formed? Run on
//!   every achievement save and on credential creation.
//! - [`dependencies_satisfied`] — has a profile completed every
//!   prerequisite? Run as the finalization guard.
//!
//! Validation fails closed: one bad reference invalidates the whole list,
//! and failures surface as field-level validation errors — never retried,
//! never silently corrected.

use thiserror::Error;

use credo_core::AchievementId;

/// A malformed prerequisite list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DependencyError {
    /// A referenced achievement does not exist or is soft-deleted.
    #[error("dependent achievement {0} does not resolve to a persistent achievement")]
    Unresolvable(AchievementId),

    /// An achievement lists itself as its own prerequisite.
    #[error("achievement {0} cannot depend on itself")]
    SelfReference(AchievementId),
}

/// Validate an achievement's prerequisite list.
///
/// `own_id` is the id of the achievement being saved (`None` while it has
/// not been assigned one yet). `resolves` reports whether an id refers to a
/// persistent achievement; the caller binds it to its document store.
///
/// The first violation fails the whole list.
pub fn validate_dependencies(
    own_id: Option<AchievementId>,
    dependent_ids: &[AchievementId],
    resolves: impl Fn(AchievementId) -> bool,
) -> Result<(), DependencyError> {
    for &id in dependent_ids {
        if !resolves(id) {
            return Err(DependencyError::Unresolvable(id));
        }
        if own_id == Some(id) {
            return Err(DependencyError::SelfReference(id));
        }
    }
    Ok(())
}

/// Whether a profile's completed credentials satisfy a prerequisite list.
///
/// `completed` yields the achievement id of each of the profile's COMPLETED
/// credentials. Satisfied iff the count of completed credentials whose
/// achievement is in the prerequisite set equals the set's size. The
/// comparison is count-based, not distinct-id-based: duplicate COMPLETED
/// credentials for one prerequisite each count once.
pub fn dependencies_satisfied(
    dependent_ids: &[AchievementId],
    completed: impl IntoIterator<Item = AchievementId>,
) -> bool {
    if dependent_ids.is_empty() {
        return true;
    }
    let matching = completed
        .into_iter()
        .filter(|id| dependent_ids.contains(id))
        .count();
    matching == dependent_ids.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_is_valid_and_satisfied() {
        assert!(validate_dependencies(Some(AchievementId::new()), &[], |_| false).is_ok());
        assert!(dependencies_satisfied(&[], std::iter::empty()));
    }

    #[test]
    fn unresolvable_dependency_fails_whole_list() {
        let good = AchievementId::new();
        let missing = AchievementId::new();
        let err =
            validate_dependencies(None, &[good, missing], |id| id == good).unwrap_err();
        assert_eq!(err, DependencyError::Unresolvable(missing));
    }

    #[test]
    fn self_reference_always_fails() {
        let own = AchievementId::new();
        let err = validate_dependencies(Some(own), &[own], |_| true).unwrap_err();
        assert_eq!(err, DependencyError::SelfReference(own));
    }

    #[test]
    fn self_reference_checked_even_among_valid_ids() {
        let own = AchievementId::new();
        let other = AchievementId::new();
        let err = validate_dependencies(Some(own), &[other, own], |_| true).unwrap_err();
        assert_eq!(err, DependencyError::SelfReference(own));
    }

    #[test]
    fn satisfied_when_counts_match() {
        let a = AchievementId::new();
        let b = AchievementId::new();
        assert!(dependencies_satisfied(&[a, b], vec![a, b]));
    }

    #[test]
    fn unsatisfied_when_one_prerequisite_missing() {
        let a = AchievementId::new();
        let b = AchievementId::new();
        assert!(!dependencies_satisfied(&[a, b], vec![a]));
    }

    #[test]
    fn completions_outside_the_set_are_ignored() {
        let a = AchievementId::new();
        let unrelated = AchievementId::new();
        assert!(dependencies_satisfied(&[a], vec![unrelated, a]));
        assert!(!dependencies_satisfied(&[a], vec![unrelated]));
    }

    #[test]
    fn duplicate_completions_count_toward_the_total() {
        // The comparison is count-based: two COMPLETED credentials for the
        // same prerequisite satisfy a two-element set even though the
        // second element was never completed. Preserved behavior.
        let a = AchievementId::new();
        let b = AchievementId::new();
        assert!(dependencies_satisfied(&[a, b], vec![a, a]));
    }
}
