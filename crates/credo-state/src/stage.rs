//! # Credential Lifecycle State Machine
//!
//! Models the lifecycle of a credential from creation through ledger
//! anchoring.
//!
//! ## Stages
//!
//! ```text
//!              (self-request)          (direct grant)
//!                    │                       │
//!                    ▼                       ▼
//!                 REQUEST ──────────▶     PENDING
//!                 │  │   (accept*)           │
//!       (cancel)  │  │ (reject)              │ (finalize: ledger order)
//!                 ▼  ▼                       ▼
//!          CANCELED  REJECTED             ISSUING ◀──────────┐
//!                                         │     │            │ (re-finalize)
//!                            (ledger ok)  │     │ (ledger    │
//!                                         ▼     ▼  failure)  │
//!                                 COMPLETED     ISSUING_FAILED
//!
//!                 any non-terminal ──(administrative fail)──▶ FAILED
//! ```
//!
//! `*` acceptance of a request is performed by the grantor re-creating the
//! credential in PENDING via the direct-grant path.
//!
//! Terminal stages: COMPLETED, REJECTED, CANCELED, FAILED. ISSUING_FAILED
//! is recoverable — a grantor may re-attempt finalization.
//!
//! ## Design Decision
//!
//! The lifecycle uses an enum with validated transitions rather than
//! typestate types. The guards depend on runtime data (actor capabilities,
//! dependency satisfaction, ledger outcomes), so the invariant is enforced
//! by `transition()`-style functions returning `Result` — the persistence
//! layer runs the guard and the stage write under a single atomic document
//! update.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// The lifecycle stage of a credential.
///
/// Serializes in `SCREAMING_SNAKE_CASE` to match the API contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CredentialStage {
    /// A profile asked for the credential; awaiting grantor action.
    Request,
    /// Granted but not yet anchored on the ledger.
    Pending,
    /// A ledger order is in flight; awaiting webhook confirmation.
    Issuing,
    /// The ledger reported failure; finalization may be re-attempted.
    IssuingFailed,
    /// A grantor rejected the request. Terminal.
    Rejected,
    /// Administratively failed. Terminal.
    Failed,
    /// The requesting profile withdrew the request. Terminal.
    Canceled,
    /// Anchored on the ledger. Terminal.
    Completed,
}

impl CredentialStage {
    /// Whether this stage admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Rejected | Self::Canceled | Self::Failed
        )
    }

    /// Return the string representation of this stage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Request => "REQUEST",
            Self::Pending => "PENDING",
            Self::Issuing => "ISSUING",
            Self::IssuingFailed => "ISSUING_FAILED",
            Self::Rejected => "REJECTED",
            Self::Failed => "FAILED",
            Self::Canceled => "CANCELED",
            Self::Completed => "COMPLETED",
        }
    }

    /// Whether the transition table admits `from` → `to`.
    ///
    /// This is the full reachability relation; the per-trigger functions
    /// below are the only way transitions are actually performed.
    pub fn can_transition(from: Self, to: Self) -> bool {
        use CredentialStage::*;
        match (from, to) {
            (Request, Canceled) | (Request, Rejected) => true,
            (Pending, Issuing) | (IssuingFailed, Issuing) => true,
            (Issuing, Completed) | (Issuing, IssuingFailed) => true,
            (from, Failed) => !from.is_terminal(),
            _ => false,
        }
    }

    /// REQUEST → CANCELED: the requesting profile withdraws.
    pub fn cancel(self) -> Result<Self, TransitionError> {
        self.require(Self::Request, Self::Canceled)
    }

    /// REQUEST → REJECTED: a grantor declines the request.
    pub fn reject(self) -> Result<Self, TransitionError> {
        self.require(Self::Request, Self::Rejected)
    }

    /// PENDING | ISSUING_FAILED → ISSUING: a grantor finalizes.
    ///
    /// Callers must run this guard, then submit the ledger order, and only
    /// commit the returned stage after submission succeeds — a failed
    /// submission must leave the credential in its pre-call stage.
    pub fn finalize(self) -> Result<Self, TransitionError> {
        match self {
            Self::Pending | Self::IssuingFailed => Ok(Self::Issuing),
            from => Err(TransitionError::invalid(from, Self::Issuing)),
        }
    }

    /// ISSUING → COMPLETED: the ledger confirmed the order.
    pub fn ledger_confirmed(self) -> Result<Self, TransitionError> {
        self.require(Self::Issuing, Self::Completed)
    }

    /// ISSUING → ISSUING_FAILED: the ledger reported failure, cancellation,
    /// or suspension — or applying the confirmation failed.
    pub fn ledger_failed(self) -> Result<Self, TransitionError> {
        self.require(Self::Issuing, Self::IssuingFailed)
    }

    /// Any non-terminal stage → FAILED: administrative fail action.
    pub fn fail(self) -> Result<Self, TransitionError> {
        if self.is_terminal() {
            return Err(TransitionError::AlreadyTerminal { stage: self });
        }
        Ok(Self::Failed)
    }

    fn require(self, expected: Self, target: Self) -> Result<Self, TransitionError> {
        if self == expected {
            Ok(target)
        } else {
            Err(TransitionError::invalid(self, target))
        }
    }
}

impl std::fmt::Display for CredentialStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors rejecting a credential stage transition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// The attempted transition is not valid from the current stage.
    #[error("invalid credential transition: {from} -> {to}")]
    InvalidTransition {
        /// Current stage.
        from: CredentialStage,
        /// Attempted target stage.
        to: CredentialStage,
    },

    /// The credential is in a terminal stage and cannot transition.
    #[error("credential in terminal stage {stage} cannot transition")]
    AlreadyTerminal {
        /// The terminal stage.
        stage: CredentialStage,
    },
}

impl TransitionError {
    fn invalid(from: CredentialStage, to: CredentialStage) -> Self {
        Self::InvalidTransition { from, to }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ALL: [CredentialStage; 8] = [
        CredentialStage::Request,
        CredentialStage::Pending,
        CredentialStage::Issuing,
        CredentialStage::IssuingFailed,
        CredentialStage::Rejected,
        CredentialStage::Failed,
        CredentialStage::Canceled,
        CredentialStage::Completed,
    ];

    #[test]
    fn terminal_stages() {
        assert!(CredentialStage::Completed.is_terminal());
        assert!(CredentialStage::Rejected.is_terminal());
        assert!(CredentialStage::Canceled.is_terminal());
        assert!(CredentialStage::Failed.is_terminal());
        assert!(!CredentialStage::Request.is_terminal());
        assert!(!CredentialStage::Pending.is_terminal());
        assert!(!CredentialStage::Issuing.is_terminal());
        assert!(!CredentialStage::IssuingFailed.is_terminal());
    }

    #[test]
    fn cancel_only_from_request() {
        assert_eq!(
            CredentialStage::Request.cancel().unwrap(),
            CredentialStage::Canceled
        );
        assert!(CredentialStage::Pending.cancel().is_err());
        assert!(CredentialStage::Completed.cancel().is_err());
    }

    #[test]
    fn reject_only_from_request() {
        assert_eq!(
            CredentialStage::Request.reject().unwrap(),
            CredentialStage::Rejected
        );
        assert!(CredentialStage::Issuing.reject().is_err());
    }

    #[test]
    fn finalize_from_pending_and_issuing_failed() {
        assert_eq!(
            CredentialStage::Pending.finalize().unwrap(),
            CredentialStage::Issuing
        );
        assert_eq!(
            CredentialStage::IssuingFailed.finalize().unwrap(),
            CredentialStage::Issuing
        );
        assert!(CredentialStage::Request.finalize().is_err());
        assert!(CredentialStage::Completed.finalize().is_err());
    }

    #[test]
    fn ledger_outcomes_only_from_issuing() {
        assert_eq!(
            CredentialStage::Issuing.ledger_confirmed().unwrap(),
            CredentialStage::Completed
        );
        assert_eq!(
            CredentialStage::Issuing.ledger_failed().unwrap(),
            CredentialStage::IssuingFailed
        );
        // Duplicate webhook delivery against a terminal stage is refused
        // by the guard, which the webhook handler treats as a no-op.
        assert!(CredentialStage::Completed.ledger_confirmed().is_err());
        assert!(CredentialStage::Completed.ledger_failed().is_err());
    }

    #[test]
    fn fail_from_any_non_terminal() {
        for stage in ALL {
            if stage.is_terminal() {
                assert_eq!(
                    stage.fail().unwrap_err(),
                    TransitionError::AlreadyTerminal { stage }
                );
            } else {
                assert_eq!(stage.fail().unwrap(), CredentialStage::Failed);
            }
        }
    }

    #[test]
    fn no_direct_jump_from_request_to_completed() {
        assert!(!CredentialStage::can_transition(
            CredentialStage::Request,
            CredentialStage::Completed
        ));
    }

    #[test]
    fn serde_uses_screaming_snake_case() {
        let json = serde_json::to_string(&CredentialStage::IssuingFailed).unwrap();
        assert_eq!(json, "\"ISSUING_FAILED\"");
        let back: CredentialStage = serde_json::from_str("\"ISSUING_FAILED\"").unwrap();
        assert_eq!(back, CredentialStage::IssuingFailed);
    }

    // ── Property tests ───────────────────────────────────────────

    fn stage_strategy() -> impl Strategy<Value = CredentialStage> {
        prop::sample::select(ALL.to_vec())
    }

    proptest! {
        /// Every trigger function either fails or lands on a stage the
        /// reachability table admits.
        #[test]
        fn triggers_stay_inside_the_table(from in stage_strategy(), trigger in 0usize..6) {
            let result = match trigger {
                0 => from.cancel(),
                1 => from.reject(),
                2 => from.finalize(),
                3 => from.ledger_confirmed(),
                4 => from.ledger_failed(),
                _ => from.fail(),
            };
            if let Ok(to) = result {
                prop_assert!(CredentialStage::can_transition(from, to),
                    "trigger {} produced unreachable {} -> {}", trigger, from, to);
            }
        }

        /// Terminal stages absorb every trigger.
        #[test]
        fn terminal_stages_absorb_all_triggers(from in stage_strategy(), trigger in 0usize..6) {
            prop_assume!(from.is_terminal());
            let result = match trigger {
                0 => from.cancel(),
                1 => from.reject(),
                2 => from.finalize(),
                3 => from.ledger_confirmed(),
                4 => from.ledger_failed(),
                _ => from.fail(),
            };
            prop_assert!(result.is_err());
        }

        /// Random trigger sequences never escape the reachability table.
        #[test]
        fn random_sequences_stay_reachable(
            start in prop::sample::select(vec![CredentialStage::Request, CredentialStage::Pending]),
            triggers in prop::collection::vec(0usize..6, 0..12),
        ) {
            let mut stage = start;
            for t in triggers {
                let result = match t {
                    0 => stage.cancel(),
                    1 => stage.reject(),
                    2 => stage.finalize(),
                    3 => stage.ledger_confirmed(),
                    4 => stage.ledger_failed(),
                    _ => stage.fail(),
                };
                if let Ok(next) = result {
                    prop_assert!(CredentialStage::can_transition(stage, next));
                    stage = next;
                }
            }
        }
    }
}
