#![deny(missing_docs)]

//! # credo-state — Credential Lifecycle & Achievement Graph
//!
//! The two pieces of pure domain logic that gate credential issuance:
//!
//! - [`stage`] — the credential lifecycle state machine. Every stage change
//!   in the platform flows through a guarded transition in this module; the
//!   persistence layer performs the guard-and-write atomically so that
//!   concurrent conflicting transitions resolve to "last guarded write
//!   wins" rather than corruption.
//! - [`graph`] — validation and satisfaction queries over the directed
//!   dependency graph formed by achievements' prerequisite lists.
//!
//! Neither module performs I/O. Callers resolve documents and counts and
//! pass them in; the functions here only decide.

pub mod graph;
pub mod stage;

pub use graph::{dependencies_satisfied, validate_dependencies, DependencyError};
pub use stage::{CredentialStage, TransitionError};
