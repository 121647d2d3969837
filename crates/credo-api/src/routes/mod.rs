//! # API Route Modules
//!
//! One module per resource:
//!
//! - `profiles` — signup, wallet linking, soft deletion.
//! - `communities` — community CRUD, embedded API keys, ability grants.
//! - `achievements` — achievement CRUD with dependency-graph validation.
//! - `credentials` — the issuance engine: request/grant/finalize/reject/
//!   fail/cancel/delete plus the read-only notarization endpoints.
//! - `webhook` — ledger callback completing the asynchronous issuance leg.

pub mod achievements;
pub mod communities;
pub mod credentials;
pub mod profiles;
pub mod webhook;
