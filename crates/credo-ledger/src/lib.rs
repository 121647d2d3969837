#![deny(missing_docs)]

//! # credo-ledger — Ledger Order Client
//!
//! Typed access to the external ledger's order service. The platform never
//! speaks the ledger's own wire protocol; it submits **orders** (units of
//! asset-creation work) and later learns their outcome when the ledger
//! calls back on the platform webhook, at which point the webhook handler
//! queries the order's status here.
//!
//! ## Async seam
//!
//! The API layer consumes the [`LedgerGateway`] trait rather than the
//! concrete client, so route tests substitute a scripted double and the
//! issuance engine's "submission failure must not mutate stage" rule can be
//! exercised without a live ledger. Failures are real `Err` values —
//! distinguishable from a pending/unknown order status — so the webhook
//! path can retry safely without double-applying effects.

pub mod client;
pub mod config;
pub mod order;

pub use client::{HttpLedgerGateway, LedgerError};
pub use config::{ConfigError, LedgerConfig};
pub use order::{
    AssetAction, CreateAssetOrder, OrderReceipt, OrderStatus, OrderStatusView, WebhookEvent,
    WebhookEventKind,
};

use async_trait::async_trait;
use credo_core::{OrderRef, WalletAddress};

/// The order-submission/query seam consumed by the issuance engine.
///
/// Implementations own the signer/payer wallet and target ledger; callers
/// supply only what varies per credential.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Submit an asset-creation order anchoring `imprint` into an asset
    /// with the given id, delivered to `receiver`. The returned receipt
    /// carries the order reference the ledger will report against.
    async fn submit_asset_creation(
        &self,
        asset_id: &str,
        receiver: &WalletAddress,
        imprint: &str,
    ) -> Result<OrderReceipt, LedgerError>;

    /// Query the current status of a previously submitted order.
    async fn order_status(&self, order_ref: &OrderRef) -> Result<OrderStatusView, LedgerError>;
}
