//! # Order Types
//!
//! Typed request/response shapes for the ledger order service. Response
//! enums carry a forward-compatible `Unknown` catch-all so a ledger-side
//! vocabulary addition does not break deserialization of unrelated fields.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use credo_core::{OrderRef, WalletAddress};

/// An asset-creation action inside an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetAction {
    /// The asset ledger the asset is created on.
    pub asset_ledger_id: String,
    /// The executing (sending) wallet.
    pub sender_id: WalletAddress,
    /// The receiving wallet — the credential holder.
    pub receiver_id: WalletAddress,
    /// The asset identifier, derived from the credential id.
    pub id: String,
    /// The notarized metadata imprint embedded in the asset.
    pub imprint: String,
}

/// An order submitted to the ledger for asset creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssetOrder {
    /// Wallets that must sign the order.
    pub signers_ids: Vec<WalletAddress>,
    /// The asset-creation actions to perform.
    pub actions: Vec<AssetAction>,
    /// Whether any signer may substitute (always false here).
    pub wildcard_signer: bool,
    /// Whether the ledger performs the order without further interaction.
    pub automated_perform: bool,
    /// The wallet paying for execution.
    pub payer_id: WalletAddress,
}

/// The asynchronous outcome of an order as reported by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Accepted, not yet executed.
    Pending,
    /// Executed successfully.
    Success,
    /// Executed and finalized on the ledger.
    Finalized,
    /// Execution failed.
    Failure,
    /// Canceled before execution.
    Canceled,
    /// Suspended by the ledger.
    Suspended,
    /// Forward-compatible catch-all for statuses introduced after this
    /// client version was deployed.
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Whether the order completed successfully.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success | Self::Finalized)
    }

    /// Whether the order conclusively failed.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure | Self::Canceled | Self::Suspended)
    }
}

/// Receipt returned when an order is accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    /// The reference the ledger will report against.
    #[serde(rename = "ref")]
    pub order_ref: OrderRef,
    /// Status at acceptance time.
    pub status: OrderStatus,
}

/// Current view of a submitted order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusView {
    /// The order reference.
    #[serde(rename = "ref")]
    pub order_ref: OrderRef,
    /// Current status.
    pub status: OrderStatus,
    /// Transaction hash, present once the order executed.
    #[serde(default)]
    pub tx_hash: Option<String>,
}

/// Event kinds delivered to the platform webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WebhookEventKind {
    /// An order's request status changed; the receiver should query the
    /// order for its current state.
    OrderRequestChanged,
    /// Forward-compatible catch-all; unrecognized events are ignored.
    #[serde(other)]
    Unknown,
}

/// A webhook delivery from the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    /// The event kind.
    pub event: WebhookEventKind,
    /// The order reference the event concerns.
    #[schema(value_type = String)]
    pub request_ref: OrderRef,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_statuses() {
        assert!(OrderStatus::Success.is_success());
        assert!(OrderStatus::Finalized.is_success());
        assert!(!OrderStatus::Pending.is_success());
        assert!(!OrderStatus::Failure.is_success());
    }

    #[test]
    fn failure_statuses() {
        assert!(OrderStatus::Failure.is_failure());
        assert!(OrderStatus::Canceled.is_failure());
        assert!(OrderStatus::Suspended.is_failure());
        assert!(!OrderStatus::Success.is_failure());
        assert!(!OrderStatus::Pending.is_failure());
    }

    #[test]
    fn unknown_status_is_neither_success_nor_failure() {
        let status: OrderStatus = serde_json::from_str("\"SOME_FUTURE_STATUS\"").unwrap();
        assert_eq!(status, OrderStatus::Unknown);
        assert!(!status.is_success());
        assert!(!status.is_failure());
    }

    #[test]
    fn webhook_event_deserializes_from_ledger_payload() {
        let event: WebhookEvent = serde_json::from_str(
            r#"{"event":"ORDER_REQUEST_CHANGED","requestRef":"4b4bb1a5-4530-4a52-9b9f-52e80b7b3c24"}"#,
        )
        .unwrap();
        assert_eq!(event.event, WebhookEventKind::OrderRequestChanged);
    }

    #[test]
    fn unrecognized_webhook_event_maps_to_unknown() {
        let event: WebhookEvent = serde_json::from_str(
            r#"{"event":"LEDGER_REORG","requestRef":"4b4bb1a5-4530-4a52-9b9f-52e80b7b3c24"}"#,
        )
        .unwrap();
        assert_eq!(event.event, WebhookEventKind::Unknown);
    }

    #[test]
    fn status_view_tolerates_missing_tx_hash() {
        let view: OrderStatusView = serde_json::from_str(
            r#"{"ref":"4b4bb1a5-4530-4a52-9b9f-52e80b7b3c24","status":"PENDING"}"#,
        )
        .unwrap();
        assert!(view.tx_hash.is_none());
    }
}
