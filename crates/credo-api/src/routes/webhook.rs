//! # Ledger Webhook
//!
//! Completes the asynchronous leg of issuance. The ledger reports order
//! outcomes by calling `POST /webhook` with an event and an order
//! reference; the handler re-queries the order (the event payload is not
//! trusted as a source of truth) and applies ISSUING → COMPLETED or
//! ISSUING → ISSUING_FAILED under the atomic guarded write.
//!
//! ## Idempotency
//!
//! Deliveries may repeat or arrive out of order. The credential is looked
//! up by its stored order reference; if it is already in a terminal stage
//! the delivery is absorbed as a no-op rather than re-applying the
//! transition.
//!
//! ## Failure containment
//!
//! A processing failure while applying a confirmed outcome marks the
//! credential ISSUING_FAILED instead of leaving it stuck in ISSUING, so a
//! wedged order is recoverable by re-finalization rather than being a
//! silent permanent failure.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;

use credo_ledger::{WebhookEvent, WebhookEventKind};
use credo_state::TransitionError;

use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

/// Build the webhook router.
pub fn router() -> Router<AppState> {
    Router::new().route("/webhook", post(receive_webhook))
}

/// POST /webhook — receive an order event from the ledger.
///
/// No actor: the ledger is not a profile. Unrecognized event kinds are
/// acknowledged and ignored.
#[utoipa::path(
    post,
    path = "/webhook",
    request_body = WebhookEvent,
    responses(
        (status = 200, description = "Event processed (or ignored)"),
        (status = 404, description = "No credential holds the referenced order", body = crate::error::ErrorBody),
        (status = 502, description = "Ledger status query failed", body = crate::error::ErrorBody),
    ),
    tag = "webhook"
)]
pub(crate) async fn receive_webhook(
    State(state): State<AppState>,
    body: Result<Json<WebhookEvent>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let event = extract_json(body)?;

    if event.event != WebhookEventKind::OrderRequestChanged {
        tracing::debug!(kind = ?event.event, "ignoring unrecognized webhook event");
        return Ok(Json(serde_json::json!({})));
    }

    let gateway = state
        .ledger
        .clone()
        .ok_or_else(|| AppError::System("ledger gateway not configured".into()))?;

    // Suspension point: resolve the order's authoritative status before
    // touching the credential.
    let order = gateway.order_status(&event.request_ref).await?;

    let credential = state
        .credential_by_order_ref(&order.order_ref)
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "no credential holds ledger order {}",
                order.order_ref
            ))
        })?;

    // Duplicate or out-of-order delivery for a settled credential: no-op.
    if credential.stage.is_terminal() {
        tracing::debug!(
            credential_id = %credential.id,
            stage = %credential.stage,
            "webhook for terminal credential absorbed"
        );
        return Ok(Json(serde_json::json!({})));
    }

    if order.status.is_success() {
        let applied = state.credentials.try_update(&credential.id, |c| {
            let next = c.stage.ledger_confirmed()?;
            c.stage = next;
            c.tx_hash = order.tx_hash.clone();
            c.updated_at = Utc::now();
            Ok::<_, TransitionError>(())
        });

        match applied {
            Some(Ok(())) => {
                tracing::info!(credential_id = %credential.id, "credential completed");
            }
            Some(Err(guard)) => {
                // The stage moved between lookup and write. A concurrent
                // terminal transition wins; anything else is a processing
                // failure and the credential is parked recoverable.
                tracing::warn!(credential_id = %credential.id, %guard, "confirmation not applied");
                mark_issuing_failed(&state, &credential.id);
            }
            None => {
                return Err(AppError::NotFound(format!(
                    "credential {} does not exist",
                    credential.id
                )));
            }
        }
    } else if order.status.is_failure() {
        let applied = state.credentials.try_update(&credential.id, |c| {
            let next = c.stage.ledger_failed()?;
            c.stage = next;
            c.updated_at = Utc::now();
            Ok::<_, TransitionError>(())
        });
        if let Some(Ok(())) = applied {
            tracing::info!(credential_id = %credential.id, status = ?order.status, "credential issuing failed");
        }
    }
    // Pending/Unknown statuses carry no outcome yet; acknowledge and wait
    // for the next delivery.

    Ok(Json(serde_json::json!({})))
}

/// Park a credential in ISSUING_FAILED after a processing failure, so it
/// can be re-finalized instead of sitting stuck in ISSUING.
fn mark_issuing_failed(state: &AppState, id: &credo_core::CredentialId) {
    let _ = state.credentials.try_update(id, |c| {
        let next = c.stage.ledger_failed()?;
        c.stage = next;
        c.updated_at = Utc::now();
        Ok::<_, TransitionError>(())
    });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
