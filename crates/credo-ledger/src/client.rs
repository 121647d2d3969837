//! # HTTP Ledger Client
//!
//! `reqwest`-backed implementation of [`LedgerGateway`] against the ledger
//! order service:
//!
//! | Method | Path            | Operation            |
//! |--------|-----------------|----------------------|
//! | POST   | `/orders`       | Submit an order      |
//! | GET    | `/orders/{ref}` | Query order status   |
//!
//! Responses arrive wrapped in a `{ "data": ... }` envelope.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use credo_core::{OrderRef, WalletAddress};

use crate::config::{ConfigError, LedgerConfig};
use crate::order::{AssetAction, CreateAssetOrder, OrderReceipt, OrderStatusView};
use crate::LedgerGateway;

/// Errors from the ledger order service.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Client configuration problem.
    #[error("ledger configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Transport-level failure (connect, timeout, TLS).
    #[error("ledger request failed at {endpoint}: {source}")]
    Http {
        /// The endpoint being called.
        endpoint: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The ledger returned a non-success status.
    #[error("ledger returned {status} at {endpoint}: {body}")]
    Api {
        /// The endpoint being called.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Response body, for operator diagnosis.
        body: String,
    },

    /// The response body did not match the expected shape.
    #[error("ledger response decoding failed at {endpoint}: {source}")]
    Deserialization {
        /// The endpoint being called.
        endpoint: String,
        /// The underlying decode error.
        #[source]
        source: reqwest::Error,
    },

    /// The queried order is unknown to the ledger.
    #[error("ledger order {0} not found")]
    OrderNotFound(OrderRef),
}

/// Response envelope used by the order service.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// `reqwest`-backed ledger gateway.
#[derive(Debug, Clone)]
pub struct HttpLedgerGateway {
    http: reqwest::Client,
    config: LedgerConfig,
}

impl HttpLedgerGateway {
    /// Create a gateway from configuration.
    pub fn new(config: LedgerConfig) -> Result<Self, LedgerError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::AUTHORIZATION,
                    reqwest::header::HeaderValue::from_str(&format!(
                        "Bearer {}",
                        config.api_token
                    ))
                    .map_err(|_| {
                        LedgerError::Config(ConfigError::MissingVar("LEDGER_API_TOKEN"))
                    })?,
                );
                headers
            })
            .build()
            .map_err(|e| LedgerError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self { http, config })
    }

    /// The configured asset ledger id.
    pub fn ledger_id(&self) -> &str {
        &self.config.ledger_id
    }

    /// The configured executor wallet.
    pub fn executor_address(&self) -> &credo_core::WalletAddress {
        &self.config.executor_address
    }

    async fn decode<T: DeserializeOwned>(
        resp: reqwest::Response,
        endpoint: &str,
    ) -> Result<T, LedgerError> {
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(LedgerError::Api {
                endpoint: endpoint.to_string(),
                status,
                body,
            });
        }
        let envelope: Envelope<T> =
            resp.json().await.map_err(|e| LedgerError::Deserialization {
                endpoint: endpoint.to_string(),
                source: e,
            })?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl LedgerGateway for HttpLedgerGateway {
    async fn submit_asset_creation(
        &self,
        asset_id: &str,
        receiver: &WalletAddress,
        imprint: &str,
    ) -> Result<OrderReceipt, LedgerError> {
        let endpoint = "POST /orders";
        let url = format!("{}orders", self.config.api_url);

        let executor = self.config.executor_address.clone();
        let order = CreateAssetOrder {
            signers_ids: vec![executor.clone()],
            actions: vec![AssetAction {
                asset_ledger_id: self.config.ledger_id.clone(),
                sender_id: executor.clone(),
                receiver_id: receiver.clone(),
                id: asset_id.to_string(),
                imprint: imprint.to_string(),
            }],
            wildcard_signer: false,
            automated_perform: true,
            payer_id: executor,
        };

        tracing::debug!(ledger_id = %self.config.ledger_id, asset_id, "submitting asset-creation order");

        let resp = self
            .http
            .post(&url)
            .json(&order)
            .send()
            .await
            .map_err(|e| LedgerError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        let receipt: OrderReceipt = Self::decode(resp, endpoint).await?;
        tracing::info!(order_ref = %receipt.order_ref, "ledger accepted order");
        Ok(receipt)
    }

    async fn order_status(&self, order_ref: &OrderRef) -> Result<OrderStatusView, LedgerError> {
        let endpoint = format!("GET /orders/{order_ref}");
        let url = format!("{}orders/{order_ref}", self.config.api_url);

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| LedgerError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(LedgerError::OrderNotFound(*order_ref));
        }

        Self::decode(resp, &endpoint).await
    }
}
