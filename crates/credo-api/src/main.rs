//! # credo-api — Binary Entry Point
//!
//! Starts the Axum HTTP server. Binds to a configurable port (default
//! 8080). The ledger gateway is optional: without `LEDGER_*` configuration
//! the API serves everything except finalization, which returns a system
//! error until a gateway is configured.

use std::sync::Arc;

use credo_api::state::{AppConfig, AppState};
use credo_ledger::{HttpLedgerGateway, LedgerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();
    let port = config.port;
    let mut state = AppState::with_config(config);

    // Attempt to create the ledger gateway from environment.
    match LedgerConfig::from_env() {
        Ok(ledger_config) => {
            let gateway = HttpLedgerGateway::new(ledger_config)?;
            tracing::info!("ledger gateway configured");
            state = state.with_ledger(Arc::new(gateway));
        }
        Err(e) => {
            tracing::warn!("ledger gateway not configured: {e}. Finalization will return 502.");
        }
    }

    let app = credo_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Credo API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
