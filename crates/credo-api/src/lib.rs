//! # credo-api — Axum HTTP Surface for the Credo Platform
//!
//! The orchestration layer over the pure domain crates: `credo-auth`
//! decides permissions, `credo-state` decides transitions, `credo-notary`
//! derives imprints, and `credo-ledger` talks to the external ledger. This
//! crate wires them to HTTP.
//!
//! ## API Surface
//!
//! | Prefix                  | Module                    | Domain                     |
//! |-------------------------|---------------------------|----------------------------|
//! | `/profiles`, `/profile` | [`routes::profiles`]      | Account holders            |
//! | `/communities/*`        | [`routes::communities`]   | Issuers, keys, grants      |
//! | `/achievements/*`       | [`routes::achievements`]  | Qualification definitions  |
//! | `/credentials/*`        | [`routes::credentials`]   | Issuance lifecycle         |
//! | `/webhook`              | [`routes::webhook`]       | Ledger callbacks           |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → AuthMiddleware → Handler
//! ```

pub mod auth;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

#[cfg(test)]
pub(crate) mod testutil;

use axum::middleware::from_fn_with_state;
use axum::Router;

use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) are mounted outside the auth middleware so
/// they remain accessible without credentials; the webhook and public
/// notarization reads sit inside it but accept anonymous actors.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::profiles::router())
        .merge(routes::communities::router())
        .merge(routes::achievements::router())
        .merge(routes::credentials::router())
        .merge(routes::webhook::router())
        .merge(openapi::router())
        .layer(from_fn_with_state(state.clone(), auth::auth_middleware))
        .layer(middleware::tracing_layer::layer())
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — returns 200 when the application is ready to serve.
async fn readiness() -> &'static str {
    "ready"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_probes_need_no_credentials() {
        let app = app(AppState::new());
        for path in ["/health/liveness", "/health/readiness"] {
            let resp = app
                .clone()
                .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::OK, "probe {path}");
        }
    }

    #[tokio::test]
    async fn openapi_spec_is_served() {
        let app = app(AppState::new());
        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
