//! The mirror-aware OCI Distribution v2 HTTP front door: capability
//! probe, local manifest/blob serving, and the loop-safe mirror protocol.

mod error;
mod handlers;
mod metrics;
mod mirror;
mod state;

use std::net::SocketAddr;

use axum::routing::{any, get};
use tokio_util::sync::CancellationToken;

pub use error::{Error, Result};
pub use metrics::Metrics;
pub use state::AppState;

/// Build the registry listener's axum router.
#[must_use]
pub fn build_router(state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/v2", any(handlers::capability_probe))
        .route("/v2/", any(handlers::capability_probe))
        .route("/v2/*path", any(handlers::dispatch))
        .layer(tower_http::catch_panic::CatchPanicLayer::new())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Build the metrics listener's axum router.
#[must_use]
pub fn build_metrics_router(metrics: Metrics) -> axum::Router {
    axum::Router::new()
        .route("/metrics", get(handlers::metrics_endpoint))
        .with_state(metrics)
}

/// Serve the registry listener on `addr` until `cancel` fires.
///
/// # Errors
///
/// Returns an error if the listener fails to bind or the accept loop
/// fails.
pub async fn serve_registry(addr: SocketAddr, state: AppState, cancel: CancellationToken) -> Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| Error::Bind(addr, err))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(Error::Serve)
}

/// Serve the metrics listener on `addr` until `cancel` fires.
///
/// # Errors
///
/// Returns an error if the listener fails to bind or the accept loop
/// fails.
pub async fn serve_metrics(addr: SocketAddr, metrics: Metrics, cancel: CancellationToken) -> Result<()> {
    let app = build_metrics_router(metrics);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| Error::Bind(addr, err))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(Error::Serve)
}
