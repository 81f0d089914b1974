//! Shared state handed to every axum handler.

use std::sync::Arc;

use ocimesh_oci_client::OciStore;
use ocimesh_router::Router;

use crate::metrics::Metrics;

/// Everything a request handler needs: the local content store, the peer
/// router, an HTTP client for forwarding, this node's own registry port,
/// and the metrics registry.
#[derive(Clone)]
pub struct AppState {
    /// Local content-store access.
    pub oci: Arc<dyn OciStore>,
    /// Peer directory used to resolve mirror requests.
    pub router: Arc<dyn Router>,
    /// Client used to reverse-proxy mirror requests to a resolved peer.
    pub http_client: reqwest::Client,
    /// This node's own registry listener port; peers are assumed
    /// homogeneous, so a resolved peer is dialed on the same port.
    pub registry_port: u16,
    /// Prometheus counters for the mirror protocol.
    pub metrics: Metrics,
}
