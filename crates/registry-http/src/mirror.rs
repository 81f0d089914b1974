//! The mirror protocol: resolve a peer for a requested key and reverse
//! proxy to it, with the loop-prevention header downgrade.

use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use ocimesh_common::PeerRecord;
use ocimesh_reference::Reference;
use tracing::warn;

use crate::handlers;
use crate::state::AppState;

const RESOLVE_TIMEOUT: Duration = Duration::from_secs(5);

fn truthy(value: Option<&HeaderValue>) -> bool {
    value
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

/// Classify `path` the same way `handlers::dispatch` does outside mirror
/// mode, keeping the manifest-vs-blob distinction `any_reference` would
/// otherwise discard — a self-match needs to know which endpoint to serve
/// locally.
fn classify(remote_registry: &str, path: &str) -> Option<(Reference, bool)> {
    if let Ok(Some(reference)) = ocimesh_reference::manifest_reference(remote_registry, path) {
        return Some((reference, true));
    }
    match ocimesh_reference::blob_reference(remote_registry, path) {
        Ok(Some(reference)) => Some((reference, false)),
        _ => None,
    }
}

/// Handle a request classified `MIRROR`.
pub async fn handle(state: &AppState, method: Method, path: &str, remote_registry: &str, headers: &HeaderMap) -> Response {
    let Some((reference, is_manifest)) = classify(remote_registry, path) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let key = reference.advertisement_key();

    let external = truthy(headers.get("x-external"));
    let source = if external { "external" } else { "internal" };
    if external {
        warn!(%key, "serving external mirror request, allowing self-resolution");
    }

    let peer = match state.router.resolve(&key, external, RESOLVE_TIMEOUT).await {
        Ok(Some(peer)) => peer,
        Ok(None) => {
            state.metrics.record_mirror_request(remote_registry, "miss", source);
            return StatusCode::NOT_FOUND.into_response();
        }
        Err(err) => {
            warn!(%err, "router resolve failed");
            state.metrics.record_mirror_request(remote_registry, "miss", source);
            return StatusCode::NOT_FOUND.into_response();
        }
    };

    // On self-match, serve locally rather than reverse-proxying to
    // ourselves over HTTP.
    let response = if peer == state.router.local() {
        if is_manifest {
            handlers::serve_manifest(state, &method, &reference).await
        } else {
            handlers::serve_blob(state, &method, &reference).await
        }
    } else {
        forward(state, &peer, method, path, headers).await
    };
    let cache = if response.status() == StatusCode::OK { "hit" } else { "miss" };
    state.metrics.record_mirror_request(remote_registry, cache, source);
    response
}

/// Reverse-proxy to `peer`. The `X-Mirror` downgrade is the first
/// statement so no early return in this function can skip it — it is the
/// sole guard against infinite mirror-to-mirror forwarding.
async fn forward(state: &AppState, peer: &PeerRecord, method: Method, path: &str, headers: &HeaderMap) -> Response {
    let mut outgoing_headers = headers.clone();
    outgoing_headers.insert("x-mirror", HeaderValue::from_static("false"));

    let url = format!("http://{}:{}{path}", peer.addr, state.registry_port);

    let request = state.http_client.request(method, url).headers(outgoing_headers);

    match request.send().await {
        Ok(upstream) => relay(upstream),
        Err(err) => {
            warn!(%err, "mirror forward to peer failed");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

/// Stream a peer's response back to the original caller without buffering
/// the whole body.
fn relay(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let mut builder = Response::builder().status(status);
    for (name, value) in upstream.headers() {
        builder = builder.header(name, value);
    }
    builder
        .body(Body::from_stream(upstream.bytes_stream()))
        .unwrap_or_else(|_| StatusCode::NOT_FOUND.into_response())
}
