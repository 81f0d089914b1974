//! The `RegistryHandler` state machine: capability probe, health check,
//! and the MIRROR/SERVE_MANIFEST/SERVE_BLOB/NOT_FOUND dispatch table.

use axum::body::Body;
use axum::extract::{OriginalUri, State};
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use ocimesh_reference::{blob_reference, manifest_reference, Reference};
use tokio_util::io::ReaderStream;
use tracing::warn;

use crate::mirror;
use crate::state::AppState;

/// `GET /healthz`.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// `GET /v2` and `GET /v2/`: the OCI v2 capability probe. Any other method
/// is a miss, not a method-not-allowed.
pub async fn capability_probe(method: Method) -> Response {
    if method == Method::GET {
        StatusCode::OK.into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

fn truthy(headers: &HeaderMap, name: &str) -> bool {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

/// `GET|HEAD /v2/*path`: classify the request and dispatch to the matching
/// state. Any other method, or a missing `X-Remote-Registry` header, is a
/// miss.
pub async fn dispatch(State(state): State<AppState>, method: Method, uri: OriginalUri, headers: HeaderMap) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::NOT_FOUND.into_response();
    }

    let Some(remote_registry) = headers.get("x-remote-registry").and_then(|v| v.to_str().ok()) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let path = uri.0.path();

    if truthy(&headers, "x-mirror") {
        return mirror::handle(&state, method, path, remote_registry, &headers).await;
    }

    if let Ok(Some(reference)) = manifest_reference(remote_registry, path) {
        return serve_manifest(&state, &method, &reference).await;
    }
    match blob_reference(remote_registry, path) {
        Ok(Some(reference)) => serve_blob(&state, &method, &reference).await,
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Serve a manifest from the local content store.
///
/// Tag-valued references are always a miss: resolving a tag to a digest at
/// this layer is not implemented (treated as an open question resolved in
/// favor of "miss until a resolver exists").
pub(crate) async fn serve_manifest(state: &AppState, method: &Method, reference: &Reference) -> Response {
    let Some(digest) = reference.digest() else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match state.oci.get_content(digest).await {
        Ok((bytes, media_type)) => {
            let builder = Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, media_type)
                .header(header::CONTENT_LENGTH, bytes.len())
                .header("Docker-Content-Digest", digest.to_string());

            let body = if *method == Method::HEAD { Body::empty() } else { Body::from(bytes) };
            builder.body(body).unwrap_or_else(|_| StatusCode::NOT_FOUND.into_response())
        }
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Serve a blob from the local content store, streaming the body without
/// buffering the whole thing in memory.
pub(crate) async fn serve_blob(state: &AppState, method: &Method, reference: &Reference) -> Response {
    let digest = reference
        .digest()
        .expect("blob_reference only yields digest-valued references");

    let size = match state.oci.get_size(digest).await {
        Ok(size) => size,
        Err(_) => return StatusCode::NOT_FOUND.into_response(),
    };

    let builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_LENGTH, size)
        .header("Docker-Content-Digest", digest.to_string());

    if *method == Method::HEAD {
        return builder.body(Body::empty()).unwrap_or_else(|_| StatusCode::NOT_FOUND.into_response());
    }

    let (reader, mut writer) = tokio::io::duplex(64 * 1024);
    let oci = state.oci.clone();
    let digest = digest.clone();
    tokio::spawn(async move {
        if let Err(err) = oci.copy(&digest, &mut writer).await {
            warn!(%err, "blob copy failed mid-stream");
        }
    });

    builder
        .body(Body::from_stream(ReaderStream::new(reader)))
        .unwrap_or_else(|_| StatusCode::NOT_FOUND.into_response())
}

/// `/metrics`.
pub async fn metrics_endpoint(State(metrics): State<crate::metrics::Metrics>) -> impl IntoResponse {
    match metrics.render() {
        Ok(body) => body,
        Err(err) => {
            tracing::error!(%err, "failed to render metrics");
            String::new()
        }
    }
}
