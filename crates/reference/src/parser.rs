//! Parses OCI Distribution v2 request paths into [`Reference`]s.
//!
//! ```text
//! /v2/{name}/manifests/{reference}
//! /v2/{name}/blobs/{digest}
//! ```
//!
//! `remote_registry` is never recovered from the path — it always comes
//! from the `X-Remote-Registry` request header.

use std::sync::LazyLock;

use regex::Regex;

use crate::digest::Digest;
use crate::error::{Error, Result};
use crate::reference::{RefKind, Reference};

static MANIFEST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/v2/(?P<name>.+)/manifests/(?P<reference>[^/]+)$").expect("valid regex"));

static BLOB_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/v2/(?P<name>.+)/blobs/(?P<reference>[^/]+)$").expect("valid regex"));

fn token_to_kind(token: &str) -> RefKind {
    match Digest::parse(token) {
        Ok(digest) => RefKind::Digest(digest),
        Err(_) => RefKind::Tag(token.to_string()),
    }
}

/// Match a manifests-endpoint path.
///
/// Returns `Ok(None)` when `path` does not have the manifests shape at all
/// — that is not an error, the caller should return 404 without logging a
/// parse failure. The reference token may be either a tag or a digest.
///
/// # Errors
///
/// This function currently never returns `Err`; the `Result` return type
/// matches [`blob_reference`] and [`any_reference`] so all three
/// classifiers share a signature.
pub fn manifest_reference(remote_registry: &str, path: &str) -> Result<Option<Reference>> {
    let Some(captures) = MANIFEST_RE.captures(path) else {
        return Ok(None);
    };
    let name = &captures["name"];
    let token = &captures["reference"];
    Ok(Some(Reference::new(remote_registry, name, token_to_kind(token))))
}

/// Match a blobs-endpoint path.
///
/// Returns `Ok(None)` when `path` does not have the blobs shape at all.
/// Unlike [`manifest_reference`], the trailing segment must be a digest —
/// a blobs path whose trailing segment is a tag-shaped token is a parse
/// error, not a non-match, because the blobs endpoint has no concept of a
/// tag.
///
/// # Errors
///
/// Returns [`Error::NotADigest`] if the path matches the blobs shape but
/// the trailing segment is not a well-formed digest.
pub fn blob_reference(remote_registry: &str, path: &str) -> Result<Option<Reference>> {
    let Some(captures) = BLOB_RE.captures(path) else {
        return Ok(None);
    };
    let name = &captures["name"];
    let token = &captures["reference"];
    let digest = Digest::parse(token).map_err(|_| Error::not_a_digest(token))?;
    Ok(Some(Reference::new(remote_registry, name, RefKind::Digest(digest))))
}

/// Match either shape, preferring the manifests endpoint.
///
/// # Errors
///
/// Propagates [`blob_reference`]'s error when the path has the blobs shape
/// but an invalid digest.
pub fn any_reference(remote_registry: &str, path: &str) -> Result<Option<Reference>> {
    if let Some(reference) = manifest_reference(remote_registry, path)? {
        return Ok(Some(reference));
    }
    blob_reference(remote_registry, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_path_with_digest_matches() {
        let reference = manifest_reference(
            "docker.io",
            "/v2/foo/bar/manifests/sha256:aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
        )
        .unwrap()
        .unwrap();
        assert_eq!(reference.repository(), "foo/bar");
        assert!(reference.digest().is_some());
    }

    #[test]
    fn manifest_path_with_tag_matches() {
        let reference = manifest_reference("docker.io", "/v2/foo/bar/manifests/latest")
            .unwrap()
            .unwrap();
        assert!(reference.digest().is_none());
        assert!(matches!(reference.kind(), RefKind::Tag(tag) if tag == "latest"));
    }

    #[test]
    fn manifest_path_mismatch_is_not_an_error() {
        assert!(manifest_reference("docker.io", "/v2/foo/bar/blobs/sha256:aa").unwrap().is_none());
        assert!(manifest_reference("docker.io", "/healthz").unwrap().is_none());
    }

    #[test]
    fn blob_path_requires_digest() {
        let err = blob_reference("docker.io", "/v2/foo/bar/blobs/latest").unwrap_err();
        assert!(matches!(err, Error::NotADigest(_)));
    }

    #[test]
    fn blob_path_with_digest_matches() {
        let reference = blob_reference(
            "docker.io",
            "/v2/foo/bar/blobs/sha256:bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb",
        )
        .unwrap()
        .unwrap();
        assert_eq!(reference.repository(), "foo/bar");
    }

    #[test]
    fn any_reference_tries_manifest_then_blob() {
        assert!(any_reference("docker.io", "/v2/foo/bar/manifests/latest").unwrap().is_some());
        assert!(any_reference(
            "docker.io",
            "/v2/foo/bar/blobs/sha256:cccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccc"
        )
        .unwrap()
        .is_some());
        assert!(any_reference("docker.io", "/not/a/v2/path").unwrap().is_none());
    }

    #[test]
    fn any_reference_propagates_blob_digest_error() {
        assert!(any_reference("docker.io", "/v2/foo/bar/blobs/latest").is_err());
    }

    #[test]
    fn name_with_nested_path_segments() {
        let reference = manifest_reference("docker.io", "/v2/a/b/c/manifests/v1")
            .unwrap()
            .unwrap();
        assert_eq!(reference.repository(), "a/b/c");
    }
}
