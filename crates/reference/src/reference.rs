//! The `Reference` type: a parsed identifier for an image artifact.

use std::fmt;

use crate::digest::Digest;

/// Either half of a reference's identity: a mutable tag or an immutable
/// digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefKind {
    /// A human-assigned, mutable pointer.
    Tag(String),
    /// A content-addressable, immutable pointer.
    Digest(Digest),
}

/// A parsed OCI image reference.
///
/// Invariant: a reference is either digest-valued (content-addressable) or
/// tag-valued, never both and never neither — enforced by `RefKind` being
/// a sum type rather than two optional fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    registry: String,
    repository: String,
    kind: RefKind,
}

impl Reference {
    /// Build a reference from its parts.
    #[must_use]
    pub fn new(registry: impl Into<String>, repository: impl Into<String>, kind: RefKind) -> Self {
        Self {
            registry: registry.into(),
            repository: repository.into(),
            kind,
        }
    }

    /// The registry host (and optional port) this reference was resolved
    /// against.
    #[must_use]
    pub fn registry(&self) -> &str {
        &self.registry
    }

    /// The slash-separated repository path.
    #[must_use]
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// The tag or digest half of this reference.
    #[must_use]
    pub fn kind(&self) -> &RefKind {
        &self.kind
    }

    /// The digest, if this reference is digest-valued.
    ///
    /// Empty (`None`) for a tag reference that has not been bound to a
    /// digest by a prior manifest pull.
    #[must_use]
    pub fn digest(&self) -> Option<&Digest> {
        match &self.kind {
            RefKind::Digest(digest) => Some(digest),
            RefKind::Tag(_) => None,
        }
    }

    /// The advertisement key this reference should be advertised/resolved
    /// under.
    ///
    /// Digest-valued references use the digest's canonical string (stable,
    /// preferred); tag-valued references fall back to the full reference
    /// string.
    #[must_use]
    pub fn advertisement_key(&self) -> String {
        match self.digest() {
            Some(digest) => digest.to_string(),
            None => self.to_string(),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            RefKind::Tag(tag) => write!(f, "{}/{}:{tag}", self.registry, self.repository),
            RefKind::Digest(digest) => write!(f, "{}/{}@{digest}", self.registry, self.repository),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_reference_has_no_digest() {
        let reference = Reference::new("docker.io", "library/nginx", RefKind::Tag("latest".into()));
        assert!(reference.digest().is_none());
        assert_eq!(reference.to_string(), "docker.io/library/nginx:latest");
    }

    #[test]
    fn digest_reference_display_and_key() {
        let digest = Digest::parse(
            "sha256:aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
        )
        .unwrap();
        let reference = Reference::new("docker.io", "foo/bar", RefKind::Digest(digest.clone()));
        assert_eq!(reference.digest(), Some(&digest));
        assert_eq!(reference.advertisement_key(), digest.to_string());
        assert_eq!(
            reference.to_string(),
            "docker.io/foo/bar@sha256:aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
        );
    }

    #[test]
    fn tag_reference_key_is_full_string() {
        let reference = Reference::new("docker.io", "foo/bar", RefKind::Tag("v1".into()));
        assert_eq!(reference.advertisement_key(), reference.to_string());
    }
}
