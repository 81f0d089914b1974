//! Error type for reference parsing.

use ocimesh_common::ErrorKind;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned while parsing OCI v2 request paths or digest strings.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The path matched a blobs-endpoint shape but the trailing segment was
    /// not a valid digest. The blobs endpoint requires a digest, never a
    /// tag.
    #[error("blob reference {0:?} is not a valid digest")]
    NotADigest(String),

    /// A digest string failed the `algorithm:hex` grammar.
    #[error("{0:?} is not a well-formed digest")]
    MalformedDigest(String),
}

impl Error {
    /// Construct a [`Error::NotADigest`].
    #[must_use]
    pub fn not_a_digest(reference: impl Into<String>) -> Self {
        Self::NotADigest(reference.into())
    }

    /// Construct a [`Error::MalformedDigest`].
    #[must_use]
    pub fn malformed_digest(digest: impl Into<String>) -> Self {
        Self::MalformedDigest(digest.into())
    }

    /// All parse failures are `NotFound`: an unparseable reference means
    /// "no such endpoint", never a server fault.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::NotFound
    }
}
