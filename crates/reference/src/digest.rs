//! Content digests.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

static DIGEST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9_+.-]*[A-Za-z0-9])?:[A-Fa-f0-9]{32,}$")
        .expect("digest regex is valid")
});

/// An algorithm-prefixed content digest, e.g. `sha256:...`.
///
/// Digests are opaque to the router: equality is byte equality on the
/// canonical string form, nothing more.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest(String);

impl Digest {
    /// Parse and validate a digest string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedDigest`] if `value` does not match the
    /// `algorithm:hex` grammar.
    pub fn parse(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if DIGEST_RE.is_match(&value) {
            Ok(Self(value))
        } else {
            Err(Error::malformed_digest(value))
        }
    }

    /// The canonical string form, e.g. `sha256:abc...`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_sha256_digest() {
        let digest =
            Digest::parse("sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
                .unwrap();
        assert_eq!(digest.as_str(), "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855");
    }

    #[test]
    fn rejects_missing_algorithm() {
        assert!(Digest::parse("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855").is_err());
    }

    #[test]
    fn rejects_short_hex() {
        assert!(Digest::parse("sha256:abc123").is_err());
    }

    #[test]
    fn equality_is_byte_equality() {
        let a = Digest::parse("sha256:aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa").unwrap();
        let b = Digest::parse("sha256:aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa").unwrap();
        assert_eq!(a, b);
    }
}
