//! Shared types used across the ocimesh workspace.
//!
//! Kept deliberately small: every other crate in the workspace depends on
//! this one, so anything added here becomes a compile-time dependency for
//! the whole mirror.

use std::net::IpAddr;

use glob::Pattern;

/// The four error kinds the core relies on when deciding HTTP status,
/// log level, and process-exit behavior.
///
/// Every crate's own `Error` type exposes a `kind()` method returning one
/// of these, so callers that only care about dispatch (the HTTP layer, the
/// supervisor) don't need to match on concrete per-crate error enums.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Reference unparseable, key unresolvable, or the content store had no
    /// matching entry. Maps to HTTP 404, logged below warn.
    NotFound,
    /// Transient network or store failure while serving a request. Maps to
    /// HTTP 404, logged at warn.
    Io,
    /// Unrecoverable startup failure (listener bind, router init, content
    /// store connect). Propagates, cancels peer tasks, process exits 1.
    Fatal,
    /// Root cancellation token fired. Not an error at process scope.
    Canceled,
}

/// A routable peer address in the overlay.
///
/// Peer records are ephemeral: they appear when a peer advertises a key and
/// disappear when the peer leaves the overlay or stops advertising, which
/// is why this type carries no identity beyond the address itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeerRecord {
    /// The peer's routable IP address.
    pub addr: IpAddr,
}

impl PeerRecord {
    /// Build a peer record from a routable address.
    #[must_use]
    pub fn new(addr: IpAddr) -> Self {
        Self { addr }
    }
}

/// An inclusive glob-style pattern over image reference strings.
///
/// `None` (the default) matches everything. A configured filter is matched
/// against the *full* reference string (`registry/repository:tag` or
/// `registry/repository@digest`), not just the repository path.
#[derive(Debug, Clone, Default)]
pub struct ImageFilter {
    pattern: Option<Pattern>,
}

impl ImageFilter {
    /// Parse a glob pattern into an image filter.
    ///
    /// # Errors
    ///
    /// Returns an error if `pattern` is not a valid glob.
    pub fn parse(pattern: &str) -> Result<Self, glob::PatternError> {
        Ok(Self {
            pattern: Some(Pattern::new(pattern)?),
        })
    }

    /// A filter that matches every reference.
    #[must_use]
    pub fn match_all() -> Self {
        Self { pattern: None }
    }

    /// Whether `reference` (a full reference string) matches this filter.
    #[must_use]
    pub fn matches(&self, reference: &str) -> bool {
        self.pattern
            .as_ref()
            .is_none_or(|pattern| pattern.matches(reference))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_all_matches_everything() {
        let filter = ImageFilter::match_all();
        assert!(filter.matches("docker.io/library/nginx:latest"));
        assert!(filter.matches("anything"));
    }

    #[test]
    fn glob_filter_matches_pattern() {
        let filter = ImageFilter::parse("docker.io/library/*").unwrap();
        assert!(filter.matches("docker.io/library/nginx:latest"));
        assert!(!filter.matches("ghcr.io/other/nginx:latest"));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        assert!(ImageFilter::parse("[").is_err());
    }

    #[test]
    fn peer_record_carries_addr() {
        let addr: IpAddr = "10.0.0.7".parse().unwrap();
        let peer = PeerRecord::new(addr);
        assert_eq!(peer.addr, addr);
    }
}
