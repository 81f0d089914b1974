//! Error type for the `Router` contract.

use ocimesh_common::ErrorKind;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors a `Router` implementation may return.
///
/// Note that a deadline elapsing during `resolve` is *not* one of these —
/// it yields `Ok(None)`, not an error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The overlay mechanism failed to initialize or join.
    #[error("router init failed: {0}")]
    InitFailed(String),
}

impl Error {
    /// Router init failures are always `Fatal`.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Fatal
    }
}
