//! Error type for the inventory-to-router reconciliation loop.

use ocimesh_common::ErrorKind;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors the tracker loop may surface.
///
/// Transient failures talking to the content store or the router are
/// absorbed internally (logged, retried with backoff); this enum only
/// covers failures a caller needs to see.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The content store or router failed in a way the retry loop gave up
    /// on recovering from.
    #[error("tracker loop failed: {0}")]
    Failed(String),
}

impl Error {
    /// Construct a [`Error::Failed`].
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Tracker failures are always `Fatal`.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Fatal
    }
}
