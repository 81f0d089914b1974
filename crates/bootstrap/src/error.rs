//! Error type for the `Bootstrapper` collaborator contract.

use ocimesh_common::ErrorKind;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors a `Bootstrapper` implementation may return.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// This variant is not implemented; its control-plane integration is
    /// out of scope.
    #[error("bootstrapper variant not implemented: {0}")]
    Unimplemented(String),

    /// The seed source itself failed (e.g. control-plane API error).
    #[error("bootstrap failed: {0}")]
    Failed(String),
}

impl Error {
    /// All bootstrap failures are `Fatal`: without at least one seed, the
    /// router cannot join the overlay and the process cannot proceed.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Fatal
    }
}
