//! Error type for the `OCIClient` collaborator contract.

use ocimesh_common::ErrorKind;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors an `OciStore` implementation may return.
///
/// Only three kinds apply here: `NotFound`, `Io`, and `Canceled` — a
/// content-store collaborator has no `Fatal` case of its own (connection
/// failure at startup is the caller's `Fatal`, not this crate's).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No matching digest, reference, or entry in the content store.
    #[error("not found: {0}")]
    NotFound(String),

    /// Transient I/O failure talking to the content store.
    #[error("content store I/O error: {0}")]
    Io(String),

    /// The caller's cancellation token fired mid-operation.
    #[error("operation canceled")]
    Canceled,
}

impl Error {
    /// Construct a [`Error::NotFound`].
    #[must_use]
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Construct a [`Error::Io`].
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(message.into())
    }

    /// Map to the shared error-kind taxonomy.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Io(_) => ErrorKind::Io,
            Self::Canceled => ErrorKind::Canceled,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
