//! Error type for starting and running an HTTP listener.

use std::net::SocketAddr;

use ocimesh_common::ErrorKind;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors starting or running the registry or metrics listener.
///
/// Request-level failures never surface here: a 404 is the handler's only
/// "no answer" signal, so this enum only covers listener startup and the
/// serve loop itself.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to bind the listener socket.
    #[error("failed to bind {0}: {1}")]
    Bind(SocketAddr, #[source] std::io::Error),

    /// The accept loop itself failed.
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

impl Error {
    /// Listener failures are always `Fatal`.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Fatal
    }
}
