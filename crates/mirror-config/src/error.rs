//! Error type for reading and writing mirror configuration.

use ocimesh_common::ErrorKind;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reading or writing a mirror-configuration file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to read or write the configuration file.
    #[error("configuration I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file's contents did not parse as valid configuration TOML.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration failed to serialize to TOML.
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl Error {
    /// Map to the shared error-kind taxonomy.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) => ErrorKind::Io,
            Self::Parse(_) | Self::Serialize(_) => ErrorKind::NotFound,
        }
    }
}
