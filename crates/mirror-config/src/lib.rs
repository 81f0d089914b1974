//! The mirror-configuration file format: which upstream registries this
//! node serves and which of its peers it is willing to mirror for.

mod error;

use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

pub use error::{Error, Result};

/// The registries and mirror-registries pair persisted to the
/// configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MirrorConfiguration {
    /// Upstream registries this node pulls through for.
    #[serde(default)]
    pub registries: Vec<Url>,
    /// Peer registries this node is willing to mirror requests for.
    #[serde(default)]
    pub mirror_registries: Vec<Url>,
}

impl MirrorConfiguration {
    /// Read a configuration file from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not parse as
    /// valid configuration TOML.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Write this configuration to `path`, overwriting any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the file cannot be
    /// written.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        s.parse().unwrap()
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mirror.toml");

        let original = MirrorConfiguration {
            registries: vec![url("https://docker.io"), url("https://ghcr.io")],
            mirror_registries: vec![url("https://mirror.example.com")],
        };
        original.write(&path).unwrap();

        let read_back = MirrorConfiguration::read(&path).unwrap();
        assert_eq!(read_back, original);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = MirrorConfiguration::read("/nonexistent/mirror.toml").unwrap_err();
        assert_eq!(err.kind(), ocimesh_common::ErrorKind::Io);
    }

    #[test]
    fn empty_configuration_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.toml");

        MirrorConfiguration::default().write(&path).unwrap();
        let read_back = MirrorConfiguration::read(&path).unwrap();
        assert_eq!(read_back, MirrorConfiguration::default());
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "registries = [not valid toml").unwrap();

        let err = MirrorConfiguration::read(&path).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }
}
