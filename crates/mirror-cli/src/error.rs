//! Top-level error type aggregating each subsystem's failures.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ocimesh_config::Error),
    #[error(transparent)]
    RegistryHttp(#[from] ocimesh_registry_http::Error),
    #[error(transparent)]
    Tracker(#[from] ocimesh_tracker::Error),
    #[error("invalid image filter pattern: {0}")]
    ImageFilter(#[from] glob::PatternError),
    #[error("component task panicked: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, Error>;
