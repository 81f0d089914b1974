//! The `Bootstrapper` collaborator contract: a one-shot source of seed peer
//! addresses for joining the overlay.

mod error;

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub use error::{Error, Result};

/// A one-shot source of seed addresses.
///
/// The leader-elected control-plane bootstrapper is one variant of
/// `{Static, LeaderElected, DNS, ...}`; this trait is the capability
/// interface all of them implement.
#[async_trait]
pub trait Bootstrapper: Send + Sync {
    /// Attempt once to fetch seed addresses. May return an empty `Vec`;
    /// callers are expected to retry (see [`get_with_retry`]) until a
    /// non-empty result or cancellation.
    async fn get(&self) -> Result<Vec<IpAddr>>;
}

/// A fixed list of seed addresses, for tests and simple static deployments.
#[derive(Debug, Clone, Default)]
pub struct StaticSeeds(pub Vec<IpAddr>);

#[async_trait]
impl Bootstrapper for StaticSeeds {
    async fn get(&self) -> Result<Vec<IpAddr>> {
        Ok(self.0.clone())
    }
}

/// Leader-elected bootstrapper backed by a shared control plane.
///
/// Uses leader election over a `(namespace, name)` lease so exactly one
/// node publishes its own address as the canonical seed, with the lease
/// renewing and a new node publishing on leader loss. The control-plane
/// integration itself is an out-of-scope external collaborator; this type
/// records the configuration it would need and always fails until one is
/// wired in.
#[derive(Debug, Clone)]
pub struct LeaderElected {
    /// Control-plane namespace the leader lease lives in.
    pub namespace: String,
    /// Lease/lock name within the namespace.
    pub name: String,
}

#[async_trait]
impl Bootstrapper for LeaderElected {
    async fn get(&self) -> Result<Vec<IpAddr>> {
        Err(Error::Unimplemented(format!(
            "leader-elected bootstrap for {}/{}",
            self.namespace, self.name
        )))
    }
}

/// Poll `bootstrapper` until it returns a non-empty address list or
/// `cancel` fires, backing off between attempts.
///
/// Retries at a fixed interval, bounded by cancellation rather than an
/// attempt counter: there is no cap on the number of attempts, only on how
/// long the caller is willing to wait.
pub async fn get_with_retry(
    bootstrapper: &dyn Bootstrapper,
    cancel: &CancellationToken,
    retry_interval: Duration,
) -> Option<Vec<IpAddr>> {
    loop {
        match bootstrapper.get().await {
            Ok(addrs) if !addrs.is_empty() => return Some(addrs),
            Ok(_) => debug!("bootstrapper returned no seeds yet, retrying"),
            Err(err) => warn!(%err, "bootstrap attempt failed, retrying"),
        }

        tokio::select! {
            () = cancel.cancelled() => return None,
            () = tokio::time::sleep(retry_interval) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_seeds_returns_configured_addrs() {
        let addr: IpAddr = "10.0.0.1".parse().unwrap();
        let bootstrapper = StaticSeeds(vec![addr]);
        assert_eq!(bootstrapper.get().await.unwrap(), vec![addr]);
    }

    #[tokio::test]
    async fn leader_elected_is_unimplemented() {
        let bootstrapper = LeaderElected {
            namespace: "cluster".into(),
            name: "ocimesh".into(),
        };
        let err = bootstrapper.get().await.unwrap_err();
        assert!(matches!(err, Error::Unimplemented(_)));
        assert_eq!(err.kind(), ocimesh_common::ErrorKind::Fatal);
    }

    #[tokio::test]
    async fn get_with_retry_returns_immediately_when_non_empty() {
        let addr: IpAddr = "10.0.0.2".parse().unwrap();
        let bootstrapper = StaticSeeds(vec![addr]);
        let cancel = CancellationToken::new();

        let result = get_with_retry(&bootstrapper, &cancel, Duration::from_millis(1)).await;
        assert_eq!(result, Some(vec![addr]));
    }

    #[tokio::test]
    async fn get_with_retry_stops_on_cancellation() {
        let bootstrapper = StaticSeeds::default();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = get_with_retry(&bootstrapper, &cancel, Duration::from_secs(30)).await;
        assert_eq!(result, None);
    }
}
