//! Reconciles the local content store's inventory against the peer
//! router: advertises what is resident, stays advertised as new content
//! arrives, and heals itself after a subscription failure.

mod error;

use std::sync::Arc;
use std::time::Duration;

use ocimesh_common::ImageFilter;
use ocimesh_oci_client::{ChangeEvent, OciStore};
use ocimesh_reference::Digest;
use ocimesh_router::Router;
use tokio_util::sync::CancellationToken;
use tracing::warn;

pub use error::{Error, Result};

/// Tuning for the resubscribe backoff.
#[derive(Debug, Clone, Copy)]
pub struct TrackerConfig {
    /// Delay before the first resubscribe attempt after a stream failure.
    pub backoff_floor: Duration,
    /// Upper bound the backoff delay is capped at.
    pub backoff_cap: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            backoff_floor: Duration::from_secs(1),
            backoff_cap: Duration::from_secs(30),
        }
    }
}

enum Outcome {
    Canceled,
    StreamEnded,
}

/// Run the reconciliation loop until `cancel` fires.
///
/// Snapshots the store's inventory and advertises it, then follows the
/// store's change stream, advertising each addition as it arrives.
/// A stream failure triggers a fresh snapshot-and-resubscribe after an
/// exponential backoff, floored and capped by `config`. Cancellation at
/// any point returns `Ok(())`, never an error.
pub async fn track(
    cancel: CancellationToken,
    oci: Arc<dyn OciStore>,
    router: Arc<dyn Router>,
    image_filter: ImageFilter,
    config: TrackerConfig,
) -> Result<()> {
    let mut backoff = config.backoff_floor;

    loop {
        if cancel.is_cancelled() {
            return Ok(());
        }

        match run_once(&cancel, oci.as_ref(), router.as_ref(), &image_filter).await {
            Ok(Outcome::Canceled) => return Ok(()),
            Ok(Outcome::StreamEnded) => warn!("content store subscription ended, resubscribing"),
            Err(err) => warn!(%err, "tracker iteration failed, retrying"),
        }

        tokio::select! {
            () = cancel.cancelled() => return Ok(()),
            () = tokio::time::sleep(backoff) => {}
        }
        backoff = (backoff * 2).min(config.backoff_cap);
    }
}

async fn run_once(
    cancel: &CancellationToken,
    oci: &dyn OciStore,
    router: &dyn Router,
    image_filter: &ImageFilter,
) -> Result<Outcome> {
    snapshot_and_advertise(oci, router, image_filter).await?;

    let mut events = oci.subscribe().await.map_err(|err| Error::failed(err.to_string()))?;

    loop {
        tokio::select! {
            () = cancel.cancelled() => return Ok(Outcome::Canceled),
            event = events.recv() => {
                match event {
                    Some(ChangeEvent::Added(key)) => {
                        if should_advertise(&key, image_filter) {
                            router
                                .advertise(&[key])
                                .await
                                .map_err(|err| Error::failed(err.to_string()))?;
                        }
                    }
                    // No explicit unadvertise: the router learns of removal
                    // through its own liveness mechanism, not this loop.
                    Some(ChangeEvent::Removed(_)) => {}
                    None => return Ok(Outcome::StreamEnded),
                }
            }
        }
    }
}

async fn snapshot_and_advertise(oci: &dyn OciStore, router: &dyn Router, image_filter: &ImageFilter) -> Result<()> {
    let inventory = oci.list().await.map_err(|err| Error::failed(err.to_string()))?;

    let mut keys: Vec<String> = inventory.digests.iter().map(ToString::to_string).collect();
    keys.extend(
        inventory
            .references
            .iter()
            .map(ToString::to_string)
            .filter(|reference| image_filter.matches(reference)),
    );

    if keys.is_empty() {
        return Ok(());
    }

    router.advertise(&keys).await.map_err(|err| Error::failed(err.to_string()))
}

/// Digests are content-addressable and advertised unconditionally; only
/// reference (tag) keys are subject to the image filter, matched against
/// the full reference string.
fn should_advertise(key: &str, image_filter: &ImageFilter) -> bool {
    Digest::parse(key).is_ok() || image_filter.matches(key)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use ocimesh_oci_client::InMemoryStore;
    use ocimesh_reference::{RefKind, Reference};
    use ocimesh_router::GossipRouter;

    use super::*;

    fn digest(byte: char) -> Digest {
        Digest::parse(format!("sha256:{}", byte.to_string().repeat(64))).unwrap()
    }

    fn peer() -> ocimesh_common::PeerRecord {
        ocimesh_common::PeerRecord::new("10.0.0.1".parse().unwrap())
    }

    #[derive(Default)]
    struct RecordingRouter {
        advertised: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Router for RecordingRouter {
        async fn advertise(&self, keys: &[String]) -> ocimesh_router::Result<()> {
            self.advertised.lock().unwrap().extend(keys.iter().cloned());
            Ok(())
        }

        async fn resolve(
            &self,
            _key: &str,
            _allow_self: bool,
            _timeout: Duration,
        ) -> ocimesh_router::Result<Option<ocimesh_common::PeerRecord>> {
            Ok(None)
        }

        fn local(&self) -> ocimesh_common::PeerRecord {
            peer()
        }

        async fn close(&self) {}
    }

    #[tokio::test]
    async fn returns_ok_immediately_when_already_canceled() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let oci = Arc::new(InMemoryStore::new());
        let router = Arc::new(GossipRouter::new(peer()));

        let result = track(cancel, oci, router, ImageFilter::match_all(), TrackerConfig::default()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn snapshot_advertises_resident_digest() {
        let oci = InMemoryStore::new();
        oci.insert_blob(digest('a'), b"x".to_vec(), "application/octet-stream").await;
        let router = Arc::new(RecordingRouter::default());
        let cancel = CancellationToken::new();

        snapshot_and_advertise(&oci, router.as_ref(), &ImageFilter::match_all())
            .await
            .unwrap();

        assert_eq!(router.advertised.lock().unwrap().as_slice(), &[digest('a').to_string()]);
        drop(cancel);
    }

    #[tokio::test]
    async fn snapshot_filters_out_non_matching_reference() {
        let oci = InMemoryStore::new();
        let reference = Reference::new("docker.io", "library/nginx", RefKind::Tag("latest".into()));
        oci.bind_tag(reference.clone(), digest('b')).await;
        let router = RecordingRouter::default();

        let filter = ImageFilter::parse("ghcr.io/*").unwrap();
        snapshot_and_advertise(&oci, &router, &filter).await.unwrap();

        assert!(router.advertised.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_advertise_allows_digests_regardless_of_filter() {
        let filter = ImageFilter::parse("ghcr.io/*").unwrap();
        assert!(should_advertise(&digest('c').to_string(), &filter));
    }

    #[tokio::test]
    async fn should_advertise_filters_reference_strings() {
        let filter = ImageFilter::parse("ghcr.io/*").unwrap();
        assert!(!should_advertise("docker.io/library/nginx:latest", &filter));
        assert!(should_advertise("ghcr.io/foo/bar:v1", &filter));
    }

    #[tokio::test]
    async fn added_event_advertises_new_key() {
        let oci = Arc::new(InMemoryStore::new());
        let router = Arc::new(RecordingRouter::default());
        let cancel = CancellationToken::new();

        let tracker_cancel = cancel.clone();
        let tracker_oci = oci.clone();
        let tracker_router = router.clone();
        let handle = tokio::spawn(async move {
            track(
                tracker_cancel,
                tracker_oci,
                tracker_router,
                ImageFilter::match_all(),
                TrackerConfig::default(),
            )
            .await
        });

        // Give the tracker a moment to snapshot and subscribe before the
        // insert, so the Added event arrives over the live subscription
        // rather than being missed entirely.
        tokio::time::sleep(Duration::from_millis(20)).await;
        oci.insert_blob(digest('d'), b"y".to_vec(), "application/octet-stream").await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        cancel.cancel();
        handle.await.unwrap().unwrap();

        assert!(router.advertised.lock().unwrap().contains(&digest('d').to_string()));
    }
}
