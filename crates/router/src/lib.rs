//! The `Router` contract: a content-addressable peer directory.
//!
//! The router is an interface, not a protocol — an implementer may choose
//! a DHT, a gossip overlay, or a centralized directory, as long as the
//! `advertise`/`resolve`/`allow_self`/timeout contract holds.
//! [`GossipRouter`] satisfies the contract with an in-process directory;
//! the gossip/DHT mechanism a production deployment would need to
//! propagate advertisements across nodes is left as a black box.

mod error;
pub mod testing;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ocimesh_common::PeerRecord;
use tokio::sync::RwLock;

pub use error::{Error, Result};

/// A content-addressable peer directory.
#[async_trait]
pub trait Router: Send + Sync {
    /// Declare that this node can serve `keys`. Idempotent and additive.
    async fn advertise(&self, keys: &[String]) -> Result<()>;

    /// Return one peer advertising `key`, honoring `timeout`.
    ///
    /// Must not return this node when `allow_self` is `false`. A timeout
    /// elapsing yields `Ok(None)`, never an error.
    async fn resolve(&self, key: &str, allow_self: bool, timeout: Duration) -> Result<Option<PeerRecord>>;

    /// This node's own peer record.
    ///
    /// Lets a caller holding only `Arc<dyn Router>` recognize a resolved
    /// peer as itself, without relying on `allow_self` alone.
    fn local(&self) -> PeerRecord;

    /// Quiesce the overlay. After this, `advertise`/`resolve` are no-ops;
    /// `resolve` always returns `Ok(None)`.
    async fn close(&self);
}

struct Shared {
    local: PeerRecord,
    directory: RwLock<HashMap<String, HashSet<PeerRecord>>>,
    closed: RwLock<bool>,
}

/// An in-process directory standing in for the gossip/DHT overlay.
#[derive(Clone)]
pub struct GossipRouter {
    shared: Arc<Shared>,
}

impl GossipRouter {
    /// Create a router identifying itself as `local` to peers.
    #[must_use]
    pub fn new(local: PeerRecord) -> Self {
        Self {
            shared: Arc::new(Shared {
                local,
                directory: RwLock::new(HashMap::new()),
                closed: RwLock::new(false),
            }),
        }
    }

    async fn resolve_now(&self, key: &str, allow_self: bool) -> Option<PeerRecord> {
        let directory = self.shared.directory.read().await;
        let Some(peers) = directory.get(key) else {
            return None;
        };
        peers
            .iter()
            .find(|peer| allow_self || **peer != self.shared.local)
            .copied()
    }
}

#[async_trait]
impl Router for GossipRouter {
    async fn advertise(&self, keys: &[String]) -> Result<()> {
        if *self.shared.closed.read().await {
            return Ok(());
        }
        let mut directory = self.shared.directory.write().await;
        for key in keys {
            directory
                .entry(key.clone())
                .or_default()
                .insert(self.shared.local);
        }
        Ok(())
    }

    async fn resolve(&self, key: &str, allow_self: bool, timeout: Duration) -> Result<Option<PeerRecord>> {
        if *self.shared.closed.read().await {
            return Ok(None);
        }
        match tokio::time::timeout(timeout, self.resolve_now(key, allow_self)).await {
            Ok(peer) => Ok(peer),
            Err(_elapsed) => Ok(None),
        }
    }

    fn local(&self) -> PeerRecord {
        self.shared.local
    }

    async fn close(&self) {
        *self.shared.closed.write().await = true;
    }
}
