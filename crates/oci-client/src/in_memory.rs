//! An in-memory `OciStore`, used by this crate's tests and by downstream
//! integration tests that need a concrete content store without a real
//! container runtime.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use ocimesh_reference::{Digest, Reference};
use tokio::io::AsyncWrite;
use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, RwLock};

use crate::error::{Error, Result};
use crate::store::{ChangeEvent, Inventory, OciStore};

#[derive(Debug, Clone)]
struct Entry {
    bytes: Vec<u8>,
    media_type: String,
}

struct Shared {
    blobs: RwLock<HashMap<Digest, Entry>>,
    tags: RwLock<HashMap<Reference, Digest>>,
    events: RwLock<Option<mpsc::Sender<ChangeEvent>>>,
}

/// An in-memory, `Arc<RwLock<...>>`-backed content store.
///
/// Entries are inserted with [`InMemoryStore::insert_blob`] and
/// [`InMemoryStore::bind_tag`]; insertion also publishes an `Added` event
/// to any active subscriber, mirroring how a real content store would
/// notify on ingest.
#[derive(Clone)]
pub struct InMemoryStore {
    shared: Arc<Shared>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                blobs: RwLock::new(HashMap::new()),
                tags: RwLock::new(HashMap::new()),
                events: RwLock::new(None),
            }),
        }
    }

    /// Insert a blob or manifest's content under `digest`, notifying any
    /// subscriber.
    pub async fn insert_blob(&self, digest: Digest, bytes: Vec<u8>, media_type: impl Into<String>) {
        let key = digest.to_string();
        self.shared.blobs.write().await.insert(
            digest,
            Entry {
                bytes,
                media_type: media_type.into(),
            },
        );
        self.notify(ChangeEvent::Added(key)).await;
    }

    /// Bind a tag-reference to a digest, notifying any subscriber.
    pub async fn bind_tag(&self, reference: Reference, digest: Digest) {
        let key = reference.to_string();
        self.shared.tags.write().await.insert(reference, digest);
        self.notify(ChangeEvent::Added(key)).await;
    }

    /// Remove a blob, notifying any subscriber.
    pub async fn remove_blob(&self, digest: &Digest) {
        self.shared.blobs.write().await.remove(digest);
        self.notify(ChangeEvent::Removed(digest.to_string())).await;
    }

    async fn notify(&self, event: ChangeEvent) {
        if let Some(sender) = self.shared.events.read().await.as_ref() {
            let _ = sender.send(event).await;
        }
    }
}

#[async_trait]
impl OciStore for InMemoryStore {
    async fn list(&self) -> Result<Inventory> {
        let blobs = self.shared.blobs.read().await;
        let tags = self.shared.tags.read().await;
        Ok(Inventory {
            digests: blobs.keys().cloned().collect(),
            references: tags.keys().cloned().collect(),
        })
    }

    async fn subscribe(&self) -> Result<mpsc::Receiver<ChangeEvent>> {
        let (tx, rx) = mpsc::channel(64);
        *self.shared.events.write().await = Some(tx);
        Ok(rx)
    }

    async fn resolve(&self, reference: &Reference) -> Result<Option<Digest>> {
        Ok(self.shared.tags.read().await.get(reference).cloned())
    }

    async fn get_content(&self, digest: &Digest) -> Result<(Vec<u8>, String)> {
        self.shared
            .blobs
            .read()
            .await
            .get(digest)
            .map(|entry| (entry.bytes.clone(), entry.media_type.clone()))
            .ok_or_else(|| Error::not_found(digest.to_string()))
    }

    async fn get_size(&self, digest: &Digest) -> Result<u64> {
        self.shared
            .blobs
            .read()
            .await
            .get(digest)
            .map(|entry| entry.bytes.len() as u64)
            .ok_or_else(|| Error::not_found(digest.to_string()))
    }

    async fn copy(&self, digest: &Digest, sink: &mut (dyn AsyncWrite + Unpin + Send)) -> Result<()> {
        let bytes = {
            let blobs = self.shared.blobs.read().await;
            blobs
                .get(digest)
                .map(|entry| entry.bytes.clone())
                .ok_or_else(|| Error::not_found(digest.to_string()))?
        };
        sink.write_all(&bytes).await?;
        sink.flush().await?;
        Ok(())
    }
}
