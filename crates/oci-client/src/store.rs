//! The `OciStore` trait: read-only access to the local content store.

use async_trait::async_trait;
use ocimesh_reference::{Digest, Reference};
use tokio::io::AsyncWrite;
use tokio::sync::mpsc;

use crate::error::Result;

/// A snapshot of everything currently resident in the content store for
/// the configured namespace.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    /// Digests (manifests and blobs) currently resident.
    pub digests: Vec<Digest>,
    /// Tag-references currently resident.
    pub references: Vec<Reference>,
}

/// A content-store change notification.
///
/// Events are per-key ordered but not globally ordered, and may be
/// coalesced — the only guarantee is that a digest observed in a
/// `list`/`Added` stays addressable until a matching `Removed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// A digest or reference became resident.
    Added(String),
    /// A digest or reference is no longer resident.
    Removed(String),
}

/// Read-only access to the local content store.
///
/// This is the connection to the container runtime's content-addressable
/// store. A full implementation talking to a real runtime is out of scope
/// here; this crate defines only the contract plus [`InMemoryStore`], a
/// test/demo implementation.
#[async_trait]
pub trait OciStore: Send + Sync {
    /// The current inventory snapshot, filtered by the caller's image
    /// filter before being handed to this trait (the store itself is
    /// unfiltered).
    async fn list(&self) -> Result<Inventory>;

    /// Subscribe to a lazy, restartable stream of change events.
    ///
    /// Returns a channel receiver rather than a boxed `Stream` so
    /// implementations stay object-safe without extra indirection; callers
    /// `recv()` in a loop exactly as they would poll a stream.
    async fn subscribe(&self) -> Result<mpsc::Receiver<ChangeEvent>>;

    /// Map a tag-reference to the digest it currently points at, if any.
    async fn resolve(&self, reference: &Reference) -> Result<Option<Digest>>;

    /// Fetch a manifest or other small object's bytes and media type.
    async fn get_content(&self, digest: &Digest) -> Result<(Vec<u8>, String)>;

    /// Fetch a blob's size without reading its content.
    async fn get_size(&self, digest: &Digest) -> Result<u64>;

    /// Stream a blob to `sink` without buffering the whole blob in memory.
    async fn copy(&self, digest: &Digest, sink: &mut (dyn AsyncWrite + Unpin + Send)) -> Result<()>;
}
