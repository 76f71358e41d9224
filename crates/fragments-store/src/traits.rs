//! The storage gateway: the abstract interface for fragment persistence.
//!
//! Metadata and content are addressed by `(owner_id, fragment_id)`. The
//! facade never assumes more than this trait promises, so any key-value
//! backend can sit behind it.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use fragments_core::{Fragment, FragmentId, OwnerId};

use crate::error::Result;

/// Async interface for fragment persistence.
///
/// Blocking backends hop onto `spawn_blocking` internally so callers never
/// block the runtime.
#[async_trait]
pub trait StorageGateway: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Metadata
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert or replace the metadata of `fragment`.
    async fn put_metadata(&self, owner_id: &OwnerId, fragment: &Fragment) -> Result<()>;

    /// Load metadata, or `None` if the owner has no such fragment.
    async fn get_metadata(&self, owner_id: &OwnerId, id: &FragmentId) -> Result<Option<Fragment>>;

    /// Ids of every fragment the owner has. Order is backend-defined.
    async fn list_ids(&self, owner_id: &OwnerId) -> Result<Vec<FragmentId>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Content
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert or replace the content bytes of a fragment.
    async fn put_content(&self, owner_id: &OwnerId, id: &FragmentId, data: Bytes) -> Result<()>;

    /// Load content bytes, or `None` if none were ever written.
    async fn get_content(&self, owner_id: &OwnerId, id: &FragmentId) -> Result<Option<Bytes>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Combined
    // ─────────────────────────────────────────────────────────────────────────

    /// Remove metadata and content together. Removing a missing fragment is
    /// not an error.
    async fn delete_all(&self, owner_id: &OwnerId, id: &FragmentId) -> Result<()>;

    /// Persist metadata and content as one unit.
    ///
    /// The default writes metadata first and content second; a failure in
    /// between leaves the new metadata next to the old content. Backends
    /// that can do better override this.
    async fn put_fragment(&self, owner_id: &OwnerId, fragment: &Fragment, data: Bytes) -> Result<()> {
        self.put_metadata(owner_id, fragment).await?;
        self.put_content(owner_id, fragment.id(), data).await
    }
}

#[async_trait]
impl<S: StorageGateway + ?Sized> StorageGateway for Arc<S> {
    async fn put_metadata(&self, owner_id: &OwnerId, fragment: &Fragment) -> Result<()> {
        (**self).put_metadata(owner_id, fragment).await
    }

    async fn get_metadata(&self, owner_id: &OwnerId, id: &FragmentId) -> Result<Option<Fragment>> {
        (**self).get_metadata(owner_id, id).await
    }

    async fn list_ids(&self, owner_id: &OwnerId) -> Result<Vec<FragmentId>> {
        (**self).list_ids(owner_id).await
    }

    async fn put_content(&self, owner_id: &OwnerId, id: &FragmentId, data: Bytes) -> Result<()> {
        (**self).put_content(owner_id, id, data).await
    }

    async fn get_content(&self, owner_id: &OwnerId, id: &FragmentId) -> Result<Option<Bytes>> {
        (**self).get_content(owner_id, id).await
    }

    async fn delete_all(&self, owner_id: &OwnerId, id: &FragmentId) -> Result<()> {
        (**self).delete_all(owner_id, id).await
    }

    async fn put_fragment(&self, owner_id: &OwnerId, fragment: &Fragment, data: Bytes) -> Result<()> {
        (**self).put_fragment(owner_id, fragment, data).await
    }
}
