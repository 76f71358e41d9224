//! In-memory implementation of the storage gateway.
//!
//! Same semantics as SQLite but nothing survives a drop. Used by tests and
//! ephemeral deployments.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use bytes::Bytes;
use fragments_core::{Fragment, FragmentId, OwnerId};

use crate::error::{Result, StoreError};
use crate::traits::StorageGateway;

type Key = (OwnerId, FragmentId);

/// In-memory store. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    metadata: HashMap<Key, Fragment>,
    content: HashMap<Key, Bytes>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    /// Number of fragments stored across all owners.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.metadata.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn key(owner_id: &OwnerId, id: &FragmentId) -> Key {
    (owner_id.clone(), id.clone())
}

#[async_trait]
impl StorageGateway for MemoryStore {
    async fn put_metadata(&self, owner_id: &OwnerId, fragment: &Fragment) -> Result<()> {
        let mut inner = self.write()?;
        inner
            .metadata
            .insert(key(owner_id, fragment.id()), fragment.clone());
        Ok(())
    }

    async fn get_metadata(&self, owner_id: &OwnerId, id: &FragmentId) -> Result<Option<Fragment>> {
        let inner = self.read()?;
        Ok(inner.metadata.get(&key(owner_id, id)).cloned())
    }

    async fn list_ids(&self, owner_id: &OwnerId) -> Result<Vec<FragmentId>> {
        let inner = self.read()?;
        let mut owned: Vec<&Fragment> = inner
            .metadata
            .iter()
            .filter(|((owner, _), _)| owner == owner_id)
            .map(|(_, fragment)| fragment)
            .collect();
        owned.sort_by(|a, b| (a.created(), a.id()).cmp(&(b.created(), b.id())));
        Ok(owned.into_iter().map(|f| f.id().clone()).collect())
    }

    async fn put_content(&self, owner_id: &OwnerId, id: &FragmentId, data: Bytes) -> Result<()> {
        let mut inner = self.write()?;
        inner.content.insert(key(owner_id, id), data);
        Ok(())
    }

    async fn get_content(&self, owner_id: &OwnerId, id: &FragmentId) -> Result<Option<Bytes>> {
        let inner = self.read()?;
        Ok(inner.content.get(&key(owner_id, id)).cloned())
    }

    async fn delete_all(&self, owner_id: &OwnerId, id: &FragmentId) -> Result<()> {
        let mut inner = self.write()?;
        let key = key(owner_id, id);
        inner.metadata.remove(&key);
        inner.content.remove(&key);
        Ok(())
    }

    async fn put_fragment(&self, owner_id: &OwnerId, fragment: &Fragment, data: Bytes) -> Result<()> {
        let mut inner = self.write()?;
        let key = key(owner_id, fragment.id());
        inner.metadata.insert(key.clone(), fragment.clone());
        inner.content.insert(key, data);
        Ok(())
    }
}
