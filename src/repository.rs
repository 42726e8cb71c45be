use crate::record::Record;
use crate::storage::{Modify, Storage, StorageResult};
use std::sync::Arc;

/// Generic pass-through over a storage backend.
///
/// A repository adds no behavior of its own; domain services wrap one to add
/// validation and construction.
pub struct Repository<T: Record> {
    storage: Arc<dyn Storage<T>>,
}

impl<T: Record> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
        }
    }
}

impl<T: Record> Repository<T> {
    pub fn new(storage: Arc<dyn Storage<T>>) -> Self {
        Self { storage }
    }

    /// The backend this repository forwards to.
    pub fn storage(&self) -> &Arc<dyn Storage<T>> {
        &self.storage
    }

    pub async fn get_all(&self) -> StorageResult<Vec<T>> {
        self.storage.get_all().await
    }

    pub async fn get_by_id(&self, id: &str) -> StorageResult<Option<T>> {
        self.storage.get_by_id(id).await
    }

    pub async fn create(&self, record: T) -> StorageResult<T> {
        self.storage.create(record).await
    }

    pub async fn update(&self, id: &str, record: T) -> StorageResult<Option<T>> {
        self.storage.update(id, record).await
    }

    pub async fn update_with(&self, id: &str, modify: Modify<T>) -> StorageResult<Option<T>> {
        self.storage.update_with(id, modify).await
    }

    pub async fn upsert(&self, record: T) -> StorageResult<T> {
        self.storage.upsert(record).await
    }

    pub async fn delete(&self, id: &str) -> StorageResult<bool> {
        self.storage.delete(id).await
    }

    pub async fn clear(&self) -> StorageResult<()> {
        self.storage.clear().await
    }

    pub async fn exists(&self, id: &str) -> StorageResult<bool> {
        self.storage.exists(id).await
    }

    pub async fn count(&self) -> StorageResult<usize> {
        self.storage.count().await
    }
}
