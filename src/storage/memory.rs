use super::storage_trait::{
    Modify, Storage, StorageError, StorageFeature, StorageMetadata, StorageResult,
    ensure_matching_id,
};
use crate::record::{Collection, Record};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// In-memory storage backend.
///
/// Keeps records in process memory without persistence. Useful for testing
/// and scenarios where persistence is not required.
#[derive(Debug)]
pub struct MemoryStorage<T> {
    records: RwLock<Collection<T>>,
    /// Storage metadata
    metadata: StorageMetadata,
}

impl<T: Record> MemoryStorage<T> {
    /// Create a new empty MemoryStorage.
    pub fn new() -> Self {
        Self::from_collection(Collection::new())
    }

    /// Create a MemoryStorage pre-populated with records.
    ///
    /// Later records replace earlier ones with the same ID.
    pub fn with_records(records: impl IntoIterator<Item = T>) -> Self {
        Self::from_collection(records.into_iter().collect())
    }

    fn from_collection(records: Collection<T>) -> Self {
        let metadata = StorageMetadata::new("memory", env!("CARGO_PKG_VERSION"))
            .with_feature(StorageFeature::ConcurrentReads)
            .with_feature(StorageFeature::ConcurrentWrites)
            .with_property("volatile", "true");

        Self {
            records: RwLock::new(records),
            metadata,
        }
    }
}

impl<T: Record> Default for MemoryStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Record> Storage<T> for MemoryStorage<T> {
    async fn get_all(&self) -> StorageResult<Vec<T>> {
        Ok(self.records.read().await.iter().cloned().collect())
    }

    async fn get_by_id(&self, id: &str) -> StorageResult<Option<T>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn create(&self, record: T) -> StorageResult<T> {
        self.records.write().await.insert(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &str, record: T) -> StorageResult<Option<T>> {
        ensure_matching_id(id, &record)?;
        let mut records = self.records.write().await;
        if !records.contains(id) {
            return Ok(None);
        }
        records.insert(record.clone());
        Ok(Some(record))
    }

    async fn update_with(&self, id: &str, modify: Modify<T>) -> StorageResult<Option<T>> {
        let mut records = self.records.write().await;
        let Some(current) = records.get(id).cloned() else {
            return Ok(None);
        };
        let updated = modify(current).map_err(StorageError::Rejected)?;
        ensure_matching_id(id, &updated)?;
        records.insert(updated.clone());
        Ok(Some(updated))
    }

    async fn upsert(&self, record: T) -> StorageResult<T> {
        self.records.write().await.insert(record.clone());
        Ok(record)
    }

    async fn delete(&self, id: &str) -> StorageResult<bool> {
        Ok(self.records.write().await.remove(id).is_some())
    }

    async fn clear(&self) -> StorageResult<()> {
        self.records.write().await.clear();
        Ok(())
    }

    async fn exists(&self, id: &str) -> StorageResult<bool> {
        Ok(self.records.read().await.contains(id))
    }

    async fn count(&self) -> StorageResult<usize> {
        Ok(self.records.read().await.len())
    }

    fn metadata(&self) -> StorageMetadata {
        self.metadata.clone()
    }
}
