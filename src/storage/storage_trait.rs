use crate::record::Record;
use async_trait::async_trait;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Error raised by a [`Modify`] step.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Transformation applied to a stored record by [`Storage::update_with`].
pub type Modify<T> = Box<dyn FnOnce(T) -> Result<T, BoxError> + Send>;

/// Errors that can occur during storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid data structure: {0}")]
    InvalidData(String),

    #[error("Update rejected: {0}")]
    Rejected(#[source] BoxError),
}

/// Abstract CRUD contract over a keyed collection of records.
///
/// Every backend (in-memory, JSON file, ...) implements the same operation
/// set so callers can swap one for another. "Not found" is never an error:
/// lookups return `None` and removals return `false`.
#[async_trait]
pub trait Storage<T: Record>: Send + Sync {
    /// Return every stored record.
    async fn get_all(&self) -> StorageResult<Vec<T>>;

    /// Look up a record by its exact ID.
    async fn get_by_id(&self, id: &str) -> StorageResult<Option<T>>;

    /// Store a record, overwriting any record with the same ID.
    async fn create(&self, record: T) -> StorageResult<T>;

    /// Replace the record stored under `id`.
    ///
    /// Returns `None` without storing anything when `id` is unknown. The
    /// supplied value replaces the stored one entirely.
    async fn update(&self, id: &str, record: T) -> StorageResult<Option<T>>;

    /// Replace the record stored under `id` with `modify(current)`.
    ///
    /// The read, the call to `modify` and the write form one cycle that no
    /// other mutation can interleave with. Returns `None` without calling
    /// `modify` when `id` is unknown. An error from `modify` comes back as
    /// [`StorageError::Rejected`] and nothing is written. The new record must
    /// keep the id it was stored under.
    async fn update_with(&self, id: &str, modify: Modify<T>) -> StorageResult<Option<T>>;

    /// Create the record if absent, replace it otherwise.
    async fn upsert(&self, record: T) -> StorageResult<T>;

    /// Remove a record, returning whether it existed.
    async fn delete(&self, id: &str) -> StorageResult<bool>;

    /// Remove every record.
    async fn clear(&self) -> StorageResult<()>;

    async fn exists(&self, id: &str) -> StorageResult<bool>;

    async fn count(&self) -> StorageResult<usize>;

    /// Get storage metadata.
    fn metadata(&self) -> StorageMetadata;

    /// Check if the storage backend supports a specific feature.
    fn supports_feature(&self, feature: StorageFeature) -> bool {
        self.metadata().features.contains(&feature)
    }
}

/// Reject an update whose record carries a different ID than its target.
pub(crate) fn ensure_matching_id<T: Record>(id: &str, record: &T) -> StorageResult<()> {
    if record.id() != id {
        return Err(StorageError::InvalidData(format!(
            "record id '{}' does not match update target '{}'",
            record.id(),
            id
        )));
    }
    Ok(())
}

/// Features that a storage backend may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageFeature {
    /// Support for concurrent reads
    ConcurrentReads,
    /// Support for concurrent writes
    ConcurrentWrites,
    /// Mutations are serialized through a lock shared by every handle on the same data
    SerializedWrites,
    /// Support for persistent storage
    Persistence,
}

/// Metadata about a storage backend.
#[derive(Debug, Clone)]
pub struct StorageMetadata {
    /// Name of the storage backend
    pub name: String,
    /// Version of the storage backend
    pub version: String,
    /// Supported features
    pub features: Vec<StorageFeature>,
    /// Additional properties
    pub properties: std::collections::HashMap<String, String>,
}

impl StorageMetadata {
    /// Create new storage metadata.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            features: Vec::new(),
            properties: std::collections::HashMap::new(),
        }
    }

    /// Add a feature to the metadata.
    pub fn with_feature(mut self, feature: StorageFeature) -> Self {
        self.features.push(feature);
        self
    }

    /// Add a property to the metadata.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}
