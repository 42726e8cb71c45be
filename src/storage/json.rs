use super::storage_trait::{
    Modify, Storage, StorageError, StorageFeature, StorageMetadata, StorageResult,
    ensure_matching_id,
};
use crate::record::{Collection, Record};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock, PoisonError, Weak};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, MutexGuard};

/// JSON-file storage backend.
///
/// The file at `path` is the only source of truth: every call re-reads it,
/// and every mutation rewrites the whole document. A missing file is an empty
/// collection and is only created by the first write.
///
/// Both `[{"id": ..}, ..]` and `{"<id>": {"id": ..}, ..}` documents are
/// accepted; writes always produce the object form. Documents are replaced
/// through a sibling temp file and a rename, so readers never see a partial
/// write.
///
/// Read-modify-write cycles are serialized through a fair async mutex. Every
/// instance opened on the same file in this process shares that mutex, so
/// separately constructed handles do not lose each other's writes. Other
/// processes are not coordinated.
#[derive(Debug)]
pub struct JsonStorage<T> {
    path: PathBuf,
    pretty: bool,
    write_lock: Arc<Mutex<()>>,
    /// Storage metadata
    metadata: StorageMetadata,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for JsonStorage<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            pretty: self.pretty,
            write_lock: Arc::clone(&self.write_lock),
            metadata: self.metadata.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: Record> JsonStorage<T> {
    /// Create a JsonStorage backed by the file at `path`.
    ///
    /// Nothing is written to disk until the first mutation.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let metadata = StorageMetadata::new("json", env!("CARGO_PKG_VERSION"))
            .with_feature(StorageFeature::ConcurrentReads)
            .with_feature(StorageFeature::SerializedWrites)
            .with_feature(StorageFeature::Persistence)
            .with_property("source_file", path.display().to_string())
            .with_property("format", "object");
        let write_lock = shared_lock(lock_key(&path));

        Self {
            path,
            pretty: true,
            write_lock,
            metadata,
            _record: PhantomData,
        }
    }

    /// Toggle pretty-printed output (on by default).
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn lock(&self) -> MutexGuard<'_, ()> {
        tracing::trace!(path = %self.path.display(), "waiting for write lock");
        self.write_lock.lock().await
    }

    /// Read the current collection from disk.
    async fn load(&self) -> StorageResult<Collection<T>> {
        let content = match fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Collection::new()),
            Err(e) => return Err(e.into()),
        };

        let records = parse_collection(&content)?;
        tracing::debug!(
            path = %self.path.display(),
            records = records.len(),
            "loaded collection"
        );
        Ok(records)
    }

    /// Replace the file contents with `records`.
    async fn persist(&self, records: &Collection<T>) -> StorageResult<()> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(records)?
        } else {
            serde_json::to_vec(records)?
        };

        write_atomic(&self.path, &bytes).await?;
        tracing::debug!(
            path = %self.path.display(),
            records = records.len(),
            "persisted collection"
        );
        Ok(())
    }

    async fn file_exists(&self) -> StorageResult<bool> {
        Ok(fs::try_exists(&self.path).await?)
    }
}

#[async_trait]
impl<T: Record> Storage<T> for JsonStorage<T> {
    async fn get_all(&self) -> StorageResult<Vec<T>> {
        Ok(self.load().await?.into_records())
    }

    async fn get_by_id(&self, id: &str) -> StorageResult<Option<T>> {
        Ok(self.load().await?.get(id).cloned())
    }

    async fn create(&self, record: T) -> StorageResult<T> {
        let _guard = self.lock().await;
        let mut records = self.load().await?;
        records.insert(record.clone());
        self.persist(&records).await?;
        Ok(record)
    }

    async fn update(&self, id: &str, record: T) -> StorageResult<Option<T>> {
        ensure_matching_id(id, &record)?;
        let _guard = self.lock().await;
        let mut records = self.load().await?;
        if !records.contains(id) {
            return Ok(None);
        }
        records.insert(record.clone());
        self.persist(&records).await?;
        Ok(Some(record))
    }

    async fn update_with(&self, id: &str, modify: Modify<T>) -> StorageResult<Option<T>> {
        let _guard = self.lock().await;
        let mut records = self.load().await?;
        let Some(current) = records.get(id).cloned() else {
            return Ok(None);
        };
        let updated = modify(current).map_err(StorageError::Rejected)?;
        ensure_matching_id(id, &updated)?;
        records.insert(updated.clone());
        self.persist(&records).await?;
        Ok(Some(updated))
    }

    async fn upsert(&self, record: T) -> StorageResult<T> {
        let _guard = self.lock().await;
        let mut records = self.load().await?;
        records.insert(record.clone());
        self.persist(&records).await?;
        Ok(record)
    }

    async fn delete(&self, id: &str) -> StorageResult<bool> {
        let _guard = self.lock().await;
        let mut records = self.load().await?;
        if records.remove(id).is_none() {
            return Ok(false);
        }
        self.persist(&records).await?;
        Ok(true)
    }

    async fn clear(&self) -> StorageResult<()> {
        let _guard = self.lock().await;
        if !self.file_exists().await? {
            return Ok(());
        }
        // a document that does not parse is reported, never overwritten
        self.load().await?;
        self.persist(&Collection::new()).await
    }

    async fn exists(&self, id: &str) -> StorageResult<bool> {
        Ok(self.load().await?.contains(id))
    }

    async fn count(&self) -> StorageResult<usize> {
        Ok(self.load().await?.len())
    }

    fn metadata(&self) -> StorageMetadata {
        self.metadata.clone()
    }
}

/// Parse a persisted document into a keyed collection.
///
/// Accepts an array of records or an object keyed by record id. In an array,
/// a repeated id keeps its last occurrence. In an object, every key must equal
/// the id of the record it maps to.
pub fn parse_collection<T: Record>(content: &[u8]) -> StorageResult<Collection<T>> {
    let document: Value = serde_json::from_slice(content)?;
    let mut records = Collection::new();

    match document {
        Value::Array(items) => {
            for (idx, item) in items.into_iter().enumerate() {
                let record: T = serde_json::from_value(item).map_err(|e| {
                    StorageError::InvalidData(format!("Record at index {}: {}", idx, e))
                })?;
                records.insert(record);
            }
        }
        Value::Object(entries) => {
            for (key, item) in entries {
                let record: T = serde_json::from_value(item).map_err(|e| {
                    StorageError::InvalidData(format!("Record under key '{}': {}", key, e))
                })?;
                if record.id() != key {
                    return Err(StorageError::InvalidData(format!(
                        "Record under key '{}' has id '{}'",
                        key,
                        record.id()
                    )));
                }
                records.insert(record);
            }
        }
        other => {
            return Err(StorageError::InvalidData(format!(
                "Expected an array or object of records, found {}",
                json_type_name(&other)
            )));
        }
    }

    Ok(records)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Canonical form of `path`, so different spellings of one file map to the
/// same write lock.
fn lock_key(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let canonical = match (absolute.parent(), absolute.file_name()) {
        (Some(parent), Some(name)) => parent.canonicalize().ok().map(|dir| dir.join(name)),
        _ => None,
    };
    canonical.unwrap_or(absolute)
}

type LockRegistry = std::sync::Mutex<HashMap<PathBuf, Weak<Mutex<()>>>>;

/// The write lock for `key`, shared by every live instance on that file.
fn shared_lock(key: PathBuf) -> Arc<Mutex<()>> {
    static LOCKS: OnceLock<LockRegistry> = OnceLock::new();

    let mut locks = LOCKS
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    if let Some(lock) = locks.get(&key).and_then(Weak::upgrade) {
        return lock;
    }

    locks.retain(|_, lock| lock.strong_count() > 0);
    let lock = Arc::new(Mutex::new(()));
    locks.insert(key, Arc::downgrade(&lock));
    lock
}

/// Write `bytes` to `path` via a sibling temp file and a rename.
///
/// The parent directory must already exist. On failure the temp file is
/// removed and the previous contents of `path` are left untouched.
async fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    replace_via(&temp_path(path), path, bytes).await
}

async fn replace_via(tmp_path: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let result = write_then_rename(tmp_path, path, bytes).await;
    if result.is_err() {
        let _ = fs::remove_file(tmp_path).await;
    }
    result
}

async fn write_then_rename(tmp_path: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(tmp_path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    drop(file);
    fs::rename(tmp_path, path).await?;
    sync_parent_dir(path).await
}

/// Flush the directory entry created by a rename into `path`.
#[cfg(unix)]
async fn sync_parent_dir(path: &Path) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::File::open(dir).await?.sync_all().await
}

#[cfg(not(unix))]
async fn sync_parent_dir(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// `data.json` -> `data.json.<uuid>.tmp`, unique per write.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("collection"));
    name.push(format!(".{}.tmp", uuid::Uuid::new_v4().simple()));
    path.with_file_name(name)
}
