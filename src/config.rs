use crate::record::Record;
use crate::storage::{JsonStorage, MemoryStorage, Storage};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Environment variable selecting the JSON file backend.
pub const PATH_ENV: &str = "CONTACT_STORE_PATH";
/// Environment variable toggling pretty-printed JSON output.
pub const PRETTY_ENV: &str = "CONTACT_STORE_PRETTY";

/// Which backend to open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    /// Volatile in-process map
    Memory,
    /// Single JSON document at `path`
    Json { path: PathBuf },
}

/// Configuration for opening a storage backend.
///
/// # Example
///
/// ```rust
/// use contact_store::{Contact, StorageConfig};
///
/// let config = StorageConfig::json("data/contacts.json");
/// let storage = config.open::<Contact>();
/// assert_eq!(storage.metadata().name, "json");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: BackendConfig,

    /// Pretty-print JSON documents (ignored by the memory backend)
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

fn default_pretty() -> bool {
    true
}

impl StorageConfig {
    /// Configuration for the in-memory backend.
    pub fn memory() -> Self {
        Self {
            backend: BackendConfig::Memory,
            pretty: default_pretty(),
        }
    }

    /// Configuration for a JSON file at `path`.
    pub fn json(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: BackendConfig::Json { path: path.into() },
            pretty: default_pretty(),
        }
    }

    /// Read the configuration from the process environment.
    ///
    /// `CONTACT_STORE_PATH` selects the JSON backend at that path, otherwise
    /// memory is used. `CONTACT_STORE_PRETTY=false` (or `0`) disables pretty
    /// output.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`StorageConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(PATH_ENV) {
            Some(path) if !path.trim().is_empty() => Self::json(path),
            _ => Self::memory(),
        };

        if let Some(pretty) = lookup(PRETTY_ENV) {
            let pretty = pretty.trim().to_ascii_lowercase();
            config.pretty = !matches!(pretty.as_str(), "false" | "0" | "no" | "off");
        }
        config
    }

    /// Open the configured backend.
    pub fn open<T: Record>(&self) -> Arc<dyn Storage<T>> {
        match &self.backend {
            BackendConfig::Memory => Arc::new(MemoryStorage::<T>::new()),
            BackendConfig::Json { path } => {
                Arc::new(JsonStorage::<T>::new(path).with_pretty(self.pretty))
            }
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::memory()
    }
}
