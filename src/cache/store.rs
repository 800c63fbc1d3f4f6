//! Key-value substrates that back the weather cache
//!
//! A substrate is a synchronous, string-keyed, string-valued store. It knows
//! nothing about TTLs or payloads; `CacheStore` layers those on top.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use parking_lot::Mutex;
use thiserror::Error;

/// Name of the file `FileStore` keeps its entries in
const STORE_FILE_NAME: &str = "weather_cache.json";

/// Errors raised by a key-value substrate
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("cache storage I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The backing document could not be encoded or decoded
    #[error("cache storage document is invalid: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store refused a new entry because it is full
    #[error("cache storage quota exceeded ({capacity} entries)")]
    QuotaExceeded { capacity: usize },
}

/// A synchronous string-to-string store
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Lists every key currently stored
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

/// In-memory store, lost when the process exits
///
/// An optional capacity makes `set` fail once that many distinct keys are
/// held, mirroring a storage quota.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
    capacity: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            capacity: Some(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock();
        if let Some(capacity) = self.capacity {
            if !entries.contains_key(key) && entries.len() >= capacity {
                return Err(StoreError::QuotaExceeded { capacity });
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.lock().keys().cloned().collect())
    }
}

/// Store persisted as a single JSON object on disk
///
/// Lives in the XDG-compliant cache directory (`~/.cache/weather-lookup/` on
/// Linux) so entries survive between runs. Every operation re-reads the file;
/// there is no in-process copy and no locking between processes.
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Directory holding the store file
    cache_dir: PathBuf,
}

impl FileStore {
    /// Creates a FileStore in the platform cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "weather-lookup")?;
        Some(Self::with_dir(project_dirs.cache_dir().to_path_buf()))
    }

    /// Creates a FileStore rooted at a specific directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn path(&self) -> PathBuf {
        self.cache_dir.join(STORE_FILE_NAME)
    }

    fn temp_path(&self) -> PathBuf {
        self.cache_dir.join(format!("{}.tmp", STORE_FILE_NAME))
    }

    /// Reads the whole document
    ///
    /// A missing file is an empty store. An unreadable document is deleted
    /// and also treated as empty, so reads heal a corrupt file instead of
    /// failing on it until the next write.
    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "discarding unreadable cache file");
                match fs::remove_file(&path) {
                    Ok(()) => Ok(BTreeMap::new()),
                    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
                    Err(e) => Err(e.into()),
                }
            }
        }
    }

    /// Replaces the document atomically: write a sibling temp file, then rename
    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        fs::create_dir_all(&self.cache_dir)?;
        let json = serde_json::to_string_pretty(entries)?;
        let temp_path = self.temp_path();
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, self.path())?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.load()?.into_keys().collect())
    }
}
