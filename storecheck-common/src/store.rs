//! Local persistence for in-progress inspection state
//!
//! Synchronous key-value storage of the working session under two fixed
//! keys. The production `FileStore` keeps one JSON file per key under the
//! root folder; tests substitute `MemoryStore`. Every persisted blob is
//! wrapped in a schema-versioned envelope, and a blob whose version does
//! not match the compiled-in version is discarded on read so the session
//! falls back to a fresh taxonomy fetch.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::Result;

/// Key holding the serialized `StoreInfo`
pub const STORE_INFO_KEY: &str = "store_info";

/// Key holding the serialized working checklist
pub const INSPECTION_DATA_KEY: &str = "inspection_data";

/// Version stamped into every persisted envelope
pub const PERSIST_SCHEMA_VERSION: u32 = 1;

/// Synchronous key-value storage for session state
///
/// Reads and writes are effectively instantaneous (in-process or local
/// disk), so no suspension handling is needed.
pub trait StateStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    schema_version: u32,
    data: T,
}

/// Serialize `value` under `key`, stamped with the current schema version
pub fn save_json<T: Serialize>(store: &dyn StateStore, key: &str, value: &T) -> Result<()> {
    let envelope = Envelope {
        schema_version: PERSIST_SCHEMA_VERSION,
        data: value,
    };
    let blob = serde_json::to_string(&envelope)?;
    store.put(key, &blob)
}

/// Read `key`, returning `None` (and dropping the stale blob) when the key
/// is absent, unparseable, or stamped with a different schema version
pub fn load_json<T: DeserializeOwned>(store: &dyn StateStore, key: &str) -> Option<T> {
    let blob = store.get(key)?;
    match serde_json::from_str::<Envelope<T>>(&blob) {
        Ok(envelope) if envelope.schema_version == PERSIST_SCHEMA_VERSION => Some(envelope.data),
        Ok(envelope) => {
            warn!(
                "Discarding persisted '{}' (schema version {} != {})",
                key, envelope.schema_version, PERSIST_SCHEMA_VERSION
            );
            let _ = store.remove(key);
            None
        }
        Err(e) => {
            warn!("Discarding unreadable persisted '{}': {}", key, e);
            let _ = store.remove(key);
            None
        }
    }
}

/// File-backed store: one `<key>.json` file per key under a directory
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create the store, ensuring the directory exists
    pub fn new(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl StateStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path_for(key)).ok()
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// In-memory store for tests
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}
