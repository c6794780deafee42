use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{Map, Value};
use tracing::warn;

use super::KeyValueStore;
use crate::error::{CitescopeError, Result};

/// Store backed by a single pretty-printed JSON object on disk.
///
/// The whole object is rewritten on every change.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<Map<String, Value>>,
}

impl JsonFileStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    pub fn open(path: &Path) -> Result<Self> {
        let entries = if path.exists() {
            let contents = fs::read_to_string(path)?;
            if contents.trim().is_empty() {
                Map::new()
            } else {
                match serde_json::from_str::<Value>(&contents)? {
                    Value::Object(map) => map,
                    _ => {
                        return Err(CitescopeError::Storage(format!(
                            "{} does not contain a JSON object",
                            path.display()
                        )));
                    }
                }
            }
        } else {
            Map::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            entries: Mutex::new(entries),
        })
    }

    /// Like [`JsonFileStore::open`], but an unreadable or corrupt file is
    /// logged and replaced by an empty store.
    pub fn open_or_empty(path: &Path) -> Self {
        Self::open(path).unwrap_or_else(|e| {
            warn!("ignoring unreadable storage at {}: {e}", path.display());
            Self {
                path: path.to_path_buf(),
                entries: Mutex::new(Map::new()),
            }
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update(&self, f: impl FnOnce(&mut Map<String, Value>)) -> Result<()> {
        let mut map = self
            .entries
            .lock()
            .map_err(|_| CitescopeError::Storage("file store lock poisoned".to_string()))?;
        let mut next = map.clone();
        f(&mut next);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&next)?;
        fs::write(&self.path, json)?;
        *map = next;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let map = self
            .entries
            .lock()
            .map_err(|_| CitescopeError::Storage("file store lock poisoned".to_string()))?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.update(|map| {
            map.insert(key.to_string(), value);
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.update(|map| {
            map.remove(key);
        })
    }

    fn set_many(&self, entries: Vec<(String, Value)>) -> Result<()> {
        self.update(|map| map.extend(entries))
    }
}
