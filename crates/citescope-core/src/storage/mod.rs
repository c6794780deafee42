//! Key/value persistence for user preferences and cached style lists.

pub mod json_file;
pub mod memory;
pub mod preferences;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use preferences::Preferences;

use serde_json::Value;

use crate::error::Result;

/// Store handle shared between the popup, the options page and loaders.
pub type SharedStore = std::sync::Arc<dyn KeyValueStore>;

/// Process-wide key/value persistence that survives between sessions.
///
/// Implementations must make each `set`/`remove` visible to subsequent
/// `get` calls on the same store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>>;

    fn set(&self, key: &str, value: Value) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;

    /// Write several entries as one change.
    fn set_many(&self, entries: Vec<(String, Value)>) -> Result<()> {
        for (key, value) in entries {
            self.set(&key, value)?;
        }
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }

    fn set_many(&self, entries: Vec<(String, Value)>) -> Result<()> {
        (**self).set_many(entries)
    }
}
