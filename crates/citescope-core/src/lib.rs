pub mod config;
pub mod error;
pub mod models;
pub mod storage;

pub use config::{AppConfig, CitationConfig, ServicesConfig, StorageConfig};
pub use error::{CitescopeError, ExitCode, Result};
pub use models::*;

pub use storage::{JsonFileStore, KeyValueStore, MemoryStore, Preferences, SharedStore};
