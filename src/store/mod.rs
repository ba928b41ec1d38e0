//! JSON blob storage
//!
//! Records are opaque JSON documents addressed by string keys. Writes
//! replace the whole value; there is no partial update and no versioning.

pub mod memory;
pub mod repository;
pub mod sqlite;

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};

pub use memory::MemoryKv;
pub use repository::SignalRepository;
pub use sqlite::SqliteKv;

/// Raw key-value backend
pub trait KvStore: Send + Sync {
    fn get_raw(&self, key: &str) -> Result<Option<String>>;
    fn set_raw(&self, key: &str, value: &str) -> Result<()>;
    /// Returns whether the key existed
    fn delete(&self, key: &str) -> Result<bool>;
    /// Keys starting with `prefix`, sorted
    fn keys(&self, prefix: &str) -> Result<Vec<String>>;
}

/// Typed JSON view over a [`KvStore`]
#[derive(Clone)]
pub struct BlobStore {
    inner: Arc<dyn KvStore>,
}

impl BlobStore {
    pub fn new(inner: Arc<dyn KvStore>) -> Self {
        Self { inner }
    }

    pub fn memory() -> Self {
        Self::new(Arc::new(MemoryKv::new()))
    }

    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.inner.get_raw(key)? else {
            return Ok(None);
        };
        let value = serde_json::from_str(&raw)
            .with_context(|| format!("Malformed JSON blob under key '{}'", key))?;
        Ok(Some(value))
    }

    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)
            .with_context(|| format!("Failed to serialize blob for key '{}'", key))?;
        self.inner.set_raw(key, &raw)
    }

    pub fn delete(&self, key: &str) -> Result<bool> {
        self.inner.delete(key)
    }

    pub fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        self.inner.keys(prefix)
    }
}
