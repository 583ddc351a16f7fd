//! Persistence port for per-table preferences.
//!
//! The engine only needs string get/set. Backends implement [`KeyValueStore`];
//! [`Preferences`] wraps one with typed JSON values and falls back to memory
//! for the rest of the session once the backend fails.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StoreError;

/// Storage key for a table's page size.
pub fn page_size_key(identity: &str) -> String {
    identity.to_string()
}

/// Storage key for a table's column widths.
pub fn column_widths_key(identity: &str) -> String {
    format!("{}-column-widths", identity)
}

/// Backend trait for preference storage.
///
/// Implementations handle raw string storage/retrieval.
pub trait KeyValueStore: Send + Sync {
    /// Get the raw value for a key.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Set the raw value for a key.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a key.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// An in-memory store backed by a concurrent hash map.
///
/// Data is lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    store: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            store: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.store.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.store.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.store.remove(key);
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// Typed preference access over a [`KeyValueStore`].
///
/// Values are stored as JSON. Read and write failures never reach the caller:
/// a missing or malformed value reads as `None`, and after the first backend
/// failure all further writes for this session go to memory only.
#[derive(Clone)]
pub struct Preferences {
    backend: Arc<dyn KeyValueStore>,
    fallback: Arc<DashMap<String, String>>,
    degraded: Arc<AtomicBool>,
}

impl std::fmt::Debug for Preferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preferences")
            .field("degraded", &self.is_degraded())
            .field("fallback_entries", &self.fallback.len())
            .finish()
    }
}

impl Preferences {
    /// Wrap a backend.
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self::from_arc(Arc::new(backend))
    }

    /// Wrap a shared backend.
    pub fn from_arc(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            fallback: Arc::new(DashMap::new()),
            degraded: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Preferences that live only as long as this value.
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Whether the backend has failed and writes are memory-only.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::SeqCst)
    }

    fn degrade(&self, op: &str, key: &str, err: &StoreError) {
        if !self.degraded.swap(true, Ordering::SeqCst) {
            log::warn!(
                "preference {} failed for '{}': {}; keeping preferences in memory",
                op,
                key,
                err
            );
        }
    }

    fn get_raw(&self, key: &str) -> Option<String> {
        if let Some(value) = self.fallback.get(key) {
            return Some(value.value().clone());
        }
        if self.is_degraded() {
            return None;
        }
        match self.backend.get(key) {
            Ok(value) => value,
            Err(e) => {
                self.degrade("read", key, &e);
                None
            }
        }
    }

    /// Get a typed value. Missing, unreadable or malformed values read as `None`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                log::debug!("ignoring malformed preference '{}': {}", key, e);
                None
            }
        }
    }

    /// Get a typed value, returning `default` if unavailable.
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Store a typed value.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("could not serialize preference '{}': {}", key, e);
                return;
            }
        };
        if !self.is_degraded() {
            match self.backend.set(key, &raw) {
                Ok(()) => return,
                Err(e) => self.degrade("write", key, &e),
            }
        }
        self.fallback.insert(key.to_string(), raw);
    }

    /// Delete a value.
    pub fn remove(&self, key: &str) {
        self.fallback.remove(key);
        if self.is_degraded() {
            return;
        }
        if let Err(e) = self.backend.remove(key) {
            self.degrade("delete", key, &e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys() {
        assert_eq!(page_size_key("pods"), "pods");
        assert_eq!(column_widths_key("pods"), "pods-column-widths");
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        store.remove("a").unwrap();
        assert!(store.is_empty());
    }
}
