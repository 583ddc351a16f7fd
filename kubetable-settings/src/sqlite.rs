//! SQLite preference store with in-memory cache.

use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use dashmap::DashMap;
use kubetable::{KeyValueStore, StoreError};
use rusqlite::{Connection, params};

use crate::SettingsError;
use crate::paths;

/// SQLite-backed key-value storage with DashMap cache.
///
/// Reads are served from the cache after the first hit; writes go through to
/// the database before the cache is updated.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
    cache: DashMap<String, String>,
}

impl SqliteStore {
    /// Open (or create) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        log::debug!("opening settings database at {}", path.display());
        Self::init(Connection::open(path)?)
    }

    /// Open the database in the platform data directory, creating it if needed.
    pub fn open_default() -> Result<Self, SettingsError> {
        let path = paths::settings_db().ok_or(SettingsError::NoDataDir)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        Self::open(path)
    }

    /// A private database that lives as long as this value.
    pub fn in_memory() -> Result<Self, SettingsError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, SettingsError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
            cache: DashMap::new(),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, SettingsError> {
        self.conn.lock().map_err(|_| SettingsError::Poisoned)
    }

    fn read(&self, key: &str) -> Result<Option<String>, SettingsError> {
        // Check cache first
        if let Some(value) = self.cache.get(key) {
            return Ok(Some(value.value().clone()));
        }

        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT value FROM settings WHERE key = ?")?;
        let mut rows = stmt.query([key])?;
        let result: Option<String> = rows.next()?.map(|row| row.get(0)).transpose()?;

        if let Some(ref value) = result {
            self.cache.insert(key.to_string(), value.clone());
        }
        Ok(result)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.conn()?.execute(
            "INSERT INTO settings (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        self.cache.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), SettingsError> {
        self.conn()?.execute("DELETE FROM settings WHERE key = ?", [key])?;
        self.cache.remove(key);
        Ok(())
    }

    /// All stored keys starting with `prefix`, sorted.
    pub fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, SettingsError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT key FROM settings WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key",
        )?;
        let rows = stmt.query_map([prefix], |row| row.get(0))?;
        let keys = rows.collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.read(key).map_err(StoreError::from)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.write(key, value).map_err(StoreError::from)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.delete(key).map_err(StoreError::from)
    }
}
