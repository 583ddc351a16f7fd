//! SQLite-backed preference storage for `kubetable`.
//!
//! ```no_run
//! use kubetable::Preferences;
//! use kubetable_settings::SqliteStore;
//!
//! let store = SqliteStore::open_default()?;
//! let prefs = Preferences::new(store);
//! # Ok::<(), kubetable_settings::SettingsError>(())
//! ```

pub mod paths;
mod sqlite;

pub use sqlite::SqliteStore;

use kubetable::StoreError;
use thiserror::Error;

/// Settings storage error.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not determine a data directory")]
    NoDataDir,
    #[error("settings connection poisoned")]
    Poisoned,
}

impl From<SettingsError> for StoreError {
    fn from(err: SettingsError) -> Self {
        match err {
            SettingsError::NoDataDir | SettingsError::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            other => StoreError::Backend(other.to_string()),
        }
    }
}
