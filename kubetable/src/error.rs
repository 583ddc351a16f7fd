//! Error types

use thiserror::Error;

/// A table was configured incorrectly.
///
/// These are programming mistakes rather than runtime conditions. They are
/// surfaced when the column set or configuration is built, never during a render.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("duplicate column key: {key}")]
    DuplicateColumnKey { key: String },
    #[error("column key must not be empty")]
    EmptyColumnKey,
    #[error("invalid width bounds for column {key}: min {min} > max {max}")]
    InvalidWidthBounds { key: String, min: u32, max: u32 },
    #[error("page size must be at least 1, got {0}")]
    InvalidPageSize(usize),
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A persistence backend failed to read or write.
///
/// The table engine never propagates these to the user; it logs them and keeps
/// going with in-memory state.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
