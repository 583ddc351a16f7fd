//! Table configuration

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::filter::SearchMode;
use crate::sort::SortCycle;

/// Table-wide defaults.
///
/// Per-table choices made by the user (page size, column widths) are persisted
/// separately; these values only apply when nothing has been persisted yet.
///
/// # Example
///
/// ```
/// use kubetable::{SortCycle, TableConfig};
///
/// let config = TableConfig::default()
///     .with_default_page_size(25)
///     .with_sort_cycle(SortCycle::TriState);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Page size used when none has been persisted.
    ///
    /// Default: 10
    pub default_page_size: usize,

    /// Page sizes offered in the page-size selector.
    ///
    /// Default: 10, 25, 50, 100
    pub page_size_options: Vec<usize>,

    /// Column width used when a column sets none.
    ///
    /// Default: 150
    pub default_column_width: u32,

    /// Smallest width a column can be dragged to.
    ///
    /// Default: 50
    pub min_column_width: u32,

    /// Largest width a column can be dragged to.
    ///
    /// Default: 800
    pub max_column_width: u32,

    /// What a repeated header click does.
    pub sort_cycle: SortCycle,

    /// How the free-text query is matched.
    pub search_mode: SearchMode,

    /// Viewport widths below this render as cards when a card renderer is set.
    ///
    /// Default: 768
    pub narrow_breakpoint: u32,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            page_size_options: vec![10, 25, 50, 100],
            default_column_width: 150,
            min_column_width: 50,
            max_column_width: 800,
            sort_cycle: SortCycle::default(),
            search_mode: SearchMode::default(),
            narrow_breakpoint: 768,
        }
    }
}

impl TableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the config for values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_page_size == 0 {
            return Err(ConfigError::InvalidPageSize(0));
        }
        if let Some(&zero) = self.page_size_options.iter().find(|&&n| n == 0) {
            return Err(ConfigError::InvalidPageSize(zero));
        }
        if self.min_column_width > self.max_column_width {
            return Err(ConfigError::InvalidWidthBounds {
                key: "*".to_string(),
                min: self.min_column_width,
                max: self.max_column_width,
            });
        }
        Ok(())
    }

    pub fn with_default_page_size(mut self, size: usize) -> Self {
        self.default_page_size = size;
        self
    }

    pub fn with_page_size_options(mut self, options: Vec<usize>) -> Self {
        self.page_size_options = options;
        self
    }

    pub fn with_column_width(mut self, default: u32, min: u32, max: u32) -> Self {
        self.default_column_width = default;
        self.min_column_width = min;
        self.max_column_width = max;
        self
    }

    pub fn with_sort_cycle(mut self, cycle: SortCycle) -> Self {
        self.sort_cycle = cycle;
        self
    }

    pub fn with_search_mode(mut self, mode: SearchMode) -> Self {
        self.search_mode = mode;
        self
    }

    pub fn with_narrow_breakpoint(mut self, width: u32) -> Self {
        self.narrow_breakpoint = width;
        self
    }
}
