//! Column model: how one field of a row is rendered, sorted, searched and filtered.
//!
//! A column always has a key, a header and an accessor. Everything else is an
//! optional capability record. Sorting is only possible through a [`Sortable`]
//! capability, which cannot be built without a sort-value function, so a
//! "sortable column without a sort value" cannot be expressed.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::config::TableConfig;
use crate::error::ConfigError;
use crate::guard::isolate;
use crate::sort::SortValue;

type CellFn<T> = Arc<dyn Fn(&T) -> Cell + Send + Sync>;
type SortFn<T> = Arc<dyn Fn(&T) -> SortValue + Send + Sync>;
type TextFn<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;
type OptionsFn<T> = Arc<dyn Fn(&[T]) -> Vec<String> + Send + Sync>;

/// Rendered content of one cell.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Cell {
    /// Plain text content.
    Text(String),
    /// The accessor failed for this row.
    Placeholder,
    /// Nothing to show.
    #[default]
    Empty,
}

impl Cell {
    /// Create a text cell.
    pub fn text(content: impl Into<String>) -> Self {
        Cell::Text(content.into())
    }

    /// Get the text content, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this cell is the failure placeholder.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Cell::Placeholder)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Placeholder => f.write_str("-"),
            Cell::Empty => Ok(()),
        }
    }
}

/// Horizontal alignment for column content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Per-column width overrides.
///
/// Unset fields fall back to the table-wide [`TableConfig`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WidthBounds {
    pub min: Option<u32>,
    pub max: Option<u32>,
    pub initial: Option<u32>,
}

impl WidthBounds {
    /// Resolve `(min, max, initial)` against the table config.
    ///
    /// The initial width is clamped into `[min, max]`.
    pub fn resolve(&self, config: &TableConfig) -> (u32, u32, u32) {
        let min = self.min.unwrap_or(config.min_column_width);
        let max = self.max.unwrap_or(config.max_column_width).max(min);
        let initial = self
            .initial
            .unwrap_or(config.default_column_width)
            .clamp(min, max);
        (min, max, initial)
    }
}

/// Sort capability: the column can be ordered by a comparable value.
pub struct Sortable<T> {
    value: SortFn<T>,
}

impl<T> Clone for Sortable<T> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
        }
    }
}

/// Search capability: the column takes part in free-text search.
pub struct Searchable<T> {
    value: TextFn<T>,
}

impl<T> Clone for Searchable<T> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
        }
    }
}

/// Filter capability: the column offers a discrete-value filter.
pub struct Filterable<T> {
    value: TextFn<T>,
    options: Option<OptionsFn<T>>,
}

impl<T> Clone for Filterable<T> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            options: self.options.clone(),
        }
    }
}

/// Column descriptor.
///
/// # Examples
///
/// ```
/// use kubetable::{Cell, Column, SortValue};
///
/// struct Secret { name: String, kind: String }
///
/// let column = Column::new("name", "Name", |s: &Secret| Cell::text(&s.name))
///     .sortable(|s: &Secret| SortValue::text(&s.name))
///     .searchable(|s: &Secret| s.name.clone());
/// assert!(column.is_sortable());
/// assert!(!column.is_filterable());
/// ```
pub struct Column<T> {
    key: String,
    header: String,
    accessor: CellFn<T>,
    align: Alignment,
    width: WidthBounds,
    sortable: Option<Sortable<T>>,
    searchable: Option<Searchable<T>>,
    filterable: Option<Filterable<T>>,
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            header: self.header.clone(),
            accessor: Arc::clone(&self.accessor),
            align: self.align,
            width: self.width,
            sortable: self.sortable.clone(),
            searchable: self.searchable.clone(),
            filterable: self.filterable.clone(),
        }
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("header", &self.header)
            .field("align", &self.align)
            .field("width", &self.width)
            .field("sortable", &self.is_sortable())
            .field("searchable", &self.is_searchable())
            .field("filterable", &self.is_filterable())
            .finish()
    }
}

impl<T> Column<T> {
    /// Create a column with a key, header text and cell accessor.
    pub fn new<F>(key: impl Into<String>, header: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&T) -> Cell + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            header: header.into(),
            accessor: Arc::new(accessor),
            align: Alignment::Left,
            width: WidthBounds::default(),
            sortable: None,
            searchable: None,
            filterable: None,
        }
    }

    /// Set the column alignment.
    pub fn align(mut self, align: Alignment) -> Self {
        self.align = align;
        self
    }

    /// Set the initial width.
    pub fn width(mut self, width: u32) -> Self {
        self.width.initial = Some(width);
        self
    }

    /// Set the resize bounds.
    pub fn width_bounds(mut self, min: u32, max: u32) -> Self {
        self.width.min = Some(min);
        self.width.max = Some(max);
        self
    }

    /// Make the column sortable by the value `f` extracts.
    pub fn sortable<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> SortValue + Send + Sync + 'static,
    {
        self.sortable = Some(Sortable { value: Arc::new(f) });
        self
    }

    /// Include the column in free-text search, matching against the text `f` extracts.
    pub fn searchable<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.searchable = Some(Searchable { value: Arc::new(f) });
        self
    }

    /// Offer a discrete-value filter on the value `f` extracts.
    ///
    /// Options default to the distinct values across all rows.
    pub fn filterable<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.filterable = Some(Filterable {
            value: Arc::new(f),
            options: None,
        });
        self
    }

    /// Offer a discrete-value filter with a custom option list.
    pub fn filterable_with_options<F, O>(mut self, f: F, options: O) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
        O: Fn(&[T]) -> Vec<String> + Send + Sync + 'static,
    {
        self.filterable = Some(Filterable {
            value: Arc::new(f),
            options: Some(Arc::new(options)),
        });
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn alignment(&self) -> Alignment {
        self.align
    }

    pub fn width_config(&self) -> WidthBounds {
        self.width
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable.is_some()
    }

    pub fn is_searchable(&self) -> bool {
        self.searchable.is_some()
    }

    pub fn is_filterable(&self) -> bool {
        self.filterable.is_some()
    }

    /// Render the cell for `row`. A panicking accessor yields [`Cell::Placeholder`].
    pub fn render(&self, row: &T) -> Cell {
        isolate(&self.key, "accessor", || (self.accessor)(row)).unwrap_or(Cell::Placeholder)
    }

    /// Sort value for `row`, or `None` if the column is not sortable.
    ///
    /// A panicking extractor yields [`SortValue::Missing`].
    pub fn sort_value(&self, row: &T) -> Option<SortValue> {
        let sortable = self.sortable.as_ref()?;
        let value = isolate(&self.key, "sort value", || (sortable.value)(row));
        Some(value.unwrap_or(SortValue::Missing))
    }

    /// Searchable text for `row`, or `None` if not searchable or the extractor panicked.
    pub fn search_value(&self, row: &T) -> Option<String> {
        let searchable = self.searchable.as_ref()?;
        isolate(&self.key, "search value", || (searchable.value)(row))
    }

    /// Filter value for `row`, or `None` if not filterable or the extractor panicked.
    pub fn filter_value(&self, row: &T) -> Option<String> {
        let filterable = self.filterable.as_ref()?;
        isolate(&self.key, "filter value", || (filterable.value)(row))
    }

    /// Filter options derived from the full, unfiltered row set.
    ///
    /// Without a custom option function this is the sorted set of distinct
    /// filter values. Returns an empty list for non-filterable columns.
    pub fn filter_options(&self, rows: &[T]) -> Vec<String> {
        let Some(filterable) = self.filterable.as_ref() else {
            return Vec::new();
        };
        if let Some(options) = &filterable.options {
            return isolate(&self.key, "filter options", || options(rows)).unwrap_or_default();
        }
        rows.iter()
            .filter_map(|row| self.filter_value(row))
            .filter(|value| !value.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// A validated, ordered set of columns.
///
/// Keys are unique and non-empty, and explicit width bounds are consistent.
pub struct ColumnSet<T> {
    columns: Vec<Column<T>>,
}

impl<T> Clone for ColumnSet<T> {
    fn clone(&self) -> Self {
        Self {
            columns: self.columns.clone(),
        }
    }
}

impl<T> fmt::Debug for ColumnSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.columns.iter()).finish()
    }
}

impl<T> ColumnSet<T> {
    /// Validate and wrap a list of columns.
    pub fn new(columns: Vec<Column<T>>) -> Result<Self, ConfigError> {
        if let Err(e) = Self::validate(&columns) {
            log::error!("invalid column configuration: {}", e);
            return Err(e);
        }
        Ok(Self { columns })
    }

    fn validate(columns: &[Column<T>]) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for column in columns {
            if column.key.is_empty() {
                return Err(ConfigError::EmptyColumnKey);
            }
            if !seen.insert(column.key.as_str()) {
                return Err(ConfigError::DuplicateColumnKey {
                    key: column.key.clone(),
                });
            }
            if let (Some(min), Some(max)) = (column.width.min, column.width.max)
                && min > max
            {
                return Err(ConfigError::InvalidWidthBounds {
                    key: column.key.clone(),
                    min,
                    max,
                });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column<T>> {
        self.columns.iter()
    }

    /// Find a column by key.
    pub fn get(&self, key: &str) -> Option<&Column<T>> {
        self.columns.iter().find(|c| c.key == key)
    }

    /// Column keys in display order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.key.as_str())
    }

    /// Columns that take part in free-text search.
    pub fn searchable(&self) -> impl Iterator<Item = &Column<T>> {
        self.columns.iter().filter(|c| c.is_searchable())
    }

    /// Columns that offer a discrete-value filter.
    pub fn filterable(&self) -> impl Iterator<Item = &Column<T>> {
        self.columns.iter().filter(|c| c.is_filterable())
    }
}

impl<'a, T> IntoIterator for &'a ColumnSet<T> {
    type Item = &'a Column<T>;
    type IntoIter = std::slice::Iter<'a, Column<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}
