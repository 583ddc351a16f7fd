//! Table presentation: wires the controllers into the filter -> sort -> paginate
//! pipeline and produces a renderable view.
//!
//! The filtered and sorted ordering is cached and only recomputed when rows,
//! the query, a filter selection or the sort state change. Paging slices the
//! cached ordering, and column resizing never touches it.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::column::{Alignment, Cell, ColumnSet};
use crate::config::TableConfig;
use crate::error::ConfigError;
use crate::filter::{FilterState, filter_indices, filter_options};
use crate::guard::isolate;
use crate::paginate::{PageInfo, Pagination};
use crate::resize::{ColumnLayout, PointerCapture};
use crate::sort::{SortDirection, SortState, sort_indices};
use crate::storage::{Preferences, page_size_key};

type CardFn<T> = Arc<dyn Fn(&T) -> Card + Send + Sync>;

/// Available width class for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Viewport {
    #[default]
    Wide,
    Narrow,
}

impl Viewport {
    /// Classify a viewport width against the config breakpoint.
    pub fn from_width(width: u32, config: &TableConfig) -> Self {
        if width < config.narrow_breakpoint {
            Viewport::Narrow
        } else {
            Viewport::Wide
        }
    }
}

/// A row rendered as a card for narrow viewports.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Card {
    pub title: String,
    pub fields: Vec<(String, Cell)>,
}

impl Card {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, label: impl Into<String>, value: Cell) -> Self {
        self.fields.push((label.into(), value));
        self
    }
}

/// Caller options for one table.
pub struct TableOptions<T> {
    pub search_placeholder: String,
    pub empty_message: String,
    pub empty_icon: Option<String>,
    pub card_renderer: Option<CardFn<T>>,
    pub initial_sort: SortState,
    /// Used when no page size has been persisted for this table.
    pub initial_page_size: Option<usize>,
    pub loading: bool,
    pub config: TableConfig,
}

impl<T> Default for TableOptions<T> {
    fn default() -> Self {
        Self {
            search_placeholder: "Search...".to_string(),
            empty_message: "No items found".to_string(),
            empty_icon: None,
            card_renderer: None,
            initial_sort: SortState::unsorted(),
            initial_page_size: None,
            loading: false,
            config: TableConfig::default(),
        }
    }
}

impl<T> Clone for TableOptions<T> {
    fn clone(&self) -> Self {
        Self {
            search_placeholder: self.search_placeholder.clone(),
            empty_message: self.empty_message.clone(),
            empty_icon: self.empty_icon.clone(),
            card_renderer: self.card_renderer.clone(),
            initial_sort: self.initial_sort.clone(),
            initial_page_size: self.initial_page_size,
            loading: self.loading,
            config: self.config.clone(),
        }
    }
}

impl<T> fmt::Debug for TableOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableOptions")
            .field("search_placeholder", &self.search_placeholder)
            .field("empty_message", &self.empty_message)
            .field("empty_icon", &self.empty_icon)
            .field("card_renderer", &self.card_renderer.is_some())
            .field("initial_sort", &self.initial_sort)
            .field("initial_page_size", &self.initial_page_size)
            .field("loading", &self.loading)
            .field("config", &self.config)
            .finish()
    }
}

impl<T> TableOptions<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.search_placeholder = placeholder.into();
        self
    }

    pub fn with_empty_message(mut self, message: impl Into<String>) -> Self {
        self.empty_message = message.into();
        self
    }

    pub fn with_empty_icon(mut self, icon: impl Into<String>) -> Self {
        self.empty_icon = Some(icon.into());
        self
    }

    /// Render rows as cards in narrow viewports.
    pub fn with_card_renderer<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> Card + Send + Sync + 'static,
    {
        self.card_renderer = Some(Arc::new(f));
        self
    }

    pub fn with_initial_sort(mut self, sort: SortState) -> Self {
        self.initial_sort = sort;
        self
    }

    pub fn with_initial_page_size(mut self, size: usize) -> Self {
        self.initial_page_size = Some(size);
        self
    }

    pub fn with_loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    pub fn with_config(mut self, config: TableConfig) -> Self {
        self.config = config;
        self
    }
}

/// Header cell state for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderCell {
    pub key: String,
    pub label: String,
    #[serde(skip)]
    pub align: Alignment,
    pub width: Option<u32>,
    pub sortable: bool,
    /// Direction if this is the active sort column.
    pub sort: Option<SortDirection>,
    pub filterable: bool,
    /// Active filter selection on this column.
    pub filter: Option<String>,
}

/// One visible row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRow {
    /// Position of the row in the table's input rows.
    pub index: usize,
    pub cells: Vec<Cell>,
}

/// What the table body shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Loading,
    Empty {
        message: String,
        icon: Option<String>,
    },
    Rows(Vec<RenderedRow>),
    Cards(Vec<(usize, Card)>),
}

/// Everything a host needs to draw the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    pub identity: String,
    pub search_placeholder: String,
    pub query: String,
    pub headers: Vec<HeaderCell>,
    pub body: Body,
    /// `None` while loading.
    pub page: Option<PageInfo>,
    /// Filter options per filterable column, from the unfiltered rows.
    pub filter_options: BTreeMap<String, Vec<String>>,
    pub page_size_options: Vec<usize>,
}

impl TableView {
    pub fn page(&self) -> Option<&PageInfo> {
        self.page.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.body, Body::Loading)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.body, Body::Empty { .. })
    }

    /// Rendered rows, if the body is in row mode.
    pub fn rows(&self) -> &[RenderedRow] {
        match &self.body {
            Body::Rows(rows) => rows,
            _ => &[],
        }
    }
}

/// Cached output of filter + sort.
#[derive(Debug, Default)]
struct Pipeline {
    indices: Vec<usize>,
    stale: bool,
}

/// A table instance: rows, columns and the UI state around them.
///
/// Page size and column widths persist under `identity`; everything else
/// starts fresh on each construction.
pub struct Table<T> {
    identity: String,
    columns: ColumnSet<T>,
    options: TableOptions<T>,
    prefs: Preferences,
    rows: Vec<T>,
    filter: FilterState,
    sort: SortState,
    pagination: Pagination,
    layout: ColumnLayout,
    pipeline: Pipeline,
    dirty: bool,
}

impl<T> fmt::Debug for Table<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("identity", &self.identity)
            .field("columns", &self.columns)
            .field("rows", &self.rows.len())
            .field("filter", &self.filter)
            .field("sort", &self.sort)
            .field("pagination", &self.pagination)
            .field("layout", &self.layout)
            .finish()
    }
}

impl<T> Table<T> {
    /// Create a table with default options.
    pub fn new(identity: impl Into<String>, columns: ColumnSet<T>, prefs: Preferences) -> Self {
        Self::build(identity.into(), columns, prefs, TableOptions::default())
    }

    /// Create a table with explicit options.
    pub fn with_options(
        identity: impl Into<String>,
        columns: ColumnSet<T>,
        prefs: Preferences,
        options: TableOptions<T>,
    ) -> Result<Self, ConfigError> {
        options.config.validate()?;
        if options.initial_page_size == Some(0) {
            return Err(ConfigError::InvalidPageSize(0));
        }
        Ok(Self::build(identity.into(), columns, prefs, options))
    }

    fn build(
        identity: String,
        columns: ColumnSet<T>,
        prefs: Preferences,
        options: TableOptions<T>,
    ) -> Self {
        let page_size = prefs
            .get::<usize>(&page_size_key(&identity))
            .filter(|&n| n > 0)
            .or(options.initial_page_size)
            .unwrap_or(options.config.default_page_size);
        let layout = ColumnLayout::new(&identity, &columns, &options.config, prefs.clone());
        let sort = options.initial_sort.clone();

        Self {
            identity,
            columns,
            options,
            prefs,
            rows: Vec::new(),
            filter: FilterState::default(),
            sort,
            pagination: Pagination::new(page_size),
            layout,
            pipeline: Pipeline {
                indices: Vec::new(),
                stale: true,
            },
            dirty: true,
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn columns(&self) -> &ColumnSet<T> {
        &self.columns
    }

    pub fn options(&self) -> &TableOptions<T> {
        &self.options
    }

    pub fn config(&self) -> &TableConfig {
        &self.options.config
    }

    /// Whether anything changed since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn invalidate(&mut self) {
        self.pipeline.stale = true;
        self.dirty = true;
    }

    // -------------------------------------------------------------------------
    // Rows
    // -------------------------------------------------------------------------

    /// Replace the rows with a fresh snapshot.
    pub fn set_rows(&mut self, rows: Vec<T>) {
        self.rows = rows;
        self.invalidate();
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    /// Input row at `index`, as referenced by [`RenderedRow::index`].
    pub fn row(&self, index: usize) -> Option<&T> {
        self.rows.get(index)
    }

    pub fn set_loading(&mut self, loading: bool) {
        if self.options.loading != loading {
            self.options.loading = loading;
            self.dirty = true;
        }
    }

    pub fn is_loading(&self) -> bool {
        self.options.loading
    }

    // -------------------------------------------------------------------------
    // Search and filters
    // -------------------------------------------------------------------------

    pub fn filter_state(&self) -> &FilterState {
        &self.filter
    }

    pub fn query(&self) -> &str {
        &self.filter.query
    }

    /// Set the free-text query. A changed query returns to page 1.
    pub fn set_query(&mut self, query: impl Into<String>) {
        if self.filter.set_query(query) {
            self.pagination.reset();
            self.invalidate();
        } else {
            self.dirty = true;
        }
    }

    /// Select a filter value for a column. An empty value clears it.
    pub fn set_filter(&mut self, key: &str, value: impl Into<String>) {
        if self.filter.set_selection(key, value) {
            self.pagination.reset();
            self.invalidate();
        }
    }

    pub fn clear_filter(&mut self, key: &str) {
        if self.filter.clear_selection(key) {
            self.pagination.reset();
            self.invalidate();
        }
    }

    /// Clear the query and every filter selection.
    pub fn clear_filters(&mut self) {
        if self.filter.is_active() || !self.filter.query.is_empty() {
            self.filter.clear_all();
            self.pagination.reset();
            self.invalidate();
        }
    }

    /// Filter options per column, from all rows regardless of active filters.
    pub fn filter_options(&self) -> BTreeMap<String, Vec<String>> {
        filter_options(&self.rows, &self.columns)
    }

    // -------------------------------------------------------------------------
    // Sorting
    // -------------------------------------------------------------------------

    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    /// Header click on `key`. Ignored for unknown or non-sortable columns.
    ///
    /// Returns `true` if the sort state changed.
    pub fn request_sort(&mut self, key: &str) -> bool {
        if !self.columns.get(key).is_some_and(|c| c.is_sortable()) {
            return false;
        }
        self.sort.request_sort(key, self.options.config.sort_cycle);
        self.pagination.reset();
        self.invalidate();
        true
    }

    /// Replace the sort state outright.
    pub fn set_sort(&mut self, sort: SortState) {
        if self.sort != sort {
            self.sort = sort;
            self.pagination.reset();
            self.invalidate();
        }
    }

    // -------------------------------------------------------------------------
    // Pipeline
    // -------------------------------------------------------------------------

    fn ensure_pipeline(&mut self) {
        if !self.pipeline.stale {
            return;
        }
        let mode = self.options.config.search_mode;
        let filtered = filter_indices(&self.rows, &self.columns, &self.filter, mode);
        let sorted = sort_indices(&self.rows, filtered, &self.columns, &self.sort);
        log::trace!(
            "table '{}': {} of {} rows after filter",
            self.identity,
            sorted.len(),
            self.rows.len()
        );
        if self.pagination.set_total_items(sorted.len()) {
            log::debug!("table '{}': page out of range, back to page 1", self.identity);
        }
        self.pipeline.indices = sorted;
        self.pipeline.stale = false;
    }

    /// Number of rows that pass the current filters.
    pub fn filtered_len(&mut self) -> usize {
        self.ensure_pipeline();
        self.pipeline.indices.len()
    }

    /// All filtered rows in sorted order.
    pub fn filtered_rows(&mut self) -> Vec<&T> {
        self.ensure_pipeline();
        self.pipeline.indices.iter().map(|&i| &self.rows[i]).collect()
    }

    /// Rows on the current page, in display order.
    pub fn visible_rows(&mut self) -> Vec<&T> {
        self.ensure_pipeline();
        let range = self.pagination.range();
        self.pipeline.indices[range]
            .iter()
            .map(|&i| &self.rows[i])
            .collect()
    }

    // -------------------------------------------------------------------------
    // Pagination
    // -------------------------------------------------------------------------

    pub fn pagination(&mut self) -> &Pagination {
        self.ensure_pipeline();
        &self.pagination
    }

    pub fn page_info(&mut self) -> PageInfo {
        self.ensure_pipeline();
        self.pagination.info()
    }

    fn page_changed(&mut self, changed: bool) -> bool {
        self.dirty |= changed;
        changed
    }

    pub fn go_to_page(&mut self, n: usize) -> bool {
        self.ensure_pipeline();
        let changed = self.pagination.go_to_page(n);
        self.page_changed(changed)
    }

    pub fn next_page(&mut self) -> bool {
        self.ensure_pipeline();
        let changed = self.pagination.go_to_next_page();
        self.page_changed(changed)
    }

    pub fn previous_page(&mut self) -> bool {
        self.ensure_pipeline();
        let changed = self.pagination.go_to_previous_page();
        self.page_changed(changed)
    }

    pub fn first_page(&mut self) -> bool {
        self.ensure_pipeline();
        let changed = self.pagination.go_to_first_page();
        self.page_changed(changed)
    }

    pub fn last_page(&mut self) -> bool {
        self.ensure_pipeline();
        let changed = self.pagination.go_to_last_page();
        self.page_changed(changed)
    }

    /// Change and persist the page size. Returns to page 1.
    pub fn change_page_size(&mut self, size: usize) -> Result<(), ConfigError> {
        self.pagination.change_page_size(size)?;
        self.prefs.set(&page_size_key(&self.identity), &size);
        self.dirty = true;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Column widths
    // -------------------------------------------------------------------------

    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    pub fn start_resize(&mut self, key: &str, pointer_x: i32) -> Option<PointerCapture> {
        self.layout.start_resize(key, pointer_x)
    }

    pub fn drag_move(&mut self, pointer_x: i32) -> Option<u32> {
        let width = self.layout.drag_move(pointer_x);
        self.dirty |= width.is_some();
        width
    }

    pub fn end_resize(&mut self) -> bool {
        self.layout.end_resize()
    }

    pub fn cancel_resize(&mut self) -> bool {
        let cancelled = self.layout.cancel_resize();
        self.dirty |= cancelled;
        cancelled
    }

    pub fn reset_widths(&mut self) {
        self.layout.reset_widths();
        self.dirty = true;
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    fn headers(&self) -> Vec<HeaderCell> {
        self.columns
            .iter()
            .map(|column| HeaderCell {
                key: column.key().to_string(),
                label: column.header().to_string(),
                align: column.alignment(),
                width: self.layout.width(column.key()),
                sortable: column.is_sortable(),
                sort: self.sort.direction_for(column.key()),
                filterable: column.is_filterable(),
                filter: self.filter.selection(column.key()).map(str::to_string),
            })
            .collect()
    }

    fn render_card(&self, row: &T) -> Card {
        if let Some(renderer) = &self.options.card_renderer
            && let Some(card) = isolate(&self.identity, "card renderer", || renderer(row))
        {
            return card;
        }
        // Fallback: one field per column.
        self.columns
            .iter()
            .fold(Card::default(), |card, column| {
                card.field(column.header(), column.render(row))
            })
    }

    /// Run the pipeline and render the current page.
    ///
    /// While loading, the pipeline is skipped and the body is
    /// [`Body::Loading`].
    pub fn view(&mut self, viewport: Viewport) -> TableView {
        let headers = self.headers();
        let page_size_options = self.options.config.page_size_options.clone();

        if self.options.loading {
            return TableView {
                identity: self.identity.clone(),
                search_placeholder: self.options.search_placeholder.clone(),
                query: self.filter.query.clone(),
                headers,
                body: Body::Loading,
                page: None,
                filter_options: BTreeMap::new(),
                page_size_options,
            };
        }

        self.ensure_pipeline();
        let info = self.pagination.info();
        let visible = &self.pipeline.indices[info.range()];

        let body = if visible.is_empty() {
            Body::Empty {
                message: self.options.empty_message.clone(),
                icon: self.options.empty_icon.clone(),
            }
        } else if viewport == Viewport::Narrow && self.options.card_renderer.is_some() {
            Body::Cards(
                visible
                    .iter()
                    .map(|&i| (i, self.render_card(&self.rows[i])))
                    .collect(),
            )
        } else {
            Body::Rows(
                visible
                    .iter()
                    .map(|&i| RenderedRow {
                        index: i,
                        cells: self
                            .columns
                            .iter()
                            .map(|column| column.render(&self.rows[i]))
                            .collect(),
                    })
                    .collect(),
            )
        };

        TableView {
            identity: self.identity.clone(),
            search_placeholder: self.options.search_placeholder.clone(),
            query: self.filter.query.clone(),
            headers,
            body,
            page: Some(info),
            filter_options: self.filter_options(),
            page_size_options,
        }
    }
}
