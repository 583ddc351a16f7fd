//! Headless table engine for resource-list pages.
//!
//! Every list page in the console follows the same shape: a collection of rows
//! goes through a fixed pipeline (filter, then sort, then paginate) and the
//! visible page is rendered through a set of column descriptors. This crate owns
//! that pipeline plus the small pieces of UI state around it (sort key, search
//! query, discrete filters, page, column widths) and persists per-table
//! preferences through an injected key-value store.
//!
//! # Example
//!
//! ```
//! use kubetable::prelude::*;
//!
//! #[derive(Clone, Debug)]
//! struct Pod {
//!     name: String,
//!     status: String,
//!     restarts: u32,
//! }
//!
//! let columns = ColumnSet::new(vec![
//!     Column::new("name", "Name", |p: &Pod| Cell::text(&p.name))
//!         .sortable(|p: &Pod| SortValue::text(&p.name))
//!         .searchable(|p: &Pod| p.name.clone()),
//!     Column::new("status", "Status", |p: &Pod| Cell::text(&p.status))
//!         .filterable(|p: &Pod| p.status.clone()),
//!     Column::new("restarts", "Restarts", |p: &Pod| Cell::text(p.restarts.to_string()))
//!         .sortable(|p: &Pod| SortValue::number(p.restarts)),
//! ])
//! .unwrap();
//!
//! let mut table = Table::new("pods", columns, Preferences::in_memory());
//! table.set_rows(vec![Pod { name: "web-1".into(), status: "Running".into(), restarts: 0 }]);
//! table.set_query("web");
//!
//! let view = table.view(Viewport::Wide);
//! assert_eq!(view.page().map(|p| p.total_items), Some(1));
//! ```

pub mod column;
pub mod config;
pub mod error;
pub mod filter;
pub mod guard;
pub mod paginate;
pub mod resize;
pub mod sort;
pub mod storage;
pub mod table;

pub use column::{Alignment, Cell, Column, ColumnSet, WidthBounds};
pub use config::TableConfig;
pub use error::{ConfigError, StoreError};
pub use filter::{FilterState, SearchMode, filter_options, filter_rows};
pub use paginate::{Page, PageInfo, PageLink, Pagination, paginate};
pub use resize::{ColumnLayout, PointerCapture, ResizeState};
pub use sort::{SortCycle, SortDirection, SortState, SortValue, sort_rows};
pub use storage::{KeyValueStore, MemoryStore, Preferences};
pub use table::{Body, Card, HeaderCell, RenderedRow, Table, TableOptions, TableView, Viewport};

pub mod prelude {
    pub use crate::column::{Alignment, Cell, Column, ColumnSet, WidthBounds};
    pub use crate::config::TableConfig;
    pub use crate::error::{ConfigError, StoreError};
    pub use crate::filter::{FilterState, SearchMode};
    pub use crate::paginate::{Page, PageInfo, PageLink, Pagination};
    pub use crate::resize::{ColumnLayout, PointerCapture};
    pub use crate::sort::{SortCycle, SortDirection, SortState, SortValue};
    pub use crate::storage::{KeyValueStore, MemoryStore, Preferences};
    pub use crate::table::{Body, Card, Table, TableOptions, TableView, Viewport};
}
