//! Resizable column layout.
//!
//! Dragging is an explicit state machine:
//!
//! ```text
//! Idle --start_resize--> Resizing(key, start_x, start_width) --end_resize--> Idle
//!                            |  ^                                |
//!                            +--+ drag_move                      +--> persist widths
//! ```
//!
//! Only one drag can be active. Starting a new one while resizing replaces the
//! previous drag without persisting it. Widths are written to storage on drag
//! end only, never on every move.

use std::collections::BTreeMap;

use crate::column::ColumnSet;
use crate::config::TableConfig;
use crate::storage::{Preferences, column_widths_key};

/// Drag state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResizeState {
    #[default]
    Idle,
    Resizing {
        key: String,
        start_x: i32,
        start_width: u32,
    },
}

/// What the host must do with pointer listeners after [`ColumnLayout::start_resize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerCapture {
    /// Entered `Resizing` from `Idle`: attach move/release listeners.
    Acquired,
    /// Already resizing: listeners are attached, the previous drag was replaced.
    Retained,
}

#[derive(Debug, Clone, Copy)]
struct Bounds {
    min: u32,
    max: u32,
    initial: u32,
}

/// Per-column widths for one table, persisted under `<identity>-column-widths`.
#[derive(Debug)]
pub struct ColumnLayout {
    storage_key: String,
    widths: BTreeMap<String, u32>,
    bounds: BTreeMap<String, Bounds>,
    state: ResizeState,
    prefs: Preferences,
}

impl ColumnLayout {
    /// Build the layout for `columns`, restoring persisted widths for `identity`.
    ///
    /// Persisted entries for unknown columns are ignored and known ones are
    /// clamped into the column's bounds.
    pub fn new<T>(
        identity: &str,
        columns: &ColumnSet<T>,
        config: &TableConfig,
        prefs: Preferences,
    ) -> Self {
        let storage_key = column_widths_key(identity);
        let bounds: BTreeMap<String, Bounds> = columns
            .iter()
            .map(|column| {
                let (min, max, initial) = column.width_config().resolve(config);
                (column.key().to_string(), Bounds { min, max, initial })
            })
            .collect();

        let persisted: BTreeMap<String, u32> = prefs.get(&storage_key).unwrap_or_default();
        let widths = bounds
            .iter()
            .map(|(key, b)| {
                let width = persisted
                    .get(key)
                    .map_or(b.initial, |&w| w.clamp(b.min, b.max));
                (key.clone(), width)
            })
            .collect();

        Self {
            storage_key,
            widths,
            bounds,
            state: ResizeState::Idle,
            prefs,
        }
    }

    /// Current widths by column key.
    pub fn widths(&self) -> &BTreeMap<String, u32> {
        &self.widths
    }

    pub fn width(&self, key: &str) -> Option<u32> {
        self.widths.get(key).copied()
    }

    pub fn state(&self) -> &ResizeState {
        &self.state
    }

    pub fn is_resizing(&self) -> bool {
        matches!(self.state, ResizeState::Resizing { .. })
    }

    /// Key of the column being dragged.
    pub fn active_column(&self) -> Option<&str> {
        match &self.state {
            ResizeState::Resizing { key, .. } => Some(key),
            ResizeState::Idle => None,
        }
    }

    /// Begin dragging the handle of `key` at pointer position `pointer_x`.
    ///
    /// Returns `None` for an unknown column.
    pub fn start_resize(&mut self, key: &str, pointer_x: i32) -> Option<PointerCapture> {
        let Some(&start_width) = self.widths.get(key) else {
            log::debug!("resize requested for unknown column '{}'", key);
            return None;
        };
        let capture = if self.is_resizing() {
            log::debug!(
                "resize of '{}' replaces active drag on '{}'",
                key,
                self.active_column().unwrap_or_default()
            );
            PointerCapture::Retained
        } else {
            PointerCapture::Acquired
        };
        self.state = ResizeState::Resizing {
            key: key.to_string(),
            start_x: pointer_x,
            start_width,
        };
        Some(capture)
    }

    /// Pointer moved to `pointer_x`. Returns the dragged column's new width.
    pub fn drag_move(&mut self, pointer_x: i32) -> Option<u32> {
        let ResizeState::Resizing {
            key,
            start_x,
            start_width,
        } = &self.state
        else {
            return None;
        };
        let bounds = self.bounds.get(key)?;
        let delta = i64::from(pointer_x) - i64::from(*start_x);
        let proposed = i64::from(*start_width) + delta;
        let width = proposed.clamp(i64::from(bounds.min), i64::from(bounds.max)) as u32;
        self.widths.insert(key.clone(), width);
        Some(width)
    }

    /// Release the handle and persist all widths.
    ///
    /// Returns `true` if a drag was active, in which case the host should
    /// detach its pointer listeners.
    pub fn end_resize(&mut self) -> bool {
        if let ResizeState::Resizing { key, .. } = std::mem::take(&mut self.state) {
            log::debug!(
                "column '{}' resized to {:?}",
                key,
                self.widths.get(&key)
            );
            self.prefs.set(&self.storage_key, &self.widths);
            return true;
        }
        false
    }

    /// Abort the drag, restoring the width it started from. Nothing is persisted.
    pub fn cancel_resize(&mut self) -> bool {
        if let ResizeState::Resizing {
            key, start_width, ..
        } = std::mem::take(&mut self.state)
        {
            self.widths.insert(key, start_width);
            return true;
        }
        false
    }

    /// Drop persisted widths and return every column to its initial width.
    pub fn reset_widths(&mut self) {
        self.state = ResizeState::Idle;
        self.widths = self
            .bounds
            .iter()
            .map(|(key, b)| (key.clone(), b.initial))
            .collect();
        self.prefs.remove(&self.storage_key);
    }
}
