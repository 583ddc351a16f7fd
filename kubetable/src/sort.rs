//! Sort controller.
//!
//! A table has at most one active sort key. Sorting never touches the input
//! rows; it produces a new ordering, is stable, and always places missing
//! values last regardless of direction.

use std::cmp::Ordering;

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::column::ColumnSet;

/// A comparable value extracted from a row.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Number(f64),
    /// Compared case-insensitively.
    Text(String),
    /// Epoch milliseconds.
    Timestamp(i64),
    /// No value for this row. Sorts last in both directions.
    Missing,
}

impl SortValue {
    pub fn text(value: impl Into<String>) -> Self {
        SortValue::Text(value.into())
    }

    pub fn number(value: impl Into<f64>) -> Self {
        SortValue::Number(value.into())
    }

    pub fn timestamp<Tz: TimeZone>(value: &DateTime<Tz>) -> Self {
        SortValue::Timestamp(value.timestamp_millis())
    }

    pub fn millis(value: i64) -> Self {
        SortValue::Timestamp(value)
    }

    /// Whether this value sorts as missing. `NaN` counts as missing.
    pub fn is_missing(&self) -> bool {
        match self {
            SortValue::Missing => true,
            SortValue::Number(n) => n.is_nan(),
            _ => false,
        }
    }
}

impl From<&str> for SortValue {
    fn from(value: &str) -> Self {
        SortValue::Text(value.to_string())
    }
}

impl From<String> for SortValue {
    fn from(value: String) -> Self {
        SortValue::Text(value)
    }
}

impl From<f64> for SortValue {
    fn from(value: f64) -> Self {
        SortValue::Number(value)
    }
}

impl From<i64> for SortValue {
    fn from(value: i64) -> Self {
        SortValue::Number(value as f64)
    }
}

impl From<u32> for SortValue {
    fn from(value: u32) -> Self {
        SortValue::Number(value.into())
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for SortValue {
    fn from(value: DateTime<Tz>) -> Self {
        SortValue::Timestamp(value.timestamp_millis())
    }
}

impl<V: Into<SortValue>> From<Option<V>> for SortValue {
    fn from(value: Option<V>) -> Self {
        value.map_or(SortValue::Missing, Into::into)
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn is_ascending(self) -> bool {
        self == SortDirection::Asc
    }
}

/// What clicking the header of the already-descending column does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortCycle {
    /// asc -> desc -> asc -> ...
    #[default]
    Toggle,
    /// asc -> desc -> unsorted -> asc -> ...
    TriState,
}

/// Active sort key and direction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortState {
    pub key: Option<String>,
    pub direction: SortDirection,
}

impl SortState {
    /// No active sort; rows keep their input order.
    pub fn unsorted() -> Self {
        Self::default()
    }

    pub fn ascending(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            direction: SortDirection::Asc,
        }
    }

    pub fn descending(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            direction: SortDirection::Desc,
        }
    }

    pub fn is_sorted(&self) -> bool {
        self.key.is_some()
    }

    /// Direction for `key` if it is the active sort key.
    pub fn direction_for(&self, key: &str) -> Option<SortDirection> {
        match &self.key {
            Some(active) if active == key => Some(self.direction),
            _ => None,
        }
    }

    /// Apply a header click on `key`.
    ///
    /// A different key starts ascending. The active key flips direction, except
    /// that with [`SortCycle::TriState`] a descending key clears the sort.
    pub fn request_sort(&mut self, key: &str, cycle: SortCycle) {
        match self.direction_for(key) {
            None => *self = SortState::ascending(key),
            Some(SortDirection::Asc) => self.direction = SortDirection::Desc,
            Some(SortDirection::Desc) => match cycle {
                SortCycle::Toggle => self.direction = SortDirection::Asc,
                SortCycle::TriState => *self = SortState::unsorted(),
            },
        }
    }
}

/// Precomputed comparison key.
#[derive(Debug)]
enum SortKey {
    Number(f64),
    Timestamp(i64),
    Text(String),
    Missing,
}

impl SortKey {
    fn from_value(value: SortValue) -> Self {
        if value.is_missing() {
            return SortKey::Missing;
        }
        match value {
            SortValue::Number(n) => SortKey::Number(n),
            SortValue::Timestamp(ms) => SortKey::Timestamp(ms),
            SortValue::Text(s) => SortKey::Text(s.to_lowercase()),
            SortValue::Missing => SortKey::Missing,
        }
    }

    /// Orders mixed kinds deterministically: numbers, then timestamps, then text.
    fn rank(&self) -> u8 {
        match self {
            SortKey::Number(_) => 0,
            SortKey::Timestamp(_) => 1,
            SortKey::Text(_) => 2,
            SortKey::Missing => 3,
        }
    }
}

fn compare_keys(a: &SortKey, b: &SortKey, direction: SortDirection) -> Ordering {
    let ordering = match (a, b) {
        (SortKey::Missing, SortKey::Missing) => return Ordering::Equal,
        (SortKey::Missing, _) => return Ordering::Greater,
        (_, SortKey::Missing) => return Ordering::Less,
        (SortKey::Number(x), SortKey::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (SortKey::Timestamp(x), SortKey::Timestamp(y)) => x.cmp(y),
        (SortKey::Text(x), SortKey::Text(y)) => x.cmp(y),
        _ => a.rank().cmp(&b.rank()),
    };
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

/// Order `indices` (positions into `rows`) by the active sort state.
///
/// Unknown or non-sortable keys leave the order unchanged.
pub(crate) fn sort_indices<T>(
    rows: &[T],
    indices: Vec<usize>,
    columns: &ColumnSet<T>,
    state: &SortState,
) -> Vec<usize> {
    let Some(key) = state.key.as_deref() else {
        return indices;
    };
    let Some(column) = columns.get(key).filter(|c| c.is_sortable()) else {
        log::debug!("sort key '{}' does not name a sortable column", key);
        return indices;
    };

    let mut keyed: Vec<(SortKey, usize)> = indices
        .into_iter()
        .map(|i| {
            let value = column.sort_value(&rows[i]).unwrap_or(SortValue::Missing);
            (SortKey::from_value(value), i)
        })
        .collect();

    // `sort_by` is stable, so ties keep their input order in both directions.
    keyed.sort_by(|a, b| compare_keys(&a.0, &b.0, state.direction));
    keyed.into_iter().map(|(_, i)| i).collect()
}

/// Sort `rows` by the active sort state, returning a new ordering.
///
/// # Example
///
/// ```
/// use kubetable::{Cell, Column, ColumnSet, SortState, SortValue, sort_rows};
///
/// #[derive(Debug, PartialEq)]
/// struct Row { name: String, n: u32 }
///
/// let columns = ColumnSet::new(vec![
///     Column::new("n", "N", |r: &Row| Cell::text(&r.name))
///         .sortable(|r: &Row| SortValue::number(r.n)),
/// ])
/// .unwrap();
/// let rows = vec![
///     Row { name: "b".into(), n: 2 },
///     Row { name: "a".into(), n: 1 },
/// ];
///
/// let sorted = sort_rows(&rows, &columns, &SortState::ascending("n"));
/// assert_eq!(sorted[0].name, "a");
/// assert_eq!(sorted[1].name, "b");
/// ```
pub fn sort_rows<'a, T>(rows: &'a [T], columns: &ColumnSet<T>, state: &SortState) -> Vec<&'a T> {
    let indices = sort_indices(rows, (0..rows.len()).collect(), columns, state);
    indices.into_iter().map(|i| &rows[i]).collect()
}
