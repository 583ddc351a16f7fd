//! Search and filter controller.
//!
//! A row survives filtering when the free-text query matches at least one
//! searchable column AND every active discrete filter matches exactly.

use std::collections::BTreeMap;

use nucleo_matcher::pattern::{Atom, AtomKind, CaseMatching, Normalization};
use nucleo_matcher::{Config, Matcher, Utf32Str};
use serde::{Deserialize, Serialize};

use crate::column::ColumnSet;

/// How the free-text query is matched against searchable text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Case-insensitive contiguous substring.
    #[default]
    Substring,
    /// Case-insensitive fuzzy match (characters in order, gaps allowed).
    Fuzzy,
}

/// Free-text query plus discrete per-column filter selections.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterState {
    pub query: String,
    /// Column key -> selected value.
    pub selections: BTreeMap<String, String>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_selection(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_selection(key, value);
        self
    }

    /// The query as it is matched: trimmed.
    pub fn normalized_query(&self) -> &str {
        self.query.trim()
    }

    /// Replace the query. Returns `true` if the effective query changed.
    pub fn set_query(&mut self, query: impl Into<String>) -> bool {
        let query = query.into();
        let changed = query.trim() != self.normalized_query();
        self.query = query;
        changed
    }

    /// Select `value` for column `key`. An empty value clears the filter.
    ///
    /// Returns `true` if the selection changed.
    pub fn set_selection(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        let value = value.into();
        if value.is_empty() {
            return self.selections.remove(&key).is_some();
        }
        self.selections.insert(key, value.clone()) != Some(value)
    }

    /// Remove the filter on `key`. Returns `true` if one was active.
    pub fn clear_selection(&mut self, key: &str) -> bool {
        self.selections.remove(key).is_some()
    }

    /// Drop the query and every selection.
    pub fn clear_all(&mut self) {
        self.query.clear();
        self.selections.clear();
    }

    pub fn selection(&self, key: &str) -> Option<&str> {
        self.selections.get(key).map(String::as_str)
    }

    /// Whether any predicate is in effect.
    pub fn is_active(&self) -> bool {
        !self.normalized_query().is_empty() || !self.selections.is_empty()
    }
}

/// A compiled query, reused across all rows of one pass.
struct QueryMatcher {
    matcher: Matcher,
    atom: Atom,
    buf: Vec<char>,
}

impl QueryMatcher {
    /// Returns `None` for a blank query, which matches everything.
    fn new(query: &str, mode: SearchMode) -> Option<Self> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        // Only fuzzy mode folds diacritics; substring matches are literal apart from case.
        let (kind, normalization) = match mode {
            SearchMode::Substring => (AtomKind::Substring, Normalization::Never),
            SearchMode::Fuzzy => (AtomKind::Fuzzy, Normalization::Smart),
        };
        let atom = Atom::new(
            &query.to_lowercase(),
            CaseMatching::Ignore,
            normalization,
            kind,
            false,
        );
        Some(Self {
            matcher: Matcher::new(Config::DEFAULT),
            atom,
            buf: Vec::new(),
        })
    }

    fn matches(&mut self, haystack: &str) -> bool {
        let haystack = Utf32Str::new(haystack, &mut self.buf);
        self.atom.score(haystack, &mut self.matcher).is_some()
    }
}

/// Positions into `rows` of the rows that pass `state`.
pub(crate) fn filter_indices<T>(
    rows: &[T],
    columns: &ColumnSet<T>,
    state: &FilterState,
    mode: SearchMode,
) -> Vec<usize> {
    let mut query = QueryMatcher::new(&state.query, mode);

    let mut active = Vec::with_capacity(state.selections.len());
    for (key, selected) in &state.selections {
        match columns.get(key).filter(|c| c.is_filterable()) {
            Some(column) => active.push((column, selected.as_str())),
            None => log::debug!("ignoring filter on unknown column '{}'", key),
        }
    }

    let searchable: Vec<_> = columns.searchable().collect();

    (0..rows.len())
        .filter(|&i| {
            let row = &rows[i];
            let passes_filters = active
                .iter()
                .all(|(column, selected)| column.filter_value(row).as_deref() == Some(*selected));
            if !passes_filters {
                return false;
            }
            match query.as_mut() {
                None => true,
                Some(query) => searchable.iter().any(|column| {
                    column
                        .search_value(row)
                        .is_some_and(|text| query.matches(&text))
                }),
            }
        })
        .collect()
}

/// Rows that pass `state`, in input order.
pub fn filter_rows<'a, T>(
    rows: &'a [T],
    columns: &ColumnSet<T>,
    state: &FilterState,
    mode: SearchMode,
) -> Vec<&'a T> {
    filter_indices(rows, columns, state, mode)
        .into_iter()
        .map(|i| &rows[i])
        .collect()
}

/// Filter options for every filterable column, derived from the full row set.
///
/// Callers pass the unfiltered rows so that selecting one value never removes
/// the other values from the option list.
pub fn filter_options<T>(rows: &[T], columns: &ColumnSet<T>) -> BTreeMap<String, Vec<String>> {
    columns
        .filterable()
        .map(|column| (column.key().to_string(), column.filter_options(rows)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_query_has_no_matcher() {
        assert!(QueryMatcher::new("   ", SearchMode::Substring).is_none());
    }

    #[test]
    fn test_substring_is_contiguous() {
        let mut m = QueryMatcher::new("bar", SearchMode::Substring).unwrap();
        assert!(m.matches("foo-bar"));
        assert!(m.matches("FOO-BAR"));
        assert!(!m.matches("b-a-r"));
    }

    #[test]
    fn test_fuzzy_allows_gaps() {
        let mut m = QueryMatcher::new("bar", SearchMode::Fuzzy).unwrap();
        assert!(m.matches("b-a-r"));
        assert!(!m.matches("rab"));
    }

    #[test]
    fn test_set_selection_empty_clears() {
        let mut state = FilterState::new().with_selection("status", "Running");
        assert!(state.set_selection("status", ""));
        assert!(state.selections.is_empty());
    }

    #[test]
    fn test_set_query_ignores_whitespace_only_changes() {
        let mut state = FilterState::new().with_query("web");
        assert!(!state.set_query(" web "));
        assert!(state.set_query("db"));
    }
}
