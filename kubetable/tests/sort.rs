mod common;

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use common::{Pod, names, numbered_pods, pod, pod_columns};
use kubetable::{Cell, Column, ColumnSet, SortCycle, SortDirection, SortState, SortValue, sort_rows};

#[derive(Debug, Clone, PartialEq)]
struct Item {
    name: String,
    n: u32,
}

fn item(name: &str, n: u32) -> Item {
    Item {
        name: name.to_string(),
        n,
    }
}

fn item_columns() -> ColumnSet<Item> {
    ColumnSet::new(vec![
        Column::new("name", "Name", |i: &Item| Cell::text(&i.name))
            .sortable(|i: &Item| SortValue::text(&i.name)),
        Column::new("n", "N", |i: &Item| Cell::text(i.n.to_string()))
            .sortable(|i: &Item| SortValue::number(i.n)),
        Column::new("label", "Label", |i: &Item| Cell::text(&i.name)),
    ])
    .unwrap()
}

// ============================================================================
// Basic ordering
// ============================================================================

#[test]
fn test_ascending_then_descending_by_number() {
    let rows = vec![item("b", 2), item("a", 1)];
    let columns = item_columns();

    let asc = sort_rows(&rows, &columns, &SortState::ascending("n"));
    assert_eq!(asc, vec![&rows[1], &rows[0]]);

    let desc = sort_rows(&rows, &columns, &SortState::descending("n"));
    assert_eq!(desc, vec![&rows[0], &rows[1]]);
}

#[test]
fn test_unsorted_keeps_input_order() {
    let rows = vec![item("c", 3), item("a", 1), item("b", 2)];
    let sorted = sort_rows(&rows, &item_columns(), &SortState::unsorted());
    assert_eq!(sorted, rows.iter().collect::<Vec<_>>());
}

#[test]
fn test_input_rows_not_mutated() {
    let rows = vec![item("c", 3), item("a", 1)];
    let before = rows.clone();
    let _ = sort_rows(&rows, &item_columns(), &SortState::ascending("n"));
    assert_eq!(rows, before);
}

#[test]
fn test_text_is_case_insensitive() {
    let rows = vec![item("beta", 0), item("Alpha", 0), item("gamma", 0)];
    let sorted = sort_rows(&rows, &item_columns(), &SortState::ascending("name"));
    let order: Vec<&str> = sorted.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(order, vec!["Alpha", "beta", "gamma"]);
}

#[test]
fn test_timestamps_compare_numerically() {
    let mut rows = vec![
        pod("new", "Running", 1),
        pod("old", "Running", 900),
        pod("mid", "Running", 50),
    ];
    rows[0].age_ms = Some(1_000);
    rows[1].age_ms = Some(9_000_000);
    rows[2].age_ms = Some(50_000);

    let sorted = sort_rows(&rows, &pod_columns(), &SortState::descending("age"));
    assert_eq!(names(sorted), vec!["old", "mid", "new"]);
}

#[test]
fn test_creation_timestamps_from_chrono() {
    struct Event {
        name: &'static str,
        created: DateTime<FixedOffset>,
    }

    let utc = FixedOffset::east_opt(0).unwrap();
    let cest = FixedOffset::east_opt(2 * 3600).unwrap();
    let rows = vec![
        // 10:00 UTC
        Event {
            name: "b",
            created: utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
        },
        // 09:30 UTC, later wall clock but earlier instant
        Event {
            name: "a",
            created: cest.with_ymd_and_hms(2024, 5, 1, 11, 30, 0).unwrap(),
        },
        // 12:00 UTC
        Event {
            name: "c",
            created: utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        },
    ];
    let columns = ColumnSet::new(vec![
        Column::new("created", "Created", |e: &Event| Cell::text(e.created.to_rfc3339()))
            .sortable(|e: &Event| SortValue::timestamp(&e.created)),
        Column::new("created_utc", "Created (UTC)", |e: &Event| {
            Cell::text(e.created.with_timezone(&Utc).to_rfc3339())
        })
        .sortable(|e: &Event| SortValue::from(e.created.with_timezone(&Utc))),
    ])
    .unwrap();

    for key in ["created", "created_utc"] {
        let sorted = sort_rows(&rows, &columns, &SortState::ascending(key));
        let order: Vec<&str> = sorted.iter().map(|e| e.name).collect();
        assert_eq!(order, vec!["a", "b", "c"], "key={}", key);
    }
    assert_eq!(
        SortValue::from(rows[0].created),
        SortValue::Timestamp(rows[0].created.timestamp_millis())
    );
}

#[test]
fn test_unknown_or_unsortable_key_is_noop() {
    let rows = vec![item("b", 2), item("a", 1)];
    let columns = item_columns();
    assert_eq!(
        sort_rows(&rows, &columns, &SortState::ascending("missing")),
        vec![&rows[0], &rows[1]]
    );
    assert_eq!(
        sort_rows(&rows, &columns, &SortState::ascending("label")),
        vec![&rows[0], &rows[1]]
    );
}

// ============================================================================
// Stability and idempotence
// ============================================================================

#[test]
fn test_stable_for_equal_keys_in_both_directions() {
    let rows = vec![item("x1", 1), item("y2", 2), item("x2", 1), item("y1", 2), item("x3", 1)];
    let columns = item_columns();

    let asc = sort_rows(&rows, &columns, &SortState::ascending("n"));
    let asc: Vec<&str> = asc.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(asc, vec!["x1", "x2", "x3", "y2", "y1"]);

    let desc = sort_rows(&rows, &columns, &SortState::descending("n"));
    let desc: Vec<&str> = desc.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(desc, vec!["y2", "y1", "x1", "x2", "x3"]);
}

#[test]
fn test_sorting_sorted_sequence_is_identity() {
    let rows = numbered_pods(12);
    let columns = pod_columns();
    for state in [SortState::ascending("status"), SortState::descending("restarts")] {
        let once: Vec<Pod> = sort_rows(&rows, &columns, &state).into_iter().cloned().collect();
        let twice: Vec<Pod> = sort_rows(&once, &columns, &state).into_iter().cloned().collect();
        assert_eq!(once, twice);
    }
}

// ============================================================================
// Malformed values
// ============================================================================

#[test]
fn test_missing_and_nan_sort_last_in_both_directions() {
    let columns = ColumnSet::new(vec![
        Column::new("v", "V", |v: &Option<f64>| Cell::text(format!("{:?}", v)))
            .sortable(|v: &Option<f64>| SortValue::from(*v)),
    ])
    .unwrap();
    let rows = vec![None, Some(2.0), Some(f64::NAN), Some(1.0)];

    let asc = sort_rows(&rows, &columns, &SortState::ascending("v"));
    assert_eq!(asc[0], &Some(1.0));
    assert_eq!(asc[1], &Some(2.0));
    assert!(asc[2].is_none());
    assert!(asc[3].is_some_and(f64::is_nan));

    let desc = sort_rows(&rows, &columns, &SortState::descending("v"));
    assert_eq!(desc[0], &Some(2.0));
    assert_eq!(desc[1], &Some(1.0));
    assert!(desc[2].is_none());
    assert!(desc[3].is_some_and(f64::is_nan));
}

#[test]
fn test_panicking_sort_value_sorts_last() {
    common::init_logging();
    let columns = ColumnSet::new(vec![
        Column::new("n", "N", |n: &i64| Cell::text(n.to_string())).sortable(|n: &i64| {
            if *n < 0 {
                panic!("negative value");
            }
            SortValue::from(*n)
        }),
    ])
    .unwrap();
    let rows = vec![3, -1, 1, 2];

    let sorted = sort_rows(&rows, &columns, &SortState::ascending("n"));
    assert_eq!(sorted, vec![&1, &2, &3, &-1]);
}

// ============================================================================
// Header click transitions
// ============================================================================

#[test]
fn test_request_sort_new_key_starts_ascending() {
    let mut state = SortState::descending("name");
    state.request_sort("n", SortCycle::Toggle);
    assert_eq!(state, SortState::ascending("n"));
}

#[test]
fn test_toggle_cycle_third_click_returns_to_ascending() {
    let mut state = SortState::unsorted();
    state.request_sort("n", SortCycle::Toggle);
    assert_eq!(state.direction_for("n"), Some(SortDirection::Asc));
    state.request_sort("n", SortCycle::Toggle);
    assert_eq!(state.direction_for("n"), Some(SortDirection::Desc));
    state.request_sort("n", SortCycle::Toggle);
    assert_eq!(state.direction_for("n"), Some(SortDirection::Asc));
}

#[test]
fn test_tri_state_cycle_third_click_clears() {
    let mut state = SortState::unsorted();
    state.request_sort("n", SortCycle::TriState);
    state.request_sort("n", SortCycle::TriState);
    assert_eq!(state, SortState::descending("n"));
    state.request_sort("n", SortCycle::TriState);
    assert!(!state.is_sorted());
    state.request_sort("n", SortCycle::TriState);
    assert_eq!(state, SortState::ascending("n"));
}

#[test]
fn test_sort_state_serializes_lowercase_direction() {
    let json = serde_json::to_string(&SortState::descending("name")).unwrap();
    assert_eq!(json, r#"{"key":"name","direction":"desc"}"#);
}
