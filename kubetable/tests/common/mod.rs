#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use kubetable::{Cell, Column, ColumnSet, KeyValueStore, SortValue, StoreError};

#[derive(Debug, Clone, PartialEq)]
pub struct Pod {
    pub name: String,
    pub namespace: String,
    pub status: String,
    pub restarts: u32,
    pub age_ms: Option<i64>,
}

pub fn pod(name: &str, status: &str, restarts: u32) -> Pod {
    Pod {
        name: name.to_string(),
        namespace: "default".to_string(),
        status: status.to_string(),
        restarts,
        age_ms: Some(i64::from(restarts) * 1000),
    }
}

pub fn pod_columns() -> ColumnSet<Pod> {
    ColumnSet::new(vec![
        Column::new("name", "Name", |p: &Pod| Cell::text(&p.name))
            .sortable(|p: &Pod| SortValue::text(&p.name))
            .searchable(|p: &Pod| p.name.clone()),
        Column::new("namespace", "Namespace", |p: &Pod| Cell::text(&p.namespace))
            .searchable(|p: &Pod| p.namespace.clone())
            .filterable(|p: &Pod| p.namespace.clone()),
        Column::new("status", "Status", |p: &Pod| Cell::text(&p.status))
            .sortable(|p: &Pod| SortValue::text(&p.status))
            .filterable(|p: &Pod| p.status.clone()),
        Column::new("restarts", "Restarts", |p: &Pod| Cell::text(p.restarts.to_string()))
            .sortable(|p: &Pod| SortValue::number(p.restarts)),
        Column::new("age", "Age", |p: &Pod| {
            Cell::text(p.age_ms.map(|ms| format!("{}s", ms / 1000)).unwrap_or_default())
        })
        .sortable(|p: &Pod| SortValue::from(p.age_ms.map(SortValue::millis))),
    ])
    .unwrap()
}

/// Pods named `pod-01` .. `pod-{n}` with alternating status.
pub fn numbered_pods(n: usize) -> Vec<Pod> {
    (1..=n)
        .map(|i| {
            let status = if i % 2 == 0 { "Pending" } else { "Running" };
            pod(&format!("pod-{:02}", i), status, i as u32)
        })
        .collect()
}

pub fn names<'a>(pods: impl IntoIterator<Item = &'a Pod>) -> Vec<String> {
    pods.into_iter().map(|p| p.name.clone()).collect()
}

/// A store that fails every operation once `broken` is set.
#[derive(Debug, Default)]
pub struct FlakyStore {
    pub inner: kubetable::MemoryStore,
    pub broken: AtomicBool,
}

impl FlakyStore {
    pub fn broken() -> Arc<Self> {
        let store = Self::default();
        store.broken.store(true, Ordering::SeqCst);
        Arc::new(store)
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("quota exceeded".to_string()));
        }
        Ok(())
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check()?;
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check()?;
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.check()?;
        self.inner.remove(key)
    }
}

pub fn init_logging() {
    let _ = simplelog::TestLogger::init(
        simplelog::LevelFilter::Debug,
        simplelog::Config::default(),
    );
}
