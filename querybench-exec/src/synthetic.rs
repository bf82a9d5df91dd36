//! In-memory data source for exercising the harness without a database.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use querybench_core::{Catalog, CatalogError, DataSource, Query, QueryError, SourceError};
use serde_json::{json, Value as JsonValue};

/// Counts handle checkouts so tests can assert nothing leaks.
#[derive(Debug, Default)]
pub struct SyntheticSource {
    acquired: AtomicUsize,
    released: AtomicUsize,
    fail_acquire: AtomicBool,
    fail_release: AtomicBool,
}

#[derive(Debug)]
pub struct SyntheticHandle {
    pub id: usize,
}

impl SyntheticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_acquire(self) -> Self {
        self.fail_acquire.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_release(self) -> Self {
        self.fail_release.store(true, Ordering::SeqCst);
        self
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn outstanding(&self) -> usize {
        self.acquired() - self.released()
    }
}

#[async_trait]
impl DataSource for SyntheticSource {
    type Handle = SyntheticHandle;

    async fn acquire(&self) -> Result<SyntheticHandle, SourceError> {
        if self.fail_acquire.load(Ordering::SeqCst) {
            return Err(SourceError::Acquire("synthetic source unavailable".to_string()));
        }
        let id = self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(SyntheticHandle { id })
    }

    async fn release(&self, _handle: SyntheticHandle) -> Result<(), SourceError> {
        // The handle is gone either way; only the report differs.
        self.released.fetch_add(1, Ordering::SeqCst);
        if self.fail_release.load(Ordering::SeqCst) {
            return Err(SourceError::Release("synthetic release failure".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub enum SyntheticQuery {
    /// Sleeps, then returns `value`.
    Delay { delay: Duration, value: JsonValue },
    Fail(String),
    Panic(String),
}

impl SyntheticQuery {
    pub fn value(value: JsonValue) -> Self {
        SyntheticQuery::Delay {
            delay: Duration::ZERO,
            value,
        }
    }

    pub fn delayed(millis: u64, value: JsonValue) -> Self {
        SyntheticQuery::Delay {
            delay: Duration::from_millis(millis),
            value,
        }
    }
}

#[async_trait]
impl Query<SyntheticSource> for SyntheticQuery {
    async fn run(&self, _handle: &mut SyntheticHandle) -> Result<JsonValue, QueryError> {
        match self {
            SyntheticQuery::Delay { delay, value } => {
                if !delay.is_zero() {
                    tokio::time::sleep(*delay).await;
                }
                Ok(value.clone())
            }
            SyntheticQuery::Fail(message) => Err(QueryError::Failed(message.clone())),
            SyntheticQuery::Panic(message) => panic!("{message}"),
        }
    }
}

/// Four read shapes mirroring the insurance catalog: list, count, lookup by
/// id, and children of a parent.
pub fn synthetic_catalog() -> Result<Catalog<SyntheticSource>, CatalogError> {
    let mut catalog = Catalog::new();
    catalog.register(
        "list_rows",
        SyntheticQuery::delayed(4, json!([{"id": 1}, {"id": 2}, {"id": 3}])),
    )?;
    catalog.register("count_rows", SyntheticQuery::delayed(1, json!(3)))?;
    catalog.register("row_by_id", SyntheticQuery::delayed(2, json!({"id": 1})))?;
    catalog.register(
        "children_by_parent",
        SyntheticQuery::delayed(3, json!([{"id": 10, "parent_id": 1}])),
    )?;
    Ok(catalog)
}
