use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::error::{CatalogError, QueryError};
use crate::source::{DataSource, Query};

/// A named query. Cheap to clone; the query itself is shared.
pub struct QueryOperation<S: DataSource> {
    name: Arc<str>,
    query: Arc<dyn Query<S>>,
}

impl<S: DataSource> QueryOperation<S> {
    pub fn new(name: impl Into<Arc<str>>, query: impl Query<S> + 'static) -> Self {
        Self {
            name: name.into(),
            query: Arc::new(query),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn run(&self, handle: &mut S::Handle) -> Result<JsonValue, QueryError> {
        self.query.run(handle).await
    }
}

impl<S: DataSource> Clone for QueryOperation<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            query: self.query.clone(),
        }
    }
}

impl<S: DataSource> fmt::Debug for QueryOperation<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryOperation").field("name", &self.name).finish()
    }
}

/// Registry of operations keyed by a stable identifier, in registration order.
///
/// Worker processes cannot receive closures, so they re-resolve every
/// operation by name through the same catalog the parent generated from.
pub struct Catalog<S: DataSource> {
    entries: Vec<QueryOperation<S>>,
    by_name: HashMap<String, usize>,
}

impl<S: DataSource> Default for Catalog<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: DataSource> Catalog<S> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    pub fn register(
        &mut self,
        name: &str,
        query: impl Query<S> + 'static,
    ) -> Result<(), CatalogError> {
        if self.by_name.contains_key(name) {
            return Err(CatalogError::Duplicate(name.to_string()));
        }
        self.by_name.insert(name.to_string(), self.entries.len());
        self.entries.push(QueryOperation::new(name, query));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|op| op.name())
    }

    pub fn resolve(&self, name: &str) -> Option<&QueryOperation<S>> {
        self.by_name.get(name).map(|&i| &self.entries[i])
    }

    /// Returns exactly `n` operations, cycling the catalog round-robin.
    pub fn generate(&self, n: usize) -> Result<Vec<QueryOperation<S>>, CatalogError> {
        if n == 0 {
            return Ok(Vec::new());
        }
        if self.entries.is_empty() {
            return Err(CatalogError::Empty { requested: n });
        }
        Ok(self.entries.iter().cycle().take(n).cloned().collect())
    }
}
