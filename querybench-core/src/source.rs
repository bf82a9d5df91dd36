use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::{QueryError, SourceError};

/// Connection provider for query operations.
///
/// The execution unit acquires one handle per call and hands it back through
/// [`DataSource::release`] on every exit path, so a pooled connection never
/// outlives the call that checked it out.
#[async_trait]
pub trait DataSource: Send + Sync + 'static {
    type Handle: Send + 'static;

    async fn acquire(&self) -> Result<Self::Handle, SourceError>;

    async fn release(&self, handle: Self::Handle) -> Result<(), SourceError>;
}

/// A parameterless read operation. All parameterization happens at construction time.
#[async_trait]
pub trait Query<S: DataSource>: Send + Sync {
    async fn run(&self, handle: &mut S::Handle) -> Result<JsonValue, QueryError>;
}
