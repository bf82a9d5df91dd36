use std::time::Duration;

use async_trait::async_trait;
use querybench_core::{DataSource, SourceError};
use sqlx::pool::PoolConnection;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres};

use crate::error::StoreError;

const INSURANCE_TABLES: [&str; 4] = ["customer", "insurance_policy", "claim", "payment"];

/// Postgres connection provider. Each query checks one connection out of the
/// pool; by default the connection is closed afterwards rather than returned.
pub struct PgSource {
    pool: PgPool,
    close_on_release: bool,
}

impl PgSource {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            close_on_release: true,
        }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(database_url)
            .await?;
        tracing::debug!(max_connections, "postgres pool connected");
        Ok(Self::new(pool))
    }

    /// Keep released connections in the pool for reuse.
    pub fn keep_connections(mut self, keep: bool) -> Self {
        self.close_on_release = !keep;
        self
    }

    pub fn closes_on_release(&self) -> bool {
        self.close_on_release
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Insurance tables that do not exist in the connected database.
    pub async fn missing_tables(&self) -> Result<Vec<&'static str>, StoreError> {
        let mut missing = Vec::new();
        for table in INSURANCE_TABLES {
            let exists: bool = sqlx::query_scalar("SELECT to_regclass($1) IS NOT NULL")
                .bind(table)
                .fetch_one(&self.pool)
                .await?;
            if !exists {
                missing.push(table);
            }
        }
        Ok(missing)
    }

    pub async fn close(&self) {
        tracing::debug!(idle = self.pool.num_idle(), "closing postgres pool");
        self.pool.close().await;
    }
}

#[async_trait]
impl DataSource for PgSource {
    type Handle = PoolConnection<Postgres>;

    async fn acquire(&self) -> Result<Self::Handle, SourceError> {
        self.pool
            .acquire()
            .await
            .map_err(|e| SourceError::Acquire(e.to_string()))
    }

    async fn release(&self, handle: Self::Handle) -> Result<(), SourceError> {
        if self.close_on_release {
            handle
                .close()
                .await
                .map_err(|e| SourceError::Release(e.to_string()))
        } else {
            drop(handle);
            Ok(())
        }
    }
}
