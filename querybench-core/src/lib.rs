#![forbid(unsafe_code)]

//! Data model for parallel database-query benchmarking.
//!
//! Execution lives in `querybench-exec`; concrete data sources (Postgres) live in
//! `querybench-store`.

pub mod catalog;
pub mod error;
pub mod experiment;
pub mod metrics;
pub mod outcome;
pub mod request;
pub mod source;

pub use crate::catalog::{Catalog, QueryOperation};
pub use crate::error::{CatalogError, ConfigError, QueryError, SourceError};
pub use crate::experiment::{
    ExecutionMode, ExperimentRecord, ExperimentResult, OptimalConfig, OptimizationReport,
};
pub use crate::metrics::{ExecutionMetrics, ResourceUsage};
pub use crate::outcome::ExecutionOutcome;
pub use crate::request::{validate_grid, BenchmarkRequest};
pub use crate::source::{DataSource, Query};
