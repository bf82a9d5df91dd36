use thiserror::Error;

/// Failure raised by a single query operation. Always recovered by the execution unit.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("{0}")]
    Failed(String),
    #[error("query timed out after {millis}ms")]
    TimedOut { millis: u64 },
    #[error("query panicked: {0}")]
    Panicked(String),
}

impl QueryError {
    pub fn failed(message: impl std::fmt::Display) -> Self {
        Self::Failed(message.to_string())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("failed to acquire connection: {0}")]
    Acquire(String),
    #[error("failed to release connection: {0}")]
    Release(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("operation already registered: {0}")]
    Duplicate(String),
    #[error("catalog is empty; cannot generate {requested} operations")]
    Empty { requested: usize },
}

/// Rejected benchmark configuration. Nothing is substituted for a rejected value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("number of queries must be greater than zero")]
    NoQueries,
    #[error("worker count list is empty")]
    NoWorkerCounts,
    #[error("batch size list is empty")]
    NoBatchSizes,
    #[error("no execution mode selected (enable threaded and/or multiprocess)")]
    NoModes,
    #[error("worker count must be greater than zero")]
    ZeroWorkers,
    #[error("batch size must be greater than zero (use none for a single batch)")]
    ZeroBatchSize,
    #[error("request asks for {requested} queries but {generated} were generated")]
    QueryCountMismatch { requested: usize, generated: usize },
}
