use querybench_core::{CatalogError, ConfigError, ExecutionMode};

/// Worker pool lifecycle failure. Fatal for the `execute` call that hit it.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("worker pool needs at least one worker")]
    ZeroWorkers,
    #[error("multiprocess mode requires a worker command")]
    NoWorkerCommand,
    #[error("failed to spawn worker process {slot}: {message}")]
    Spawn { slot: usize, message: String },
    #[error("worker process {slot} i/o error: {message}")]
    Io { slot: usize, message: String },
    #[error("worker process {slot} exited before answering query {index}")]
    WorkerDied { slot: usize, index: usize },
    #[error("worker process {slot} sent a malformed response: {message}")]
    Protocol { slot: usize, message: String },
    #[error("worker process {slot} exited with {status}")]
    WorkerExit { slot: usize, status: String },
    #[error("worker pool is closed")]
    Closed,
    #[error("worker task join error: {0}")]
    Join(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("batch size must be greater than zero")]
    ZeroBatchSize,
    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Errors surfaced to the caller of a sweep. No partial report accompanies them.
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("{mode} experiment with {workers} workers, batch size {batch_size} aborted: {source}")]
    Pool {
        mode: ExecutionMode,
        workers: usize,
        batch_size: usize,
        #[source]
        source: ExecError,
    },
}

/// Errors of the worker-process serve loop.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed request: {0}")]
    Request(#[from] serde_json::Error),
}
