#![forbid(unsafe_code)]

//! Runs batteries of read queries under a tunable worker pool and sweeps a
//! (mode, workers, batch size) grid for the fastest configuration.

pub mod error;
pub mod executor;
pub mod optimizer;
pub mod synthetic;

pub use crate::error::{BenchError, ExecError, PoolError, WorkerError};
pub use crate::executor::{ExecutionRun, ExecutorConfig, ParallelExecutor, WorkerCommand};
pub use crate::optimizer::Optimizer;
