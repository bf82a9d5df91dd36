use std::sync::Arc;

use querybench_core::{DataSource, ExecutionMode, ExecutionOutcome, QueryOperation};

use crate::error::PoolError;
use crate::executor::process_pool::ProcessPool;
use crate::executor::thread_pool::ThreadPool;
use crate::executor::types::ExecutorConfig;

/// A worker pool living for exactly one batch.
pub(crate) enum WorkerPool<S: DataSource> {
    Threaded(ThreadPool<S>),
    MultiProcess(ProcessPool),
}

impl<S: DataSource> WorkerPool<S> {
    pub(crate) fn start(
        mode: ExecutionMode,
        source: &Arc<S>,
        config: &ExecutorConfig,
        workers: usize,
        batch_len: usize,
    ) -> Result<Self, PoolError> {
        match mode {
            ExecutionMode::Threaded => Ok(WorkerPool::Threaded(ThreadPool::start(
                source.clone(),
                workers,
                config.query_timeout,
            )?)),
            ExecutionMode::MultiProcess => {
                if workers == 0 {
                    return Err(PoolError::ZeroWorkers);
                }
                let command = config
                    .worker_command
                    .as_ref()
                    .ok_or(PoolError::NoWorkerCommand)?;
                // Never more processes than requests in the batch.
                let processes = workers.min(batch_len).max(1);
                Ok(WorkerPool::MultiProcess(ProcessPool::start(command, processes)?))
            }
        }
    }

    pub(crate) fn submit(&mut self, index: usize, op: &QueryOperation<S>) -> Result<(), PoolError> {
        match self {
            WorkerPool::Threaded(pool) => {
                pool.submit(index, op);
                Ok(())
            }
            WorkerPool::MultiProcess(pool) => pool.submit(index, op.name()),
        }
    }

    /// Waits for every submission, tears the pool down, and returns outcomes
    /// ordered by query index.
    pub(crate) async fn shutdown(self) -> Result<Vec<ExecutionOutcome>, PoolError> {
        let mut outcomes = match self {
            WorkerPool::Threaded(pool) => pool.shutdown().await?,
            WorkerPool::MultiProcess(pool) => pool.shutdown().await?,
        };
        outcomes.sort_by_key(|o| o.query_index);
        Ok(outcomes)
    }
}
