use std::sync::Arc;
use std::time::Duration;

use querybench_core::{DataSource, ExecutionOutcome, QueryOperation};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::error::PoolError;
use crate::executor::unit::execute_one;

/// Shared-memory pool: every submission is a task on the multi-threaded
/// runtime, and at most `workers` of them run a query at any instant.
pub(crate) struct ThreadPool<S: DataSource> {
    source: Arc<S>,
    permits: Arc<Semaphore>,
    timeout: Option<Duration>,
    handles: Vec<(usize, JoinHandle<ExecutionOutcome>)>,
}

impl<S: DataSource> ThreadPool<S> {
    pub(crate) fn start(
        source: Arc<S>,
        workers: usize,
        timeout: Option<Duration>,
    ) -> Result<Self, PoolError> {
        if workers == 0 {
            return Err(PoolError::ZeroWorkers);
        }
        Ok(Self {
            source,
            permits: Arc::new(Semaphore::new(workers)),
            timeout,
            handles: Vec::new(),
        })
    }

    pub(crate) fn submit(&mut self, index: usize, op: &QueryOperation<S>) {
        let source = self.source.clone();
        let permits = self.permits.clone();
        let timeout = self.timeout;
        let op = op.clone();

        let handle = tokio::spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return ExecutionOutcome::failure(index, Duration::ZERO, "worker pool closed");
            };
            execute_one(source.as_ref(), &op, index, timeout).await
        });
        self.handles.push((index, handle));
    }

    pub(crate) async fn shutdown(self) -> Result<Vec<ExecutionOutcome>, PoolError> {
        let mut outcomes = Vec::with_capacity(self.handles.len());
        let mut first_err = None;
        for (index, handle) in self.handles {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    first_err.get_or_insert(PoolError::Join(format!("query {index}: {e}")));
                }
            }
        }
        self.permits.close();
        match first_err {
            Some(e) => Err(e),
            None => Ok(outcomes),
        }
    }
}
