use std::sync::Arc;
use std::time::Instant;

use querybench_core::{DataSource, ExecutionMetrics, ExecutionMode, ExecutionOutcome, QueryOperation};

use crate::error::{ExecError, PoolError};
use crate::executor::events::{BenchEvent, EventSink, NoOpEventSink};
use crate::executor::pool::WorkerPool;
use crate::executor::resources::ResourceSample;
use crate::executor::types::ExecutorConfig;

/// Metrics of one `execute` call plus the per-call outcomes behind them.
#[derive(Debug, Clone)]
pub struct ExecutionRun {
    pub metrics: ExecutionMetrics,
    /// Ordered by query index.
    pub outcomes: Vec<ExecutionOutcome>,
    pub batch_lens: Vec<usize>,
}

/// Executes an operation sequence in consecutive batches, one fresh worker pool
/// per batch. Batch k+1 is not submitted until every outcome of batch k is in.
pub struct ParallelExecutor<S: DataSource> {
    mode: ExecutionMode,
    source: Arc<S>,
    config: ExecutorConfig,
    event_sink: Arc<dyn EventSink>,
}

impl<S: DataSource> ParallelExecutor<S> {
    pub fn new(mode: ExecutionMode, source: Arc<S>, config: ExecutorConfig) -> Self {
        Self {
            mode,
            source,
            config,
            event_sink: Arc::new(NoOpEventSink),
        }
    }

    pub fn with_event_sink(mut self, event_sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = event_sink;
        self
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub async fn execute(
        &self,
        operations: &[QueryOperation<S>],
        max_workers: usize,
        batch_size: Option<usize>,
    ) -> Result<ExecutionMetrics, ExecError> {
        Ok(self
            .execute_with_outcomes(operations, max_workers, batch_size)
            .await?
            .metrics)
    }

    /// `batch_size = None` runs everything as a single batch. A failing query
    /// only marks its own outcome; pool start/teardown failures are returned.
    pub async fn execute_with_outcomes(
        &self,
        operations: &[QueryOperation<S>],
        max_workers: usize,
        batch_size: Option<usize>,
    ) -> Result<ExecutionRun, ExecError> {
        if batch_size == Some(0) {
            return Err(ExecError::ZeroBatchSize);
        }
        if max_workers == 0 {
            return Err(PoolError::ZeroWorkers.into());
        }
        let total = operations.len();
        let batch_size = batch_size.unwrap_or(total);

        let before = ResourceSample::capture();
        let started = Instant::now();
        let mut outcomes = Vec::with_capacity(total);
        let mut batch_lens = Vec::new();

        if total > 0 {
            for (batch_index, batch) in operations.chunks(batch_size).enumerate() {
                let offset = batch_index * batch_size;
                tracing::debug!(mode = %self.mode, batch_index, batch_len = batch.len(), "batch started");

                let mut pool = WorkerPool::start(
                    self.mode,
                    &self.source,
                    &self.config,
                    max_workers,
                    batch.len(),
                )?;
                for (i, op) in batch.iter().enumerate() {
                    pool.submit(offset + i, op)?;
                }
                let batch_outcomes = pool.shutdown().await?;

                let succeeded = batch_outcomes.iter().filter(|o| o.succeeded).count();
                self.event_sink
                    .emit(BenchEvent::BatchFinished {
                        mode: self.mode,
                        workers: max_workers,
                        batch_index,
                        batch_len: batch.len(),
                        succeeded,
                        failed: batch_outcomes.len() - succeeded,
                    })
                    .await;

                batch_lens.push(batch.len());
                outcomes.extend(batch_outcomes);
            }
        }

        let total_time = started.elapsed();
        let usage = ResourceSample::capture().usage_since(&before);
        let metrics =
            ExecutionMetrics::from_outcomes(&outcomes, total_time, usage, max_workers, batch_size);

        Ok(ExecutionRun {
            metrics,
            outcomes,
            batch_lens,
        })
    }
}
