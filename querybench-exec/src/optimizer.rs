use std::sync::Arc;

use querybench_core::{
    validate_grid, BenchmarkRequest, Catalog, ConfigError, DataSource, ExecutionMode,
    ExperimentResult, OptimizationReport, QueryOperation,
};
use uuid::Uuid;

use crate::error::BenchError;
use crate::executor::{BenchEvent, EventSink, ExecutorConfig, NoOpEventSink, ParallelExecutor};

/// Sweeps (mode, worker count, batch size) over one fixed operation sequence.
pub struct Optimizer<S: DataSource> {
    source: Arc<S>,
    operations: Vec<QueryOperation<S>>,
    config: ExecutorConfig,
    event_sink: Arc<dyn EventSink>,
}

impl<S: DataSource> Optimizer<S> {
    /// Generates `num_queries` operations from `catalog` once; every grid cell
    /// runs the same sequence.
    pub fn new(
        catalog: &Catalog<S>,
        source: Arc<S>,
        num_queries: usize,
        config: ExecutorConfig,
    ) -> Result<Self, BenchError> {
        if num_queries == 0 {
            return Err(ConfigError::NoQueries.into());
        }
        Ok(Self {
            source,
            operations: catalog.generate(num_queries)?,
            config,
            event_sink: Arc::new(NoOpEventSink),
        })
    }

    pub fn with_event_sink(mut self, event_sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = event_sink;
        self
    }

    pub fn operations(&self) -> &[QueryOperation<S>] {
        &self.operations
    }

    pub fn num_queries(&self) -> usize {
        self.operations.len()
    }

    /// Traversal order is mode (threaded first), then worker count, then batch
    /// size, as given. The first pool failure aborts the whole sweep.
    pub async fn run_experiments(
        &self,
        worker_counts: &[usize],
        batch_sizes: &[Option<usize>],
        test_threaded: bool,
        test_multiprocess: bool,
    ) -> Result<Vec<ExperimentResult>, BenchError> {
        validate_grid(worker_counts, batch_sizes, test_threaded, test_multiprocess)?;

        let modes = [
            (ExecutionMode::Threaded, test_threaded),
            (ExecutionMode::MultiProcess, test_multiprocess),
        ];
        let sweep_id = Uuid::new_v4();
        let mut results = Vec::new();

        for mode in modes.iter().filter(|(_, on)| *on).map(|(m, _)| *m) {
            for &workers in worker_counts {
                for &batch_size in batch_sizes {
                    let effective_batch = batch_size.unwrap_or(self.num_queries());
                    self.event_sink
                        .emit(BenchEvent::ExperimentStarted {
                            sweep_id,
                            mode,
                            workers,
                            batch_size: effective_batch,
                        })
                        .await;

                    let executor =
                        ParallelExecutor::new(mode, self.source.clone(), self.config.clone())
                            .with_event_sink(self.event_sink.clone());
                    let metrics = executor
                        .execute(&self.operations, workers, batch_size)
                        .await
                        .map_err(|source| BenchError::Pool {
                            mode,
                            workers,
                            batch_size: effective_batch,
                            source,
                        })?;

                    self.event_sink
                        .emit(BenchEvent::ExperimentFinished {
                            sweep_id,
                            mode,
                            workers,
                            batch_size: effective_batch,
                            total_time: metrics.total_time,
                            success_count: metrics.success_count,
                            error_count: metrics.error_count,
                        })
                        .await;

                    results.push(ExperimentResult {
                        num_workers: workers,
                        batch_size: effective_batch,
                        mode,
                        metrics,
                    });
                }
            }
        }

        Ok(results)
    }

    /// Empty input yields the empty report.
    pub fn find_optimal_config(results: &[ExperimentResult]) -> OptimizationReport {
        OptimizationReport::from_results(results)
    }

    /// Runs the grid of `request` and reduces it to a report. The operation
    /// sequence is the one generated at construction, so `request.num_queries`
    /// must match it.
    pub async fn run(&self, request: &BenchmarkRequest) -> Result<OptimizationReport, BenchError> {
        request.validate()?;
        if request.num_queries != self.num_queries() {
            return Err(ConfigError::QueryCountMismatch {
                requested: request.num_queries,
                generated: self.num_queries(),
            }
            .into());
        }
        let results = self
            .run_experiments(
                &request.worker_counts,
                &request.batch_sizes,
                request.test_threaded,
                request.test_multiprocess,
            )
            .await?;
        Ok(Self::find_optimal_config(&results))
    }
}
