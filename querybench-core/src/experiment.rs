use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::metrics::ExecutionMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    Threaded,
    #[serde(rename = "multiprocess")]
    MultiProcess,
}

impl ExecutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Threaded => "threaded",
            ExecutionMode::MultiProcess => "multiprocess",
        }
    }

    pub fn uses_processes(&self) -> bool {
        matches!(self, ExecutionMode::MultiProcess)
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One evaluated grid cell. `batch_size` is the effective size: an unset batch
/// size is recorded as the total query count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "ExperimentRecord", from = "ExperimentRecord")]
pub struct ExperimentResult {
    pub num_workers: usize,
    pub batch_size: usize,
    pub mode: ExecutionMode,
    pub metrics: ExecutionMetrics,
}

/// Flat wire shape of an [`ExperimentResult`], consumed by dashboards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentRecord {
    pub num_workers: usize,
    pub batch_size: usize,
    pub use_processes: bool,
    pub total_time: f64,
    pub avg_time_per_query: f64,
    pub min_time: f64,
    pub max_time: f64,
    pub success_count: usize,
    pub error_count: usize,
    pub cpu_usage_percent: f64,
    pub memory_usage_mb: f64,
    pub total_queries: usize,
}

impl From<ExperimentResult> for ExperimentRecord {
    fn from(r: ExperimentResult) -> Self {
        Self {
            num_workers: r.num_workers,
            batch_size: r.batch_size,
            use_processes: r.mode.uses_processes(),
            total_time: r.metrics.total_time,
            avg_time_per_query: r.metrics.avg_time_per_query,
            min_time: r.metrics.min_time,
            max_time: r.metrics.max_time,
            success_count: r.metrics.success_count,
            error_count: r.metrics.error_count,
            cpu_usage_percent: r.metrics.cpu_usage_percent,
            memory_usage_mb: r.metrics.memory_usage_mb,
            total_queries: r.metrics.total_queries,
        }
    }
}

impl From<ExperimentRecord> for ExperimentResult {
    fn from(r: ExperimentRecord) -> Self {
        Self {
            num_workers: r.num_workers,
            batch_size: r.batch_size,
            mode: if r.use_processes {
                ExecutionMode::MultiProcess
            } else {
                ExecutionMode::Threaded
            },
            metrics: ExecutionMetrics {
                total_time: r.total_time,
                avg_time_per_query: r.avg_time_per_query,
                min_time: r.min_time,
                max_time: r.max_time,
                success_count: r.success_count,
                error_count: r.error_count,
                cpu_usage_percent: r.cpu_usage_percent,
                memory_usage_mb: r.memory_usage_mb,
                worker_count: r.num_workers,
                batch_size: r.batch_size,
                total_queries: r.total_queries,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimalConfig {
    pub num_workers: usize,
    pub batch_size: usize,
    pub use_processes: bool,
    pub total_time: f64,
}

/// Outcome of a sweep. The default (empty) report serializes as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OptimizationReport {
    #[serde(rename = "optimal_config", skip_serializing_if = "Option::is_none")]
    optimal: Option<OptimalConfig>,
    #[serde(rename = "all_results", skip_serializing_if = "Vec::is_empty")]
    results: Vec<ExperimentResult>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    avg_time_by_workers: BTreeMap<usize, f64>,
    #[serde(rename = "best_result", skip_serializing_if = "Option::is_none")]
    best: Option<ExperimentResult>,
}

impl OptimizationReport {
    /// Picks the result with minimal total time (first in traversal order on ties)
    /// and averages total time per worker count.
    pub fn from_results(results: &[ExperimentResult]) -> Self {
        let Some(best) = results
            .iter()
            .min_by(|a, b| a.metrics.total_time.total_cmp(&b.metrics.total_time))
        else {
            return Self::default();
        };

        let mut grouped: BTreeMap<usize, (f64, usize)> = BTreeMap::new();
        for r in results {
            let entry = grouped.entry(r.num_workers).or_insert((0.0, 0));
            entry.0 += r.metrics.total_time;
            entry.1 += 1;
        }
        let avg_time_by_workers = grouped
            .into_iter()
            .map(|(workers, (sum, n))| (workers, sum / n as f64))
            .collect();

        Self {
            optimal: Some(OptimalConfig {
                num_workers: best.num_workers,
                batch_size: best.batch_size,
                use_processes: best.mode.uses_processes(),
                total_time: best.metrics.total_time,
            }),
            results: results.to_vec(),
            avg_time_by_workers,
            best: Some(best.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.best.is_none()
    }

    pub fn optimal_config(&self) -> Option<&OptimalConfig> {
        self.optimal.as_ref()
    }

    pub fn best(&self) -> Option<&ExperimentResult> {
        self.best.as_ref()
    }

    pub fn results(&self) -> &[ExperimentResult] {
        &self.results
    }

    pub fn avg_time_by_workers(&self) -> &BTreeMap<usize, f64> {
        &self.avg_time_by_workers
    }
}
