use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::outcome::ExecutionOutcome;

/// CPU and memory usage over one executor run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceUsage {
    pub cpu_usage_percent: f64,
    pub memory_usage_mb: f64,
}

/// Aggregate over one `ParallelExecutor` run.
///
/// Per-call statistics only cover succeeded calls and are all zero when none
/// succeeded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionMetrics {
    pub total_time: f64,
    pub avg_time_per_query: f64,
    pub min_time: f64,
    pub max_time: f64,
    pub success_count: usize,
    pub error_count: usize,
    pub cpu_usage_percent: f64,
    pub memory_usage_mb: f64,
    pub worker_count: usize,
    pub batch_size: usize,
    pub total_queries: usize,
}

impl ExecutionMetrics {
    pub fn from_outcomes(
        outcomes: &[ExecutionOutcome],
        total_time: Duration,
        usage: ResourceUsage,
        worker_count: usize,
        batch_size: usize,
    ) -> Self {
        let times: Vec<f64> = outcomes
            .iter()
            .filter(|o| o.succeeded)
            .map(|o| o.elapsed_seconds)
            .collect();
        let success_count = times.len();

        let (avg, min, max) = if times.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            let sum: f64 = times.iter().sum();
            let min = times.iter().copied().fold(f64::INFINITY, f64::min);
            let max = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            (sum / success_count as f64, min, max)
        };

        Self {
            total_time: total_time.as_secs_f64(),
            avg_time_per_query: avg,
            min_time: min,
            max_time: max,
            success_count,
            error_count: outcomes.len() - success_count,
            cpu_usage_percent: usage.cpu_usage_percent,
            memory_usage_mb: usage.memory_usage_mb,
            worker_count,
            batch_size,
            total_queries: outcomes.len(),
        }
    }
}
