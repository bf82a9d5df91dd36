use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Structured input of a benchmark sweep.
///
/// A `None` batch size means "no batching": all queries run in one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkRequest {
    pub num_queries: usize,
    pub worker_counts: Vec<usize>,
    pub batch_sizes: Vec<Option<usize>>,
    pub test_threaded: bool,
    pub test_multiprocess: bool,
}

impl Default for BenchmarkRequest {
    fn default() -> Self {
        Self {
            num_queries: 150,
            worker_counts: vec![1, 2, 4, 8, 16],
            batch_sizes: vec![None, Some(10), Some(25), Some(50), Some(100)],
            test_threaded: true,
            test_multiprocess: false,
        }
    }
}

impl BenchmarkRequest {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_queries == 0 {
            return Err(ConfigError::NoQueries);
        }
        validate_grid(
            &self.worker_counts,
            &self.batch_sizes,
            self.test_threaded,
            self.test_multiprocess,
        )
    }
}

pub fn validate_grid(
    worker_counts: &[usize],
    batch_sizes: &[Option<usize>],
    test_threaded: bool,
    test_multiprocess: bool,
) -> Result<(), ConfigError> {
    if worker_counts.is_empty() {
        return Err(ConfigError::NoWorkerCounts);
    }
    if batch_sizes.is_empty() {
        return Err(ConfigError::NoBatchSizes);
    }
    if !test_threaded && !test_multiprocess {
        return Err(ConfigError::NoModes);
    }
    if worker_counts.contains(&0) {
        return Err(ConfigError::ZeroWorkers);
    }
    if batch_sizes.contains(&Some(0)) {
        return Err(ConfigError::ZeroBatchSize);
    }
    Ok(())
}
