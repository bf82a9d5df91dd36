use std::path::Path;
use std::sync::Arc;

use querybench_core::BenchmarkRequest;
use querybench_exec::executor::{EventSink, LogEventSink, NoOpEventSink, StdoutEventSink};
use querybench_exec::{ExecutorConfig, WorkerCommand};

use crate::output::print_error;
use crate::{CatalogKind, EventsKind, GridArgs, OutputArgs, StoreArgs, TimeoutArgs};

pub fn load_request(path: &Path, output: &OutputArgs) -> Option<BenchmarkRequest> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            print_error(output.format, output.quiet, &format!("failed to read request: {e}"));
            return None;
        }
    };
    if let Ok(v) = serde_json::from_str(&content) {
        return Some(v);
    }
    match serde_yaml::from_str(&content) {
        Ok(v) => Some(v),
        Err(e) => {
            print_error(
                output.format,
                output.quiet,
                &format!("request file is neither valid JSON nor YAML: {e}"),
            );
            None
        }
    }
}

/// Request file (or defaults) with command-line flags applied on top.
pub fn resolve_request(grid: &GridArgs, output: &OutputArgs) -> Option<BenchmarkRequest> {
    let mut request = match &grid.request {
        Some(path) => load_request(path, output)?,
        None => BenchmarkRequest::default(),
    };
    if let Some(n) = grid.queries {
        request.num_queries = n;
    }
    if !grid.workers.is_empty() {
        request.worker_counts = grid.workers.clone();
    }
    if !grid.batch_sizes.is_empty() {
        request.batch_sizes = grid.batch_sizes.iter().map(|b| b.0).collect();
    }
    if grid.no_threaded {
        request.test_threaded = false;
    }
    if grid.multiprocess {
        request.test_multiprocess = true;
    }
    Some(request)
}

/// Workers re-execute this binary's hidden `worker` subcommand. The database
/// url travels in the environment, never on the command line.
pub fn build_worker_command(
    kind: CatalogKind,
    store: &StoreArgs,
    timeout: &TimeoutArgs,
    database_url: Option<&str>,
) -> std::io::Result<WorkerCommand> {
    let mut command = WorkerCommand::new(std::env::current_exe()?)
        .arg("worker")
        .arg("--catalog")
        .arg(kind.as_str())
        .arg("--max-connections")
        .arg("1");
    if store.keep_connections {
        command = command.arg("--keep-connections");
    }
    if let Some(ms) = timeout.query_timeout_ms {
        command = command.arg("--query-timeout-ms").arg(ms.to_string());
    }
    if let Some(url) = database_url {
        command = command.env("QUERYBENCH_DATABASE_URL", url);
    }
    Ok(command)
}

pub fn build_executor_config(
    timeout: &TimeoutArgs,
    worker_command: Option<WorkerCommand>,
) -> ExecutorConfig {
    ExecutorConfig {
        query_timeout: timeout.duration(),
        worker_command,
    }
}

/// Connections for the benchmarking process: at least one per threaded worker,
/// so no query waits on the pool inside its timed window.
pub fn pool_size(max_connections: u32, worker_counts: &[usize]) -> u32 {
    let widest = worker_counts.iter().copied().max().unwrap_or(0);
    max_connections.max(u32::try_from(widest).unwrap_or(u32::MAX))
}

pub fn build_event_sink(events: EventsKind) -> Arc<dyn EventSink> {
    match events {
        EventsKind::None => Arc::new(NoOpEventSink),
        EventsKind::Stdout => Arc::new(StdoutEventSink),
        EventsKind::Log => Arc::new(LogEventSink),
    }
}
