use std::sync::Arc;

use querybench_core::{BenchmarkRequest, Catalog, DataSource, ExecutionMode, OptimizationReport};
use querybench_exec::executor::EventSink;
use querybench_exec::synthetic::{synthetic_catalog, SyntheticSource};
use querybench_exec::{BenchError, ExecutorConfig, Optimizer};
use querybench_store::{insurance_catalog, PgSource};

use crate::cmd::config::{
    build_event_sink, build_executor_config, build_worker_command, pool_size, resolve_request,
};
use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::utils::redact_url_password;
use crate::{CatalogArgs, CatalogKind, EventsKind, GridArgs, OutputArgs, StoreArgs, TimeoutArgs};

pub async fn bench_cmd(
    grid: GridArgs,
    catalog: CatalogArgs,
    store: StoreArgs,
    timeout: TimeoutArgs,
    events: EventsKind,
    output: OutputArgs,
) -> i32 {
    let Some(request) = resolve_request(&grid, &output) else {
        return exit_codes::INVALID_CONFIG;
    };
    if let Err(e) = request.validate() {
        print_error(output.format, output.quiet, &format!("invalid configuration: {e}"));
        return exit_codes::INVALID_CONFIG;
    }
    let sink = build_event_sink(events);

    match catalog.catalog {
        CatalogKind::Synthetic => {
            let catalog = match synthetic_catalog() {
                Ok(c) => c,
                Err(e) => {
                    print_error(output.format, output.quiet, &format!("invalid catalog: {e}"));
                    return exit_codes::RUNTIME_ERROR;
                }
            };
            let Some(config) =
                executor_config(CatalogKind::Synthetic, &request, &store, &timeout, None, &output)
            else {
                return exit_codes::RUNTIME_ERROR;
            };
            let source = Arc::new(SyntheticSource::new());
            run_sweep(&catalog, source, &request, config, sink, &output).await
        }
        CatalogKind::Postgres => {
            let Some(database_url) = store.database_url() else {
                print_error(
                    output.format,
                    output.quiet,
                    "missing database url (use --store or set QUERYBENCH_DATABASE_URL / DATABASE_URL)",
                );
                return exit_codes::RUNTIME_ERROR;
            };
            let catalog = match insurance_catalog() {
                Ok(c) => c,
                Err(e) => {
                    print_error(output.format, output.quiet, &format!("invalid catalog: {e}"));
                    return exit_codes::RUNTIME_ERROR;
                }
            };
            let Some(config) = executor_config(
                CatalogKind::Postgres,
                &request,
                &store,
                &timeout,
                Some(&database_url),
                &output,
            ) else {
                return exit_codes::RUNTIME_ERROR;
            };
            let connections = pool_size(store.max_connections, &request.worker_counts);
            if connections > store.max_connections {
                tracing::info!(
                    requested = store.max_connections,
                    connections,
                    "raising pool size to the largest worker count"
                );
            }
            let source = match PgSource::connect(&database_url, connections).await {
                Ok(s) => Arc::new(s.keep_connections(store.keep_connections)),
                Err(e) => {
                    print_error(
                        output.format,
                        output.quiet,
                        &format!("failed to connect to postgres: {e}"),
                    );
                    return exit_codes::RUNTIME_ERROR;
                }
            };
            tracing::info!(
                store = %redact_url_password(&database_url),
                close_on_release = source.closes_on_release(),
                "benchmarking postgres"
            );
            let code = run_sweep(&catalog, source.clone(), &request, config, sink, &output).await;
            source.close().await;
            code
        }
    }
}

fn executor_config(
    kind: CatalogKind,
    request: &BenchmarkRequest,
    store: &StoreArgs,
    timeout: &TimeoutArgs,
    database_url: Option<&str>,
    output: &OutputArgs,
) -> Option<ExecutorConfig> {
    if !request.test_multiprocess {
        return Some(build_executor_config(timeout, None));
    }
    match build_worker_command(kind, store, timeout, database_url) {
        Ok(command) => Some(build_executor_config(timeout, Some(command))),
        Err(e) => {
            print_error(
                output.format,
                output.quiet,
                &format!("cannot locate worker executable: {e}"),
            );
            None
        }
    }
}

async fn run_sweep<S: DataSource>(
    catalog: &Catalog<S>,
    source: Arc<S>,
    request: &BenchmarkRequest,
    config: ExecutorConfig,
    sink: Arc<dyn EventSink>,
    output: &OutputArgs,
) -> i32 {
    let optimizer = match Optimizer::new(catalog, source, request.num_queries, config) {
        Ok(o) => o.with_event_sink(sink),
        Err(e) => return report_error(e, output),
    };
    match optimizer.run(request).await {
        Ok(report) => {
            if output.format == OutputFormat::Text && !output.quiet {
                print_report_text(&report);
            } else {
                print_result(output.format, output.quiet, &report);
            }
            exit_codes::SUCCESS
        }
        Err(e) => report_error(e, output),
    }
}

fn report_error(err: BenchError, output: &OutputArgs) -> i32 {
    match err {
        BenchError::Config(e) => {
            print_error(output.format, output.quiet, &format!("invalid configuration: {e}"));
            exit_codes::INVALID_CONFIG
        }
        other => {
            print_error(output.format, output.quiet, &other.to_string());
            exit_codes::RUNTIME_ERROR
        }
    }
}

fn print_report_text(report: &OptimizationReport) {
    let Some(optimal) = report.optimal_config() else {
        println!("No experiments were run.");
        return;
    };
    let mode = if optimal.use_processes {
        ExecutionMode::MultiProcess
    } else {
        ExecutionMode::Threaded
    };

    println!("Optimal configuration:");
    println!("  mode:       {mode}");
    println!("  workers:    {}", optimal.num_workers);
    println!("  batch size: {}", optimal.batch_size);
    println!("  total time: {:.3}s", optimal.total_time);
    println!();
    println!(
        "{:<13} {:>7} {:>6} {:>9} {:>9} {:>5} {:>5} {:>7} {:>8}",
        "mode", "workers", "batch", "total(s)", "avg(s)", "ok", "err", "cpu%", "mem(MB)"
    );
    for r in report.results() {
        println!(
            "{:<13} {:>7} {:>6} {:>9.3} {:>9.4} {:>5} {:>5} {:>7.1} {:>8.2}",
            r.mode.as_str(),
            r.num_workers,
            r.batch_size,
            r.metrics.total_time,
            r.metrics.avg_time_per_query,
            r.metrics.success_count,
            r.metrics.error_count,
            r.metrics.cpu_usage_percent,
            r.metrics.memory_usage_mb,
        );
    }
    println!();
    println!("Average total time by worker count:");
    for (workers, avg) in report.avg_time_by_workers() {
        println!("  {workers:>3}: {avg:.3}s");
    }
}
