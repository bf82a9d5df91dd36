use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use querybench_core::{Catalog, ExecutionMode, Query, QueryError, QueryOperation};
use querybench_exec::synthetic::{synthetic_catalog, SyntheticHandle, SyntheticQuery, SyntheticSource};
use querybench_exec::{ExecError, ExecutorConfig, ParallelExecutor, PoolError, WorkerCommand};
use serde_json::{json, Value as JsonValue};

fn threaded(source: Arc<SyntheticSource>) -> ParallelExecutor<SyntheticSource> {
    ParallelExecutor::new(ExecutionMode::Threaded, source, ExecutorConfig::default())
}

fn ops(n: usize) -> Vec<QueryOperation<SyntheticSource>> {
    synthetic_catalog().unwrap().generate(n).unwrap()
}

#[tokio::test]
async fn twelve_queries_in_batches_of_five() {
    let source = Arc::new(SyntheticSource::new());
    let operations = ops(12);
    assert_eq!(operations[0].name(), operations[4].name());
    assert_eq!(operations[4].name(), operations[8].name());

    let run = threaded(source.clone())
        .execute_with_outcomes(&operations, 2, Some(5))
        .await
        .unwrap();

    assert_eq!(run.batch_lens, vec![5, 5, 2]);
    assert_eq!(run.metrics.success_count + run.metrics.error_count, 12);
    assert_eq!(run.metrics.total_queries, 12);
    assert_eq!(run.metrics.worker_count, 2);
    assert_eq!(run.metrics.batch_size, 5);
    assert_eq!(source.outstanding(), 0);
}

#[tokio::test]
async fn outcomes_are_ordered_by_sequence_index() {
    let mut catalog = Catalog::new();
    catalog.register("slow", SyntheticQuery::delayed(30, json!("slow"))).unwrap();
    catalog.register("fast", SyntheticQuery::value(json!("fast"))).unwrap();
    let operations = catalog.generate(6).unwrap();

    let run = threaded(Arc::new(SyntheticSource::new()))
        .execute_with_outcomes(&operations, 6, None)
        .await
        .unwrap();

    let indices: Vec<usize> = run.outcomes.iter().map(|o| o.query_index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(run.outcomes[0].result, Some(json!("slow")));
    assert_eq!(run.outcomes[1].result, Some(json!("fast")));
}

#[tokio::test]
async fn one_failing_query_does_not_stop_the_batch() {
    let mut catalog = Catalog::new();
    catalog.register("ok", SyntheticQuery::delayed(2, json!(1))).unwrap();
    catalog.register("broken", SyntheticQuery::Fail("boom".into())).unwrap();
    let mut operations = vec![catalog.resolve("ok").unwrap().clone(); 9];
    operations.insert(4, catalog.resolve("broken").unwrap().clone());

    let run = threaded(Arc::new(SyntheticSource::new()))
        .execute_with_outcomes(&operations, 3, None)
        .await
        .unwrap();

    assert_eq!(run.metrics.success_count, 9);
    assert_eq!(run.metrics.error_count, 1);
    assert!(!run.outcomes[4].succeeded);
    assert_eq!(run.outcomes[4].error_message.as_deref(), Some("boom"));
}

#[tokio::test]
async fn all_failures_report_zero_timings() {
    let mut catalog = Catalog::new();
    catalog.register("broken", SyntheticQuery::Fail("nope".into())).unwrap();
    let operations = catalog.generate(7).unwrap();

    let m = threaded(Arc::new(SyntheticSource::new()))
        .execute(&operations, 2, Some(3))
        .await
        .unwrap();

    assert_eq!(m.success_count, 0);
    assert_eq!(m.error_count, 7);
    assert_eq!(m.avg_time_per_query, 0.0);
    assert_eq!(m.min_time, 0.0);
    assert_eq!(m.max_time, 0.0);
}

#[tokio::test]
async fn unset_batch_matches_full_batch_counts() {
    let mut catalog = Catalog::new();
    catalog.register("ok", SyntheticQuery::value(json!(1))).unwrap();
    catalog.register("broken", SyntheticQuery::Fail("x".into())).unwrap();
    catalog.register("ok2", SyntheticQuery::delayed(1, json!(2))).unwrap();
    let operations = catalog.generate(10).unwrap();
    let executor = threaded(Arc::new(SyntheticSource::new()));

    let unset = executor.execute_with_outcomes(&operations, 4, None).await.unwrap();
    let full = executor.execute_with_outcomes(&operations, 4, Some(10)).await.unwrap();

    assert_eq!(unset.batch_lens, vec![10]);
    assert_eq!(full.batch_lens, vec![10]);
    assert_eq!(unset.metrics.success_count, full.metrics.success_count);
    assert_eq!(unset.metrics.error_count, full.metrics.error_count);
    assert_eq!(unset.metrics.batch_size, 10);
}

struct InFlight {
    current: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

#[async_trait]
impl Query<SyntheticSource> for InFlight {
    async fn run(&self, _handle: &mut SyntheticHandle) -> Result<JsonValue, QueryError> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10)).await;
        self.current.fetch_sub(1, Ordering::SeqCst);
        Ok(json!(null))
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn in_flight_queries_never_exceed_max_workers() {
    let peak = Arc::new(AtomicUsize::new(0));
    let mut catalog = Catalog::new();
    catalog
        .register(
            "tracked",
            InFlight {
                current: Arc::new(AtomicUsize::new(0)),
                peak: peak.clone(),
            },
        )
        .unwrap();
    let operations = catalog.generate(20).unwrap();

    let m = threaded(Arc::new(SyntheticSource::new()))
        .execute(&operations, 3, Some(8))
        .await
        .unwrap();

    assert_eq!(m.success_count, 20);
    let peak = peak.load(Ordering::SeqCst);
    assert!(peak <= 3, "peak concurrency {peak}");
    assert!(peak >= 1);
}

#[tokio::test]
async fn empty_sequence_is_a_legal_run() {
    let run = threaded(Arc::new(SyntheticSource::new()))
        .execute_with_outcomes(&[], 4, None)
        .await
        .unwrap();

    assert!(run.batch_lens.is_empty());
    assert_eq!(run.metrics.total_queries, 0);
    assert_eq!(run.metrics.success_count + run.metrics.error_count, 0);
}

#[tokio::test]
async fn zero_workers_or_zero_batch_is_rejected() {
    let executor = threaded(Arc::new(SyntheticSource::new()));
    let operations = ops(4);

    let err = executor.execute(&operations, 0, None).await.unwrap_err();
    assert!(matches!(err, ExecError::Pool(PoolError::ZeroWorkers)));

    let err = executor.execute(&operations, 2, Some(0)).await.unwrap_err();
    assert!(matches!(err, ExecError::ZeroBatchSize));
}

#[tokio::test]
async fn multiprocess_without_worker_command_fails_pool_start() {
    let executor = ParallelExecutor::new(
        ExecutionMode::MultiProcess,
        Arc::new(SyntheticSource::new()),
        ExecutorConfig::default(),
    );

    let err = executor.execute(&ops(4), 2, None).await.unwrap_err();
    assert!(matches!(err, ExecError::Pool(PoolError::NoWorkerCommand)));
}

#[tokio::test]
async fn multiprocess_spawn_failure_is_fatal() {
    let config = ExecutorConfig {
        worker_command: Some(WorkerCommand::new("/nonexistent/querybench-worker")),
        ..Default::default()
    };
    let executor =
        ParallelExecutor::new(ExecutionMode::MultiProcess, Arc::new(SyntheticSource::new()), config);

    let err = executor.execute(&ops(4), 2, None).await.unwrap_err();
    assert!(matches!(err, ExecError::Pool(PoolError::Spawn { slot: 0, .. })));
}

#[tokio::test]
async fn multiprocess_malformed_worker_response_is_fatal() {
    // `cat` echoes the request line back, which is not an outcome.
    let config = ExecutorConfig {
        worker_command: Some(WorkerCommand::new("cat")),
        ..Default::default()
    };
    let executor =
        ParallelExecutor::new(ExecutionMode::MultiProcess, Arc::new(SyntheticSource::new()), config);

    let err = executor.execute(&ops(3), 1, None).await.unwrap_err();
    assert!(matches!(err, ExecError::Pool(PoolError::Protocol { .. })));
}

#[tokio::test]
async fn multiprocess_inconsistent_outcome_is_fatal() {
    // Answers the first request with a success that still carries an error.
    let config = ExecutorConfig {
        worker_command: Some(WorkerCommand::new("sh").arg("-c").arg(
            r#"read line; echo '{"query_index":0,"succeeded":true,"elapsed_seconds":0.1,"error_message":"boom"}'"#,
        )),
        ..Default::default()
    };
    let executor =
        ParallelExecutor::new(ExecutionMode::MultiProcess, Arc::new(SyntheticSource::new()), config);

    let err = executor.execute(&ops(1), 1, None).await.unwrap_err();
    assert!(matches!(err, ExecError::Pool(PoolError::Protocol { slot: 0, .. })));
}
