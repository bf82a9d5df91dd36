use std::time::Duration;

use querybench_core::QueryOperation;
use querybench_exec::executor::execute_one;
use querybench_exec::synthetic::{SyntheticQuery, SyntheticSource};
use serde_json::json;

#[tokio::test]
async fn success_records_result_and_timing() {
    let source = SyntheticSource::new();
    let op = QueryOperation::new("count", SyntheticQuery::delayed(5, json!(42)));

    let outcome = execute_one(&source, &op, 3, None).await;

    assert!(outcome.succeeded);
    assert_eq!(outcome.query_index, 3);
    assert_eq!(outcome.result, Some(json!(42)));
    assert!(outcome.error_message.is_none());
    assert!(outcome.elapsed_seconds >= 0.005);
    assert_eq!(source.outstanding(), 0);
}

#[tokio::test]
async fn failure_is_captured_not_propagated() {
    let source = SyntheticSource::new();
    let op = QueryOperation::new("broken", SyntheticQuery::Fail("relation does not exist".into()));

    let outcome = execute_one(&source, &op, 0, None).await;

    assert!(!outcome.succeeded);
    assert_eq!(outcome.error_message.as_deref(), Some("relation does not exist"));
    assert!(outcome.result.is_none());
    assert!(outcome.elapsed_seconds >= 0.0);
    assert_eq!(source.acquired(), 1);
    assert_eq!(source.released(), 1);
}

#[tokio::test]
async fn acquire_failure_becomes_failed_outcome() {
    let source = SyntheticSource::new().failing_acquire();
    let op = QueryOperation::new("count", SyntheticQuery::value(json!(1)));

    let outcome = execute_one(&source, &op, 5, None).await;

    assert!(!outcome.succeeded);
    assert!(outcome
        .error_message
        .as_deref()
        .unwrap()
        .contains("failed to acquire connection"));
    assert_eq!(source.released(), 0);
}

#[tokio::test]
async fn release_failure_does_not_change_outcome() {
    let source = SyntheticSource::new().failing_release();
    let op = QueryOperation::new("count", SyntheticQuery::value(json!(1)));

    let outcome = execute_one(&source, &op, 0, None).await;

    assert!(outcome.succeeded);
    assert!(outcome.error_message.is_none());
    assert_eq!(source.released(), 1);
}

#[tokio::test]
async fn timeout_fails_the_call_and_still_releases() {
    let source = SyntheticSource::new();
    let op = QueryOperation::new("slow", SyntheticQuery::delayed(500, json!(null)));

    let outcome = execute_one(&source, &op, 1, Some(Duration::from_millis(20))).await;

    assert!(!outcome.succeeded);
    assert_eq!(outcome.error_message.as_deref(), Some("query timed out after 20ms"));
    assert!(outcome.elapsed_seconds < 0.5);
    assert_eq!(source.outstanding(), 0);
}

#[tokio::test]
async fn panic_is_caught_and_handle_released() {
    let source = SyntheticSource::new();
    let op = QueryOperation::new("explodes", SyntheticQuery::Panic("bad row".into()));

    let outcome = execute_one(&source, &op, 2, None).await;

    assert!(!outcome.succeeded);
    assert_eq!(outcome.error_message.as_deref(), Some("query panicked: bad row"));
    assert_eq!(source.outstanding(), 0);
}
