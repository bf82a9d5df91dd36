use querybench_exec::executor::protocol::{decode_outcome, encode, WorkerRequest};
use querybench_exec::executor::serve_worker;
use querybench_exec::synthetic::{synthetic_catalog, SyntheticSource};
use querybench_exec::WorkerError;
use serde_json::json;
use tokio::io::BufReader;

fn request(index: usize, operation: &str) -> String {
    encode(&WorkerRequest {
        index,
        operation: operation.to_string(),
    })
    .unwrap()
}

#[tokio::test]
async fn answers_each_request_in_order() {
    let catalog = synthetic_catalog().unwrap();
    let source = SyntheticSource::new();
    let input = format!("{}\n{}{}", request(7, "count_rows"), request(8, "nope"), request(9, "row_by_id"));
    let mut output = Vec::new();

    let served = serve_worker(&catalog, &source, None, BufReader::new(input.as_bytes()), &mut output)
        .await
        .unwrap();

    assert_eq!(served, 3);
    let lines: Vec<&str> = std::str::from_utf8(&output).unwrap().lines().collect();
    assert_eq!(lines.len(), 3);

    let first = decode_outcome(lines[0]).unwrap();
    assert_eq!(first.query_index, 7);
    assert!(first.succeeded);
    assert_eq!(first.result, Some(json!(3)));

    let unknown = decode_outcome(lines[1]).unwrap();
    assert_eq!(unknown.query_index, 8);
    assert!(!unknown.succeeded);
    assert_eq!(unknown.error_message.as_deref(), Some("unknown operation: nope"));

    assert_eq!(decode_outcome(lines[2]).unwrap().query_index, 9);
    assert_eq!(source.outstanding(), 0);
}

#[tokio::test]
async fn malformed_request_ends_the_worker() {
    let catalog = synthetic_catalog().unwrap();
    let source = SyntheticSource::new();
    let mut output = Vec::new();

    let err = serve_worker(&catalog, &source, None, BufReader::new(&b"not json\n"[..]), &mut output)
        .await
        .unwrap_err();

    assert!(matches!(err, WorkerError::Request(_)));
    assert!(output.is_empty());
}

#[tokio::test]
async fn closed_input_serves_nothing() {
    let catalog = synthetic_catalog().unwrap();
    let source = SyntheticSource::new();
    let mut output = Vec::new();

    let served = serve_worker(&catalog, &source, None, BufReader::new(&b""[..]), &mut output)
        .await
        .unwrap();
    assert_eq!(served, 0);
}

#[test]
fn decoding_rejects_outcomes_breaking_the_error_invariant() {
    let success_with_error =
        r#"{"query_index":1,"succeeded":true,"elapsed_seconds":0.1,"error_message":"x"}"#;
    let failure_without_error = r#"{"query_index":2,"succeeded":false,"elapsed_seconds":0.1}"#;
    assert!(decode_outcome(success_with_error).is_err());
    assert!(decode_outcome(failure_without_error).is_err());

    let ok = decode_outcome(r#"{"query_index":3,"succeeded":true,"elapsed_seconds":0.1,"result":null}"#)
        .unwrap();
    assert_eq!(ok.result, Some(serde_json::Value::Null));
}
