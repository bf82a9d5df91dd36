use querybench_core::ExecutionMode;
use querybench_exec::executor::BenchEvent;
use uuid::Uuid;

#[test]
fn experiment_events_carry_the_grid_cell() {
    let sweep_id = Uuid::new_v4();
    let started = BenchEvent::ExperimentStarted {
        sweep_id,
        mode: ExecutionMode::MultiProcess,
        workers: 4,
        batch_size: 25,
    }
    .to_json();
    assert_eq!(started["type"], "experiment.started");
    assert_eq!(started["sweep_id"], sweep_id.to_string());
    assert_eq!(started["mode"], "multiprocess");
    assert_eq!(started["workers"], 4);
    assert_eq!(started["batch_size"], 25);

    let finished = BenchEvent::ExperimentFinished {
        sweep_id,
        mode: ExecutionMode::Threaded,
        workers: 2,
        batch_size: 10,
        total_time: 1.5,
        success_count: 9,
        error_count: 1,
    }
    .to_json();
    assert_eq!(finished["type"], "experiment.finished");
    assert_eq!(finished["mode"], "threaded");
    assert_eq!(finished["total_time"], 1.5);
    assert_eq!(finished["error_count"], 1);
}

#[test]
fn batch_event_counts_outcomes() {
    let event = BenchEvent::BatchFinished {
        mode: ExecutionMode::Threaded,
        workers: 2,
        batch_index: 2,
        batch_len: 2,
        succeeded: 1,
        failed: 1,
    }
    .to_json();
    assert_eq!(event["type"], "batch.finished");
    assert_eq!(event["batch_index"], 2);
    assert_eq!(event["succeeded"], 1);
    assert_eq!(event["failed"], 1);
}
