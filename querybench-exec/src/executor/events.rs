use async_trait::async_trait;
use querybench_core::ExecutionMode;
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub enum BenchEvent {
    ExperimentStarted {
        sweep_id: Uuid,
        mode: ExecutionMode,
        workers: usize,
        batch_size: usize,
    },
    BatchFinished {
        mode: ExecutionMode,
        workers: usize,
        batch_index: usize,
        batch_len: usize,
        succeeded: usize,
        failed: usize,
    },
    ExperimentFinished {
        sweep_id: Uuid,
        mode: ExecutionMode,
        workers: usize,
        batch_size: usize,
        total_time: f64,
        success_count: usize,
        error_count: usize,
    },
}

impl BenchEvent {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            BenchEvent::ExperimentStarted { sweep_id, mode, workers, batch_size } => {
                json!({ "type": "experiment.started", "sweep_id": sweep_id.to_string(), "mode": mode.as_str(), "workers": workers, "batch_size": batch_size })
            }
            BenchEvent::BatchFinished { mode, workers, batch_index, batch_len, succeeded, failed } => {
                json!({ "type": "batch.finished", "mode": mode.as_str(), "workers": workers, "batch_index": batch_index, "batch_len": batch_len, "succeeded": succeeded, "failed": failed })
            }
            BenchEvent::ExperimentFinished { sweep_id, mode, workers, batch_size, total_time, success_count, error_count } => {
                json!({ "type": "experiment.finished", "sweep_id": sweep_id.to_string(), "mode": mode.as_str(), "workers": workers, "batch_size": batch_size, "total_time": total_time, "success_count": success_count, "error_count": error_count })
            }
        }
    }
}

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: BenchEvent);
}

pub struct StdoutEventSink;

#[async_trait]
impl EventSink for StdoutEventSink {
    async fn emit(&self, event: BenchEvent) {
        let mut json = event.to_json();
        json["ts"] = json!(chrono::Utc::now().to_rfc3339());
        println!("{}", serde_json::to_string(&json).unwrap_or_default());
    }
}

pub struct LogEventSink;

#[async_trait]
impl EventSink for LogEventSink {
    async fn emit(&self, event: BenchEvent) {
        match &event {
            BenchEvent::ExperimentStarted { sweep_id, mode, workers, batch_size } => {
                tracing::info!(%sweep_id, %mode, workers, batch_size, "experiment started");
            }
            BenchEvent::BatchFinished { mode, workers, batch_index, batch_len, succeeded, failed } => {
                tracing::debug!(%mode, workers, batch_index, batch_len, succeeded, failed, "batch finished");
            }
            BenchEvent::ExperimentFinished { sweep_id, mode, workers, batch_size, total_time, success_count, error_count } => {
                tracing::info!(%sweep_id, %mode, workers, batch_size, total_time, success_count, error_count, "experiment finished");
            }
        }
    }
}

pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event: BenchEvent) {
    }
}
