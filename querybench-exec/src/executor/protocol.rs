//! Newline-delimited JSON spoken between the parent and worker processes.
//!
//! The parent writes one [`WorkerRequest`] per line to the child's stdin and
//! reads back exactly one serialized `ExecutionOutcome` per line from its
//! stdout. Closing stdin tells the worker to shut down.

use querybench_core::ExecutionOutcome;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRequest {
    pub index: usize,
    pub operation: String,
}

pub fn encode<T: Serialize>(message: &T) -> Result<String, serde_json::Error> {
    let mut line = serde_json::to_string(message)?;
    line.push('\n');
    Ok(line)
}

pub fn decode_request(line: &str) -> Result<WorkerRequest, serde_json::Error> {
    serde_json::from_str(line.trim_end())
}

/// Rejects outcomes whose error message does not match their success flag.
pub fn decode_outcome(line: &str) -> Result<ExecutionOutcome, serde_json::Error> {
    let outcome: ExecutionOutcome = serde_json::from_str(line.trim_end())?;
    if outcome.succeeded == outcome.error_message.is_some() {
        return Err(serde::de::Error::custom(format!(
            "outcome {} has succeeded={} with error_message {}",
            outcome.query_index,
            outcome.succeeded,
            if outcome.error_message.is_some() { "present" } else { "absent" },
        )));
    }
    Ok(outcome)
}
