use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

/// Result of one query invocation. `error_message` is present iff `succeeded` is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub query_index: usize,
    pub succeeded: bool,
    pub elapsed_seconds: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// A `null` result is `Some(Null)`; only an absent field is `None`.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub result: Option<JsonValue>,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<JsonValue>, D::Error> {
    JsonValue::deserialize(deserializer).map(Some)
}

impl ExecutionOutcome {
    pub fn success(query_index: usize, elapsed: Duration, result: JsonValue) -> Self {
        Self {
            query_index,
            succeeded: true,
            elapsed_seconds: elapsed.as_secs_f64(),
            error_message: None,
            result: Some(result),
        }
    }

    pub fn failure(query_index: usize, elapsed: Duration, message: impl Into<String>) -> Self {
        Self {
            query_index,
            succeeded: false,
            elapsed_seconds: elapsed.as_secs_f64(),
            error_message: Some(message.into()),
            result: None,
        }
    }
}
