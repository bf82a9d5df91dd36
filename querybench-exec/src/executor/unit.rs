use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

use futures_util::FutureExt;
use querybench_core::{DataSource, ExecutionOutcome, QueryError, QueryOperation};

/// Runs one operation and records its outcome. Never fails.
///
/// The handle acquired for the call is released before returning on every
/// path, including timeouts and panics; a release error is logged and dropped.
pub async fn execute_one<S: DataSource>(
    source: &S,
    op: &QueryOperation<S>,
    index: usize,
    timeout: Option<Duration>,
) -> ExecutionOutcome {
    let started = Instant::now();
    let mut handle = match source.acquire().await {
        Ok(h) => h,
        Err(e) => return ExecutionOutcome::failure(index, started.elapsed(), e.to_string()),
    };

    let call = AssertUnwindSafe(op.run(&mut handle)).catch_unwind();
    let caught = match timeout {
        Some(limit) => match tokio::time::timeout(limit, call).await {
            Ok(r) => r,
            Err(_) => Ok(Err(QueryError::TimedOut {
                millis: limit.as_millis() as u64,
            })),
        },
        None => call.await,
    };
    let elapsed = started.elapsed();

    if let Err(e) = source.release(handle).await {
        tracing::warn!(query = op.name(), index, error = %e, "release failed");
    }

    match caught {
        Ok(Ok(value)) => ExecutionOutcome::success(index, elapsed, value),
        Ok(Err(e)) => ExecutionOutcome::failure(index, elapsed, e.to_string()),
        Err(panic) => ExecutionOutcome::failure(
            index,
            elapsed,
            QueryError::Panicked(panic_message(panic.as_ref())).to_string(),
        ),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
