use std::time::Duration;

use querybench_core::{Catalog, DataSource, ExecutionOutcome};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::WorkerError;
use crate::executor::protocol::{decode_request, encode};
use crate::executor::unit::execute_one;

/// Worker-process side of the pool. Answers requests until the input closes and
/// returns the number of requests served.
///
/// Operations are re-resolved by name through `catalog`; an unknown name is
/// answered with a failed outcome rather than ending the loop.
pub async fn serve_worker<S, R, W>(
    catalog: &Catalog<S>,
    source: &S,
    timeout: Option<Duration>,
    reader: R,
    mut writer: W,
) -> Result<usize, WorkerError>
where
    S: DataSource,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut served = 0;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let request = decode_request(&line)?;
        let outcome = match catalog.resolve(&request.operation) {
            Some(op) => execute_one(source, op, request.index, timeout).await,
            None => ExecutionOutcome::failure(
                request.index,
                Duration::ZERO,
                format!("unknown operation: {}", request.operation),
            ),
        };
        writer.write_all(encode(&outcome)?.as_bytes()).await?;
        writer.flush().await?;
        served += 1;
    }

    tracing::debug!(served, "worker input closed");
    Ok(served)
}
