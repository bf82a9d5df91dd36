use std::sync::Arc;

use querybench_core::ExecutionOutcome;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Child;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::error::PoolError;
use crate::executor::protocol::{decode_outcome, encode, WorkerRequest};
use crate::executor::types::WorkerCommand;

type RequestQueue = Arc<Mutex<mpsc::UnboundedReceiver<WorkerRequest>>>;

/// Isolated pool: one child process per worker slot, each answering one
/// request at a time from a shared queue. Only the operation name and index
/// cross the process boundary.
pub(crate) struct ProcessPool {
    queue: mpsc::UnboundedSender<WorkerRequest>,
    drivers: Vec<JoinHandle<Result<Vec<ExecutionOutcome>, PoolError>>>,
}

impl ProcessPool {
    pub(crate) fn start(command: &WorkerCommand, workers: usize) -> Result<Self, PoolError> {
        if workers == 0 {
            return Err(PoolError::ZeroWorkers);
        }
        let (tx, rx) = mpsc::unbounded_channel();
        let rx: RequestQueue = Arc::new(Mutex::new(rx));

        let mut drivers = Vec::with_capacity(workers);
        for slot in 0..workers {
            // Children already started see the queue close and exit cleanly
            // if a later spawn fails.
            let child = command.to_command().spawn().map_err(|e| PoolError::Spawn {
                slot,
                message: e.to_string(),
            })?;
            tracing::debug!(slot, pid = child.id(), "worker process spawned");
            drivers.push(tokio::spawn(drive(slot, child, rx.clone())));
        }

        Ok(Self { queue: tx, drivers })
    }

    pub(crate) fn submit(&mut self, index: usize, operation: &str) -> Result<(), PoolError> {
        self.queue
            .send(WorkerRequest {
                index,
                operation: operation.to_string(),
            })
            .map_err(|_| PoolError::Closed)
    }

    pub(crate) async fn shutdown(self) -> Result<Vec<ExecutionOutcome>, PoolError> {
        drop(self.queue);
        let mut outcomes = Vec::new();
        let mut first_err = None;
        for driver in self.drivers {
            match driver.await {
                Ok(Ok(mut o)) => outcomes.append(&mut o),
                Ok(Err(e)) => {
                    first_err.get_or_insert(e);
                }
                Err(e) => {
                    first_err.get_or_insert(PoolError::Join(e.to_string()));
                }
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(outcomes),
        }
    }
}

async fn drive(
    slot: usize,
    mut child: Child,
    queue: RequestQueue,
) -> Result<Vec<ExecutionOutcome>, PoolError> {
    let io_err = move |e: std::io::Error| PoolError::Io {
        slot,
        message: e.to_string(),
    };
    let mut stdin = child.stdin.take().ok_or(PoolError::Io {
        slot,
        message: "stdin not captured".to_string(),
    })?;
    let stdout = child.stdout.take().ok_or(PoolError::Io {
        slot,
        message: "stdout not captured".to_string(),
    })?;
    let mut lines = BufReader::new(stdout).lines();
    let mut outcomes = Vec::new();

    loop {
        let next = queue.lock().await.recv().await;
        let Some(request) = next else { break };

        let line = encode(&request).map_err(|e| PoolError::Protocol {
            slot,
            message: e.to_string(),
        })?;
        stdin.write_all(line.as_bytes()).await.map_err(io_err)?;
        stdin.flush().await.map_err(io_err)?;

        let response = lines
            .next_line()
            .await
            .map_err(io_err)?
            .ok_or(PoolError::WorkerDied {
                slot,
                index: request.index,
            })?;
        let outcome = decode_outcome(&response).map_err(|e| PoolError::Protocol {
            slot,
            message: e.to_string(),
        })?;
        if outcome.query_index != request.index {
            return Err(PoolError::Protocol {
                slot,
                message: format!(
                    "answered query {} while {} was pending",
                    outcome.query_index, request.index
                ),
            });
        }
        outcomes.push(outcome);
    }

    drop(stdin);
    let status = child.wait().await.map_err(io_err)?;
    if !status.success() {
        return Err(PoolError::WorkerExit {
            slot,
            status: status.to_string(),
        });
    }
    Ok(outcomes)
}
