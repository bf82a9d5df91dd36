use std::time::Duration;

use querybench_core::{Catalog, DataSource};
use querybench_exec::executor::serve_worker;
use querybench_exec::synthetic::{synthetic_catalog, SyntheticSource};
use querybench_exec::WorkerError;
use querybench_store::{insurance_catalog, PgSource};
use tokio::io::BufReader;

use crate::exit_codes;
use crate::{CatalogArgs, CatalogKind, StoreArgs, TimeoutArgs};

/// Entry point of a pool worker process. stdout belongs to the protocol, so
/// every diagnostic goes to stderr.
pub async fn worker_cmd(catalog: CatalogArgs, store: StoreArgs, timeout: TimeoutArgs) -> i32 {
    let timeout = timeout.duration();
    match catalog.catalog {
        CatalogKind::Synthetic => match synthetic_catalog() {
            Ok(catalog) => serve(&catalog, &SyntheticSource::new(), timeout).await,
            Err(e) => {
                eprintln!("error: invalid catalog: {e}");
                exit_codes::RUNTIME_ERROR
            }
        },
        CatalogKind::Postgres => {
            let catalog = match insurance_catalog() {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("error: invalid catalog: {e}");
                    return exit_codes::RUNTIME_ERROR;
                }
            };
            let Some(database_url) = store.database_url() else {
                eprintln!("error: worker started without QUERYBENCH_DATABASE_URL");
                return exit_codes::RUNTIME_ERROR;
            };
            let source = match PgSource::connect(&database_url, store.max_connections).await {
                Ok(s) => s.keep_connections(store.keep_connections),
                Err(e) => {
                    eprintln!("error: failed to connect to postgres: {e}");
                    return exit_codes::RUNTIME_ERROR;
                }
            };
            let code = serve(&catalog, &source, timeout).await;
            source.close().await;
            code
        }
    }
}

async fn serve<S: DataSource>(catalog: &Catalog<S>, source: &S, timeout: Option<Duration>) -> i32 {
    let reader = BufReader::new(tokio::io::stdin());
    let writer = tokio::io::stdout();
    let result: Result<usize, WorkerError> =
        serve_worker(catalog, source, timeout, reader, writer).await;
    match result {
        Ok(served) => {
            tracing::debug!(served, pid = std::process::id(), "worker finished");
            exit_codes::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "worker failed");
            eprintln!("error: {e}");
            exit_codes::RUNTIME_ERROR
        }
    }
}
