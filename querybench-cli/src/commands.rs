use clap::Subcommand;

use crate::args::*;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sweep the configuration grid and report the fastest configuration.
    Bench {
        #[command(flatten)]
        grid: GridArgs,
        #[command(flatten)]
        catalog: CatalogArgs,
        #[command(flatten)]
        store: StoreArgs,
        #[command(flatten)]
        timeout: TimeoutArgs,
        #[arg(long, value_enum, default_value_t = EventsKind::Log)]
        events: EventsKind,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// List the operations of a catalog.
    Catalog {
        #[command(flatten)]
        catalog: CatalogArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Create the insurance schema.
    Migrate {
        #[command(flatten)]
        store: StoreArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Check database, schema, worker executable and resource sampling.
    Doctor {
        #[command(flatten)]
        store: StoreArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Serves execution requests on stdin/stdout for a multiprocess pool.
    #[command(hide = true)]
    Worker {
        #[command(flatten)]
        catalog: CatalogArgs,
        #[command(flatten)]
        store: StoreArgs,
        #[command(flatten)]
        timeout: TimeoutArgs,
    },
}
