use clap::Parser;

mod args;
mod cmd;
mod commands;
mod exit_codes;
mod output;
mod utils;

pub use args::*;
use commands::Command;

#[derive(Debug, Parser)]
#[command(name = "querybench", version, about = "Parallel database query benchmark")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to create tokio runtime: {e}");
            std::process::exit(exit_codes::RUNTIME_ERROR);
        }
    };

    let exit_code = rt.block_on(run_command(cli.command));
    std::process::exit(exit_code);
}

// Logs go to stderr; stdout carries reports and, for workers, the line protocol.
fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_command(command: Command) -> i32 {
    match command {
        Command::Bench {
            grid,
            catalog,
            store,
            timeout,
            events,
            output,
        } => cmd::bench::bench_cmd(grid, catalog, store, timeout, events, output).await,
        Command::Catalog { catalog, output } => cmd::catalog::catalog_cmd(catalog, output).await,
        Command::Migrate { store, output } => cmd::migrate::migrate_cmd(store, output).await,
        Command::Doctor { store, output } => cmd::doctor::doctor_cmd(store, output).await,
        Command::Worker {
            catalog,
            store,
            timeout,
        } => cmd::worker::worker_cmd(catalog, store, timeout).await,
    }
}
