use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::{Args, ValueEnum};

use crate::output::OutputFormat;

#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Args, Clone)]
pub struct StoreArgs {
    #[arg(long)]
    pub store: Option<String>,
    /// Pool size. `bench` raises it to the largest worker count.
    #[arg(long, default_value_t = 10)]
    pub max_connections: u32,
    /// Return connections to the pool instead of closing them after each query.
    #[arg(long)]
    pub keep_connections: bool,
}

impl StoreArgs {
    pub fn database_url(&self) -> Option<String> {
        self.store
            .clone()
            .or_else(|| std::env::var("QUERYBENCH_DATABASE_URL").ok())
            .or_else(|| std::env::var("DATABASE_URL").ok())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CatalogKind {
    /// Insurance read queries against postgres.
    Postgres,
    /// In-memory queries with fixed delays; needs no database.
    Synthetic,
}

impl CatalogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogKind::Postgres => "postgres",
            CatalogKind::Synthetic => "synthetic",
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct CatalogArgs {
    #[arg(long, value_enum, default_value_t = CatalogKind::Postgres)]
    pub catalog: CatalogKind,
}

#[derive(Debug, Args, Clone)]
pub struct TimeoutArgs {
    #[arg(long)]
    pub query_timeout_ms: Option<u64>,
}

impl TimeoutArgs {
    pub fn duration(&self) -> Option<Duration> {
        self.query_timeout_ms.map(Duration::from_millis)
    }
}

/// A batch size on the command line; `none` means one batch of all queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSize(pub Option<usize>);

impl FromStr for BatchSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "none" | "all" => Ok(BatchSize(None)),
            n => n
                .parse()
                .map(|n| BatchSize(Some(n)))
                .map_err(|_| format!("invalid batch size '{n}' (expected a number or 'none')")),
        }
    }
}

impl fmt::Display for BatchSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(n) => write!(f, "{n}"),
            None => f.write_str("none"),
        }
    }
}

/// Sweep grid. Flags override the request file, which overrides the defaults.
#[derive(Debug, Args, Clone)]
pub struct GridArgs {
    /// JSON or YAML file with a benchmark request.
    #[arg(long)]
    pub request: Option<PathBuf>,
    #[arg(long)]
    pub queries: Option<usize>,
    #[arg(long, value_delimiter = ',')]
    pub workers: Vec<usize>,
    #[arg(long, value_delimiter = ',')]
    pub batch_sizes: Vec<BatchSize>,
    #[arg(long)]
    pub no_threaded: bool,
    #[arg(long)]
    pub multiprocess: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EventsKind {
    None,
    Stdout,
    Log,
}
