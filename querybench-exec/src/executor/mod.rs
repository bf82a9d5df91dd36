pub mod events;
mod parallel;
mod pool;
mod process_pool;
pub mod protocol;
pub mod resources;
mod thread_pool;
mod types;
pub mod unit;
pub mod worker;

pub use events::{BenchEvent, EventSink, LogEventSink, NoOpEventSink, StdoutEventSink};
pub use parallel::{ExecutionRun, ParallelExecutor};
pub use types::{ExecutorConfig, WorkerCommand};
pub use unit::execute_one;
pub use worker::serve_worker;
