//! Parallel ingestion module for tickmerge
//!
//! Chunks produced on the calling thread are fanned out to a fixed pool of
//! worker threads and merged into one sorted record set.
//!
//! # Module Structure
//!
//! - `types`: Pool configuration and the collection result
//! - `queue`: Task queue and drain counter
//! - `store`: Shared record store
//! - `worker`: Worker thread loop
//! - `collector`: Main Collector orchestration

mod collector;
mod queue;
mod store;
mod types;
mod worker;

// Re-export public types
pub use collector::Collector;
pub use queue::{DrainSignal, TaskQueue};
pub use store::ResultStore;
pub use types::{default_worker_count, Collection, ParallelConfig, MIN_DEFAULT_WORKERS};
