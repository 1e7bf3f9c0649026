//! Worker thread for parallel ingestion
//!
//! Contains the loop that pulls chunks from the task queue, parses them and
//! appends the records to the shared store.

use log::{error, trace};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::IngestError;
use crate::parsers::LineParser;
use crate::stats::{
    get_thread_stats, reset_thread_stats, stats_add_chunk_parsed, stats_finish_processing,
    stats_start_timer, ProcessingStats,
};

use super::queue::{DrainSignal, TaskQueue};
use super::store::ResultStore;

/// Shared handles given to every worker
#[derive(Clone)]
pub(crate) struct WorkerContext {
    pub queue: Arc<TaskQueue>,
    pub drain: Arc<DrainSignal>,
    pub store: Arc<ResultStore>,
    pub parser: Arc<dyn LineParser>,
}

/// Worker thread: parses chunks until the queue is stopped and empty.
///
/// A panic inside the parser costs only that chunk. The task is still marked
/// complete so the producer's drain wait cannot hang, and the worker reports
/// the failure once it exits.
pub(crate) fn worker_thread(
    worker_id: usize,
    ctx: WorkerContext,
) -> Result<ProcessingStats, IngestError> {
    reset_thread_stats();
    stats_start_timer();
    trace!("worker {} started", worker_id);

    let mut failed = false;

    while let Some(chunk) = ctx.queue.next_task() {
        let parsed = panic::catch_unwind(AssertUnwindSafe(|| ctx.parser.parse_chunk(&chunk)));

        match parsed {
            Ok(records) => {
                stats_add_chunk_parsed(records.len());
                ctx.store.append(records);
            }
            Err(_) => {
                error!(
                    "worker {} panicked while parsing chunk {} of {}",
                    worker_id,
                    chunk.index,
                    chunk.source.display()
                );
                failed = true;
            }
        }

        ctx.drain.complete();
    }

    stats_finish_processing();
    trace!("worker {} exiting", worker_id);

    if failed {
        return Err(IngestError::WorkerPanicked { worker_id });
    }
    Ok(get_thread_stats())
}
