//! Main collector
//!
//! Contains the Collector struct that orchestrates splitting, the worker pool,
//! drain detection and the final sort.

use log::{debug, error, info, warn};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crate::chunker::{ChunkSource, ChunkSplitter};
use crate::error::IngestError;
use crate::parsers::{LineParser, RecordParser};
use crate::record::Record;
use crate::stats::ProcessingStats;

use super::queue::{DrainSignal, TaskQueue};
use super::store::ResultStore;
use super::types::{Collection, ParallelConfig};
use super::worker::{worker_thread, WorkerContext};

/// Turns a list of input files into one record sequence sorted by
/// `receive_ts`
pub struct Collector {
    config: ParallelConfig,
    source: Arc<dyn ChunkSource>,
    parser: Arc<dyn LineParser>,
}

impl Collector {
    pub fn new(config: ParallelConfig) -> Self {
        let source = Arc::new(ChunkSplitter::new(config.chunk_size));
        Self {
            config,
            source,
            parser: Arc::new(RecordParser::new()),
        }
    }

    pub fn with_source(mut self, source: Arc<dyn ChunkSource>) -> Self {
        self.source = source;
        self
    }

    pub fn with_parser(mut self, parser: Arc<dyn LineParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn config(&self) -> &ParallelConfig {
        &self.config
    }

    pub fn collect<P: AsRef<Path>>(&self, files: &[P]) -> Result<Vec<Record>, IngestError> {
        self.collect_with_stats(files)
            .map(|collection| collection.records)
    }

    /// Ingest `files` and return the sorted records with run statistics.
    ///
    /// Unreadable files and files with an unknown header are skipped. Fails
    /// with [`IngestError::EmptyResult`] when nothing at all was parsed.
    pub fn collect_with_stats<P: AsRef<Path>>(
        &self,
        files: &[P],
    ) -> Result<Collection, IngestError> {
        let started = Instant::now();
        let queue = Arc::new(TaskQueue::new());
        let drain = Arc::new(DrainSignal::new());
        let store = Arc::new(ResultStore::new());

        let num_workers = self.config.worker_count();
        let mut worker_handles = Vec::with_capacity(num_workers);
        for worker_id in 0..num_workers {
            let ctx = WorkerContext {
                queue: Arc::clone(&queue),
                drain: Arc::clone(&drain),
                store: Arc::clone(&store),
                parser: Arc::clone(&self.parser),
            };
            worker_handles.push(thread::spawn(move || worker_thread(worker_id, ctx)));
        }

        let mut stats = ProcessingStats::new();
        stats.workers = num_workers;
        stats.files_total = files.len();

        info!("Input files:");
        for path in files {
            self.enqueue_file(path.as_ref(), &queue, &drain, &mut stats);
        }

        // Stopping before the drain completes would strand queued chunks
        drain.wait_drained();
        queue.request_stop();

        let mut failure = None;
        for (worker_id, handle) in worker_handles.into_iter().enumerate() {
            match handle.join() {
                Ok(Ok(worker_stats)) => stats.merge(&worker_stats),
                Ok(Err(e)) => {
                    failure.get_or_insert(e);
                }
                Err(_) => {
                    error!("worker {} panicked", worker_id);
                    failure.get_or_insert(IngestError::WorkerPanicked { worker_id });
                }
            }
        }
        if let Some(e) = failure {
            return Err(e);
        }

        if store.is_empty() {
            error!("no records parsed from input files");
            return Err(IngestError::EmptyResult);
        }

        let records = store.take_sorted();
        stats.processing_time = started.elapsed();
        info!(
            "Parsing finished: parsed {} lines in {}ms",
            records.len(),
            stats.processing_time.as_millis()
        );

        Ok(Collection { records, stats })
    }

    /// Split one file and push its chunks. File-level failures are logged and
    /// counted, never returned.
    fn enqueue_file(
        &self,
        path: &Path,
        queue: &TaskQueue,
        drain: &DrainSignal,
        stats: &mut ProcessingStats,
    ) {
        match fs::metadata(path) {
            Ok(meta) => info!("  {} ({} bytes)", path.display(), meta.len()),
            Err(_) => info!("  {}", path.display()),
        }

        let chunks = match self.source.split(path) {
            Ok(chunks) => chunks,
            Err(e) => {
                if e.is_file_level() {
                    warn!("{}; file skipped", e);
                } else {
                    error!("{}; file skipped", e);
                }
                stats.files_skipped += 1;
                return;
            }
        };

        let mut submitted = 0usize;
        for chunk in chunks {
            match chunk {
                Ok(chunk) => {
                    drain.add();
                    queue.push(chunk);
                    submitted += 1;
                }
                Err(e) => {
                    warn!(
                        "error while reading {}: {}; rest of the file skipped",
                        path.display(),
                        e
                    );
                }
            }
        }

        debug!("{}: {} chunks submitted", path.display(), submitted);
        stats.chunks_submitted += submitted;
    }
}
