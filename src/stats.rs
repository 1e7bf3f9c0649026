use serde_json::json;
use std::cell::RefCell;
use std::time::{Duration, Instant};

/// Statistics collected during ingestion
#[derive(Debug, Clone, Default)]
pub struct ProcessingStats {
    pub files_total: usize,
    pub files_skipped: usize,
    pub chunks_submitted: usize,
    pub chunks_parsed: usize,
    pub lines_read: usize,
    pub lines_rejected: usize,
    pub records: usize,
    pub workers: usize,
    pub processing_time: Duration,
    pub start_time: Option<Instant>,
}

// Each worker counts into its own thread-local copy; the collector merges them
// after join
thread_local! {
    static THREAD_STATS: RefCell<ProcessingStats> = RefCell::new(ProcessingStats::new());
}

pub fn stats_add_line_read() {
    THREAD_STATS.with(|stats| {
        stats.borrow_mut().lines_read += 1;
    });
}

pub fn stats_add_line_rejected() {
    THREAD_STATS.with(|stats| {
        stats.borrow_mut().lines_rejected += 1;
    });
}

pub fn stats_add_chunk_parsed(records: usize) {
    THREAD_STATS.with(|stats| {
        let mut stats = stats.borrow_mut();
        stats.chunks_parsed += 1;
        stats.records += records;
    });
}

pub fn stats_start_timer() {
    THREAD_STATS.with(|stats| {
        stats.borrow_mut().start_time = Some(Instant::now());
    });
}

pub fn stats_finish_processing() {
    THREAD_STATS.with(|stats| {
        let mut stats = stats.borrow_mut();
        if let Some(start) = stats.start_time {
            stats.processing_time = start.elapsed();
        }
    });
}

pub fn get_thread_stats() -> ProcessingStats {
    THREAD_STATS.with(|stats| stats.borrow().clone())
}

/// Clear the calling thread's counters
pub fn reset_thread_stats() {
    THREAD_STATS.with(|stats| {
        *stats.borrow_mut() = ProcessingStats::new();
    });
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// Fold a worker's counters into this one. Timing is left alone; the
    /// collector measures wall time itself.
    pub fn merge(&mut self, worker: &ProcessingStats) {
        self.chunks_parsed += worker.chunks_parsed;
        self.lines_read += worker.lines_read;
        self.lines_rejected += worker.lines_rejected;
        self.records += worker.records;
    }

    pub fn format_stats(&self) -> String {
        let mut output = format!(
            "Lines processed: {} total, {} rejected; {} records",
            self.lines_read, self.lines_rejected, self.records
        );

        output.push_str(&format!(
            "; {} files ({} skipped), {} chunks",
            self.files_total, self.files_skipped, self.chunks_parsed
        ));

        let processing_time_ms = self.processing_time.as_millis();
        output.push_str(&format!(
            " on {} workers in {}ms",
            self.workers, processing_time_ms
        ));

        if processing_time_ms > 0 && self.lines_read > 0 {
            let lines_per_sec = (self.lines_read as f64 * 1000.0) / processing_time_ms as f64;
            output.push_str(&format!(" ({:.0} lines/s)", lines_per_sec));
        }

        output
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "files_total": self.files_total,
            "files_skipped": self.files_skipped,
            "chunks_submitted": self.chunks_submitted,
            "chunks_parsed": self.chunks_parsed,
            "lines_read": self.lines_read,
            "lines_rejected": self.lines_rejected,
            "records": self.records,
            "workers": self.workers,
            "processing_time_ms": self.processing_time.as_millis() as u64,
        })
    }
}
