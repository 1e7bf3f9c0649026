//! Type definitions for parallel ingestion
//!
//! Contains the pool configuration and the result handed back by the
//! collector.

use crate::chunker::DEFAULT_CHUNK_SIZE;
use crate::record::Record;
use crate::stats::ProcessingStats;

/// Lower bound for the auto-detected worker count
pub const MIN_DEFAULT_WORKERS: usize = 2;

/// Worker count used when none is configured
pub fn default_worker_count() -> usize {
    num_cpus::get().max(MIN_DEFAULT_WORKERS)
}

/// Configuration for parallel ingestion
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    pub num_workers: usize,
    pub chunk_size: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            num_workers: default_worker_count(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ParallelConfig {
    /// `threads == 0` selects the detected hardware parallelism
    pub fn new(threads: usize, chunk_size: usize) -> Self {
        Self {
            num_workers: if threads == 0 {
                default_worker_count()
            } else {
                threads
            },
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn with_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers.max(1);
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn worker_count(&self) -> usize {
        self.num_workers.max(1)
    }
}

/// Sorted records plus the statistics of the run that produced them
#[derive(Debug)]
pub struct Collection {
    pub records: Vec<Record>,
    pub stats: ProcessingStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_worker_count_has_floor() {
        assert!(default_worker_count() >= MIN_DEFAULT_WORKERS);
        assert!(ParallelConfig::new(0, 4096).worker_count() >= MIN_DEFAULT_WORKERS);
    }

    #[test]
    fn test_explicit_single_worker_is_kept() {
        let config = ParallelConfig::new(1, 0);
        assert_eq!(config.worker_count(), 1);
        assert_eq!(config.chunk_size, 1);

        let config = ParallelConfig::default().with_workers(8).with_chunk_size(64);
        assert_eq!(config.worker_count(), 8);
        assert_eq!(config.chunk_size, 64);
    }
}
