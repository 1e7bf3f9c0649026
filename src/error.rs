//! Error taxonomy for ingestion.
//!
//! Line- and file-level variants are contained by the caller (logged and
//! skipped); `Config`, `EmptyResult` and `WorkerPanicked` are terminal.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    /// Bad or missing configuration; the run stops before ingestion
    #[error("configuration error: {0}")]
    Config(String),

    #[error("cannot read '{}': {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid header in '{}': '{header}'", path.display())]
    HeaderMismatch { path: PathBuf, header: String },

    #[error("parse error: {reason}")]
    LineParse { reason: String },

    #[error("no records parsed from input files")]
    EmptyResult,

    #[error("worker thread {worker_id} panicked")]
    WorkerPanicked { worker_id: usize },
}

impl IngestError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        IngestError::Config(message.into())
    }

    pub(crate) fn line(reason: impl Into<String>) -> Self {
        IngestError::LineParse {
            reason: reason.into(),
        }
    }

    /// Errors that cost a single file, never the whole run
    pub fn is_file_level(&self) -> bool {
        matches!(
            self,
            IngestError::FileAccess { .. } | IngestError::HeaderMismatch { .. }
        )
    }
}
