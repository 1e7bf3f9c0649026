// Core library for tickmerge: parallel ingestion of market-data CSV logs

pub mod chunker;
pub mod cli;
pub mod config;
pub mod config_file;
pub mod error;
pub mod logging;
pub mod parallel;
pub mod parsers;
pub mod platform;
pub mod record;
pub mod report;
pub mod stats;

pub use chunker::{Chunk, ChunkSource, ChunkSplitter, DEFAULT_CHUNK_SIZE};
pub use config::AppConfig;
pub use error::IngestError;
pub use parallel::{Collection, Collector, ParallelConfig};
pub use parsers::{LineParser, RecordParser};
pub use record::{HeaderSchema, Record, Side};
pub use report::ReportKind;
pub use stats::ProcessingStats;
