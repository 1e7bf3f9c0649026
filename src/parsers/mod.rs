pub mod trading;

pub use trading::RecordParser;

use log::debug;

use crate::chunker::Chunk;
use crate::error::IngestError;
use crate::record::{HeaderSchema, Record};
use crate::stats::{stats_add_line_read, stats_add_line_rejected};

/// Parse single lines of a known layout into records.
///
/// Implementations hold no shared mutable state and may be called from any
/// number of threads at once.
pub trait LineParser: Send + Sync {
    fn parse_line(&self, line: &str, schema: HeaderSchema) -> Result<Record, IngestError>;

    /// Parse every non-empty line of a chunk, in order. Malformed lines are
    /// dropped and logged at debug level; they never fail the chunk.
    fn parse_chunk(&self, chunk: &Chunk) -> Vec<Record> {
        let mut records = Vec::new();

        for (offset, line) in chunk.text.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            stats_add_line_read();

            match self.parse_line(line, chunk.schema) {
                Ok(record) => records.push(record),
                Err(e) => {
                    stats_add_line_rejected();
                    debug!(
                        "{} (chunk {}, line {}): {}",
                        chunk.source.display(),
                        chunk.index,
                        offset + 1,
                        e
                    );
                }
            }
        }

        records
    }
}
