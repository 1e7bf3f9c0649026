//! Splitting input files into line-aligned chunks.
//!
//! A file is validated by its header line, then its body is cut into
//! fixed-size slices that are extended to the next line terminator. Chunks are
//! produced lazily so the producer can enqueue them while workers consume.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::IngestError;
use crate::record::HeaderSchema;

/// Default slice size in bytes before line alignment
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Upper bound for buffer preallocation; larger chunks grow on demand
const MAX_CAPACITY_HINT: usize = 1 << 20;

/// A contiguous, line-aligned slice of one input file
#[derive(Debug, Clone)]
pub struct Chunk {
    pub source: Arc<PathBuf>,
    /// Position of this chunk within its file, starting at 0
    pub index: usize,
    pub schema: HeaderSchema,
    pub text: String,
}

/// Lazy sequence of chunks for one file
pub type ChunkIter = Box<dyn Iterator<Item = io::Result<Chunk>>>;

/// Something that can turn a file path into a sequence of chunks
pub trait ChunkSource: Send + Sync {
    fn split(&self, path: &Path) -> Result<ChunkIter, IngestError>;
}

/// Reads a file header and slices the body into chunks of roughly `chunk_size`
/// bytes
#[derive(Debug, Clone)]
pub struct ChunkSplitter {
    chunk_size: usize,
}

impl Default for ChunkSplitter {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

impl ChunkSplitter {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Open `path`, validate its header and return the chunk sequence
    pub fn split_file(&self, path: &Path) -> Result<FileChunks<BufReader<File>>, IngestError> {
        let file = File::open(path).map_err(|source| IngestError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        let capacity = self.chunk_size.clamp(8 * 1024, MAX_CAPACITY_HINT);
        let reader = BufReader::with_capacity(capacity, file);
        self.split_reader(reader, path)
    }

    /// Same as [`split_file`](Self::split_file) for an already opened reader.
    /// `path` is only used to label chunks and errors.
    pub fn split_reader<R: BufRead>(
        &self,
        mut reader: R,
        path: &Path,
    ) -> Result<FileChunks<R>, IngestError> {
        let mut header = String::new();
        reader
            .read_line(&mut header)
            .map_err(|source| IngestError::FileAccess {
                path: path.to_path_buf(),
                source,
            })?;

        let header = header.trim_end_matches(['\r', '\n']);
        let schema =
            HeaderSchema::detect(header).ok_or_else(|| IngestError::HeaderMismatch {
                path: path.to_path_buf(),
                header: header.to_string(),
            })?;

        Ok(FileChunks {
            reader,
            source: Arc::new(path.to_path_buf()),
            schema,
            chunk_size: self.chunk_size,
            next_index: 0,
            finished: false,
        })
    }
}

impl ChunkSource for ChunkSplitter {
    fn split(&self, path: &Path) -> Result<ChunkIter, IngestError> {
        Ok(Box::new(self.split_file(path)?))
    }
}

/// Iterator over the body of one file. Not restartable; a read error is
/// yielded once and ends the sequence.
pub struct FileChunks<R> {
    reader: R,
    source: Arc<PathBuf>,
    schema: HeaderSchema,
    chunk_size: usize,
    next_index: usize,
    finished: bool,
}

impl<R: BufRead> FileChunks<R> {
    pub fn schema(&self) -> HeaderSchema {
        self.schema
    }

    fn read_chunk(&mut self) -> io::Result<Option<Chunk>> {
        let capacity = self.chunk_size.min(MAX_CAPACITY_HINT).saturating_add(128);
        let mut buf = Vec::with_capacity(capacity);
        (&mut self.reader)
            .take(self.chunk_size as u64)
            .read_to_end(&mut buf)?;

        if buf.is_empty() {
            return Ok(None);
        }

        // A full slice that stops mid-line is completed up to the next terminator
        if buf.len() == self.chunk_size && buf.last() != Some(&b'\n') {
            self.reader.read_until(b'\n', &mut buf)?;
        }

        // Chunks end on '\n', so a bad byte only spoils its own line, which the
        // parser then rejects
        let text = match String::from_utf8(buf) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        };

        let chunk = Chunk {
            source: Arc::clone(&self.source),
            index: self.next_index,
            schema: self.schema,
            text,
        };
        self.next_index += 1;
        Ok(Some(chunk))
    }
}

impl<R: BufRead> Iterator for FileChunks<R> {
    type Item = io::Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.read_chunk() {
            Ok(Some(chunk)) => Some(Ok(chunk)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}
