//! Shared record accumulation for the worker pool

use log::warn;
use std::sync::{Mutex, MutexGuard};

use crate::record::Record;

/// Records appended by workers in completion order. Only meaningful once the
/// pool has drained; [`take_sorted`](Self::take_sorted) produces the ordered
/// result.
#[derive(Debug, Default)]
pub struct ResultStore {
    records: Mutex<Vec<Record>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock records with poison recovery
    fn lock_records(&self) -> MutexGuard<'_, Vec<Record>> {
        match self.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Worker thread panicked, recovering result store");
                poisoned.into_inner()
            }
        }
    }

    pub fn append(&self, mut batch: Vec<Record>) {
        if batch.is_empty() {
            return;
        }
        self.lock_records().append(&mut batch);
    }

    pub fn len(&self) -> usize {
        self.lock_records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Move all records out, sorted ascending by `receive_ts`. Order among
    /// equal timestamps is unspecified.
    pub fn take_sorted(&self) -> Vec<Record> {
        let mut records = std::mem::take(&mut *self.lock_records());
        records.sort_unstable();
        records
    }
}
