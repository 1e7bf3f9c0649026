//! Task queue and drain tracking for the worker pool
//!
//! The queue and the drain counter use separate locks. The producer counts a
//! task as outstanding before it becomes visible in the queue, so the counter
//! can never reach zero while a chunk is still waiting or being parsed.

use log::warn;
use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard};

use crate::chunker::Chunk;

#[derive(Debug, Default)]
struct QueueState {
    tasks: VecDeque<Chunk>,
    stop_requested: bool,
}

/// Unbounded FIFO of chunks awaiting a worker
#[derive(Debug, Default)]
pub struct TaskQueue {
    state: Mutex<QueueState>,
    available: Condvar,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock queue state with poison recovery
    fn lock_state(&self) -> MutexGuard<'_, QueueState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Thread panicked while holding the task queue, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Append a chunk and wake one waiting worker
    pub fn push(&self, chunk: Chunk) {
        self.lock_state().tasks.push_back(chunk);
        self.available.notify_one();
    }

    /// Block until a chunk is available or a stop was requested.
    ///
    /// Returns `None` only once a stop is pending and the queue is empty, so a
    /// stop never discards queued chunks.
    pub fn next_task(&self) -> Option<Chunk> {
        let guard = self.lock_state();
        let mut state = self
            .available
            .wait_while(guard, |state| {
                state.tasks.is_empty() && !state.stop_requested
            })
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        state.tasks.pop_front()
    }

    /// Ask every worker to exit once the queue is empty
    pub fn request_stop(&self) {
        self.lock_state().stop_requested = true;
        self.available.notify_all();
    }

    pub fn len(&self) -> usize {
        self.lock_state().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Counts tasks that were submitted but not yet fully processed
#[derive(Debug, Default)]
pub struct DrainSignal {
    outstanding: Mutex<usize>,
    drained: Condvar,
}

impl DrainSignal {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_count(&self) -> MutexGuard<'_, usize> {
        match self.outstanding.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Thread panicked while holding the drain counter, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Register one more outstanding task. Must happen before the task is
    /// pushed to the queue.
    pub fn add(&self) {
        *self.lock_count() += 1;
    }

    /// Mark one task as finished, results included
    pub fn complete(&self) {
        let mut count = self.lock_count();
        debug_assert!(*count > 0, "task completed more often than submitted");
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.drained.notify_all();
        }
    }

    /// Block until every submitted task has completed
    pub fn wait_drained(&self) {
        let guard = self.lock_count();
        let _guard = self
            .drained
            .wait_while(guard, |count| *count > 0)
            .unwrap_or_else(|poisoned| poisoned.into_inner());
    }

    pub fn outstanding(&self) -> usize {
        *self.lock_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::HeaderSchema;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn chunk(index: usize) -> Chunk {
        Chunk {
            source: Arc::new(PathBuf::from("q.csv")),
            index,
            schema: HeaderSchema::Trade,
            text: format!("{};1;1.0;1.0;bid\n", index),
        }
    }

    #[test]
    fn test_fifo_order() {
        let queue = TaskQueue::new();
        for i in 0..5 {
            queue.push(chunk(i));
        }
        assert_eq!(queue.len(), 5);

        let order: Vec<usize> = (0..5).map(|_| queue.next_task().unwrap().index).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_stop_still_hands_out_queued_chunks() {
        let queue = TaskQueue::new();
        queue.push(chunk(0));
        queue.push(chunk(1));
        queue.request_stop();

        assert_eq!(queue.next_task().map(|c| c.index), Some(0));
        assert_eq!(queue.next_task().map(|c| c.index), Some(1));
        assert!(queue.next_task().is_none());
    }

    #[test]
    fn test_blocked_worker_wakes_on_push_and_stop() {
        let queue = Arc::new(TaskQueue::new());

        let consumer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                let mut seen = Vec::new();
                while let Some(chunk) = queue.next_task() {
                    seen.push(chunk.index);
                }
                seen
            })
        };

        thread::sleep(Duration::from_millis(20));
        queue.push(chunk(7));
        thread::sleep(Duration::from_millis(20));
        queue.push(chunk(8));
        queue.request_stop();

        assert_eq!(consumer.join().unwrap(), vec![7, 8]);
    }

    #[test]
    fn test_drain_waits_for_completion() {
        let drain = Arc::new(DrainSignal::new());
        drain.add();
        drain.add();
        assert_eq!(drain.outstanding(), 2);

        let finisher = {
            let drain = Arc::clone(&drain);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                drain.complete();
                thread::sleep(Duration::from_millis(20));
                drain.complete();
            })
        };

        drain.wait_drained();
        assert_eq!(drain.outstanding(), 0);
        finisher.join().unwrap();
    }

    #[test]
    fn test_drain_with_nothing_outstanding_returns() {
        DrainSignal::new().wait_drained();
    }
}
