//! Min-priority job queue keyed by next due tick.
//!
//! The queue is the one resource shared across actors: the timer loop pops
//! and re-pushes while external owners push newly created jobs. Every
//! operation takes `&self` and synchronizes internally.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::job::SharedJob;

/// A thread-safe min-priority queue of jobs.
pub trait JobQueue: Send + Sync {
    /// Insert a job with the given priority (its due tick).
    fn push(&self, job: SharedJob, priority: i64);

    /// Remove and return the job with the smallest priority.
    fn pop(&self) -> Option<SharedJob>;

    /// Smallest priority currently queued, or `None` when empty.
    fn peek_min_priority(&self) -> Option<i64>;

    /// Number of queued jobs.
    fn len(&self) -> usize;

    /// Check if the queue is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct HeapEntry {
    priority: i64,
    seq: u64,
    job: SharedJob,
}

impl Eq for HeapEntry {}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: smaller priority, then earlier insertion, ranks higher
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Default)]
struct HeapInner {
    heap: BinaryHeap<HeapEntry>,
    next_seq: u64,
}

/// Binary-heap job queue behind a mutex.
///
/// Jobs with equal priority come out in insertion order.
#[derive(Default)]
pub struct HeapQueue {
    inner: Mutex<HeapInner>,
}

impl HeapQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HeapInner> {
        // Every critical section is a single heap call, so a poisoned guard
        // still holds a well-formed heap.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl JobQueue for HeapQueue {
    fn push(&self, job: SharedJob, priority: i64) {
        let mut inner = self.lock();
        let seq = inner.next_seq;
        inner.next_seq = inner.next_seq.wrapping_add(1);
        inner.heap.push(HeapEntry { priority, seq, job });
    }

    fn pop(&self) -> Option<SharedJob> {
        self.lock().heap.pop().map(|entry| entry.job)
    }

    fn peek_min_priority(&self) -> Option<i64> {
        self.lock().heap.peek().map(|entry| entry.priority)
    }

    fn len(&self) -> usize {
        self.lock().heap.len()
    }
}

impl std::fmt::Debug for HeapQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("HeapQueue")
            .field("len", &inner.heap.len())
            .field("min_priority", &inner.heap.peek().map(|e| e.priority))
            .finish()
    }
}
