//! Testing utilities for users of the tickloop library.
//!
//! This module provides helpers for testing timers and jobs deterministically:
//!
//! - [`ManualTickSource`] / [`TickController`]: fire ticks by hand and wait
//!   until the loop has finished processing each one
//! - [`RecordingJob`]: a job that records every tick it was run at
//! - [`CountingQueue`]: a queue that counts pushes, pops, and peeks

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, watch};

use crate::core::job::{SharedJob, TickJob};
use crate::core::queue::{HeapQueue, JobQueue};
use crate::core::status::JobStatus;
use crate::timer::TickSource;

/// A tick source fired by a [`TickController`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tickloop::testing::ManualTickSource;
/// use tickloop::{HeapQueue, Timer};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (source, mut controller) = ManualTickSource::new();
/// let (handle, task) = Timer::with_tick_source(Arc::new(HeapQueue::new()), source).start();
///
/// controller.tick().await; // returns once tick 1 is fully processed
/// handle.close();
/// controller.tick().await; // the loop sees Closed and exits
/// task.await.unwrap();
/// assert_eq!(controller.stop_count(), 1);
/// # }
/// ```
pub struct ManualTickSource {
    firings: mpsc::UnboundedReceiver<()>,
    delivered: u64,
    processed: watch::Sender<u64>,
    stops: Arc<AtomicUsize>,
}

/// Controls a [`ManualTickSource`].
///
/// Dropping the controller exhausts the source, which ends the loop.
pub struct TickController {
    firings: mpsc::UnboundedSender<()>,
    sent: u64,
    processed: watch::Receiver<u64>,
    stops: Arc<AtomicUsize>,
}

impl ManualTickSource {
    /// Create a source and its controller.
    pub fn new() -> (Self, TickController) {
        let (firings_tx, firings_rx) = mpsc::unbounded_channel();
        let (processed_tx, processed_rx) = watch::channel(0);
        let stops = Arc::new(AtomicUsize::new(0));

        let source = Self {
            firings: firings_rx,
            delivered: 0,
            processed: processed_tx,
            stops: Arc::clone(&stops),
        };
        let controller = TickController {
            firings: firings_tx,
            sent: 0,
            processed: processed_rx,
            stops,
        };
        (source, controller)
    }
}

#[async_trait]
impl TickSource for ManualTickSource {
    async fn fired(&mut self) -> bool {
        // Asking for the next firing means the previous one is done
        self.processed.send_replace(self.delivered);
        match self.firings.recv().await {
            Some(()) => {
                self.delivered += 1;
                true
            }
            None => false,
        }
    }

    fn stop(&mut self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.firings.close();
        self.processed.send_replace(self.delivered);
    }
}

impl TickController {
    /// Fire one tick and wait until the loop has processed it.
    ///
    /// Also returns if the loop exits or the source is stopped.
    pub async fn tick(&mut self) {
        if self.firings.send(()).is_err() {
            return;
        }
        self.sent += 1;
        let target = self.sent;
        let _ = self.processed.wait_for(|processed| *processed >= target).await;
    }

    /// Fire `n` ticks, waiting for each.
    pub async fn tick_n(&mut self, n: usize) {
        for _ in 0..n {
            self.tick().await;
        }
    }

    /// How many times the source has been stopped.
    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    /// Shared stop counter, readable after the controller is dropped.
    pub fn stop_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.stops)
    }
}

/// A job that records the ticks it was run at.
///
/// Each run moves its next tick to `current + interval`.
pub struct RecordingJob {
    name: String,
    next: AtomicI64,
    interval: i64,
    max_runs: Option<u64>,
    runs: AtomicU64,
    closed: AtomicBool,
    panics: bool,
    seen: Mutex<Vec<i64>>,
}

impl RecordingJob {
    fn build(name: &str, first: i64, interval: i64, max_runs: Option<u64>, panics: bool) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            next: AtomicI64::new(first),
            interval,
            max_runs,
            runs: AtomicU64::new(0),
            closed: AtomicBool::new(false),
            panics,
            seen: Mutex::new(Vec::new()),
        })
    }

    /// A job first due at `first`, then every `interval` ticks.
    pub fn repeating(name: &str, first: i64, interval: i64) -> Arc<Self> {
        Self::build(name, first, interval, None, false)
    }

    /// A job first due at `first` that closes itself after `runs` runs.
    pub fn closing_after(name: &str, first: i64, runs: u64) -> Arc<Self> {
        Self::build(name, first, 1, Some(runs), false)
    }

    /// A job first due at `first` whose check-and-run panics.
    pub fn panicking(name: &str, first: i64) -> Arc<Self> {
        Self::build(name, first, 1, None, true)
    }

    /// Push this job onto a queue under its next tick.
    pub fn push_to(self: &Arc<Self>, queue: &dyn JobQueue) {
        queue.push(Arc::clone(self) as SharedJob, self.next_ticks());
    }

    /// Ticks this job was run at, in order.
    pub fn seen_ticks(&self) -> Vec<i64> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of completed runs.
    pub fn run_count(&self) -> u64 {
        self.runs.load(Ordering::SeqCst)
    }

    /// Move the next due tick, leaving the queue key untouched.
    pub fn set_next_ticks(&self, ticks: i64) {
        self.next.store(ticks, Ordering::SeqCst);
    }

    /// Close the job from outside.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl TickJob for RecordingJob {
    fn name(&self) -> &str {
        &self.name
    }

    fn next_ticks(&self) -> i64 {
        self.next.load(Ordering::SeqCst)
    }

    fn status(&self) -> JobStatus {
        if self.closed.load(Ordering::SeqCst) {
            JobStatus::Closed
        } else {
            JobStatus::Ready
        }
    }

    fn check_and_run(&self, current_ticks: i64) {
        if self.panics {
            panic!("{} failed at tick {}", self.name, current_ticks);
        }

        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(current_ticks);
        self.next.store(current_ticks + self.interval, Ordering::SeqCst);

        let runs = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
        if self.max_runs.is_some_and(|max| runs >= max) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }
}

/// A [`HeapQueue`] that counts the operations performed on it.
///
/// `pops` counts only pops that returned a job.
#[derive(Default)]
pub struct CountingQueue {
    inner: HeapQueue,
    pushes: AtomicUsize,
    pops: AtomicUsize,
    peeks: AtomicUsize,
}

impl CountingQueue {
    /// Create an empty counting queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pushes since the last reset.
    pub fn pushes(&self) -> usize {
        self.pushes.load(Ordering::SeqCst)
    }

    /// Number of successful pops since the last reset.
    pub fn pops(&self) -> usize {
        self.pops.load(Ordering::SeqCst)
    }

    /// Number of minimum-priority peeks since the last reset.
    pub fn peeks(&self) -> usize {
        self.peeks.load(Ordering::SeqCst)
    }

    /// Zero all counters.
    pub fn reset_counts(&self) {
        self.pushes.store(0, Ordering::SeqCst);
        self.pops.store(0, Ordering::SeqCst);
        self.peeks.store(0, Ordering::SeqCst);
    }
}

impl JobQueue for CountingQueue {
    fn push(&self, job: SharedJob, priority: i64) {
        self.pushes.fetch_add(1, Ordering::SeqCst);
        self.inner.push(job, priority);
    }

    fn pop(&self) -> Option<SharedJob> {
        let job = self.inner.pop();
        if job.is_some() {
            self.pops.fetch_add(1, Ordering::SeqCst);
        }
        job
    }

    fn peek_min_priority(&self) -> Option<i64> {
        self.peeks.fetch_add(1, Ordering::SeqCst);
        self.inner.peek_min_priority()
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}
