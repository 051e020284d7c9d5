//! Interval job: a repeating, optionally limited, tick-driven job.
//!
//! An `IntervalJob` is due every `interval_ticks` ticks. When due it hands its
//! body to a [`Dispatcher`] and returns at once, so the timer loop never waits
//! on job execution.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU8, AtomicU64, AtomicUsize, Ordering};
use thiserror::Error;

use crate::core::job::TickJob;
use crate::core::status::JobStatus;
use crate::core::types::JobId;

use super::dispatch::Dispatcher;

/// Errors that can occur when building a job.
#[derive(Debug, Error)]
pub enum JobError {
    /// The interval must be at least one tick.
    #[error("invalid interval: {0} ticks")]
    InvalidInterval(i64),
}

type JobBody = Arc<dyn Fn(i64) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// A job that runs every `interval_ticks` ticks.
pub struct IntervalJob {
    id: JobId,
    interval_ticks: i64,
    next_ticks: AtomicI64,
    /// Shared with in-flight runs so they can return the job to Ready.
    status: Arc<AtomicU8>,
    /// Dispatched runs that have not finished yet.
    in_flight: Arc<AtomicUsize>,
    /// Skip a due tick while a previous run is still executing.
    singleton: bool,
    /// Runs left before the job closes (None = unlimited).
    remaining: Option<AtomicU64>,
    body: JobBody,
    dispatcher: Dispatcher,
}

impl std::fmt::Debug for IntervalJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntervalJob")
            .field("id", &self.id)
            .field("interval_ticks", &self.interval_ticks)
            .field("next_ticks", &self.next_ticks())
            .field("status", &self.status())
            .field("singleton", &self.singleton)
            .field("remaining", &self.remaining_times())
            .finish()
    }
}

impl IntervalJob {
    /// Create a job running `body` every `interval_ticks` ticks.
    ///
    /// The body receives the tick it was run at. The job is first due at
    /// tick `interval_ticks`.
    pub fn new<F, Fut>(
        id: impl Into<JobId>,
        interval_ticks: i64,
        body: F,
    ) -> Result<Self, JobError>
    where
        F: Fn(i64) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if interval_ticks < 1 {
            return Err(JobError::InvalidInterval(interval_ticks));
        }
        let body: JobBody = Arc::new(move |ticks| Box::pin(body(ticks)));
        Ok(Self {
            id: id.into(),
            interval_ticks,
            next_ticks: AtomicI64::new(interval_ticks),
            status: Arc::new(AtomicU8::new(JobStatus::Ready as u8)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            singleton: false,
            remaining: None,
            body,
            dispatcher: Dispatcher::default(),
        })
    }

    /// Create a job that runs once, `delay_ticks` ticks from the start.
    pub fn once<F, Fut>(id: impl Into<JobId>, delay_ticks: i64, body: F) -> Result<Self, JobError>
    where
        F: Fn(i64) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Ok(Self::new(id, delay_ticks, body)?.with_times(1))
    }

    /// Count the first interval from `ticks` instead of zero.
    pub fn starting_at(self, ticks: i64) -> Self {
        self.next_ticks
            .store(ticks + self.interval_ticks, Ordering::SeqCst);
        self
    }

    /// Skip due ticks while a previous run is still executing.
    pub fn with_singleton(mut self, singleton: bool) -> Self {
        self.singleton = singleton;
        self
    }

    /// Run at most `times` times, then close.
    pub fn with_times(mut self, times: u64) -> Self {
        if times == 0 {
            self.set_status(JobStatus::Closed);
        }
        self.remaining = Some(AtomicU64::new(times));
        self
    }

    /// Set the dispatcher used to run the body.
    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Get the job ID.
    pub fn id(&self) -> &JobId {
        &self.id
    }

    /// Get the interval in ticks.
    pub fn interval_ticks(&self) -> i64 {
        self.interval_ticks
    }

    /// Check if the job is a singleton.
    pub fn is_singleton(&self) -> bool {
        self.singleton
    }

    /// Runs left before the job closes, if limited.
    pub fn remaining_times(&self) -> Option<u64> {
        self.remaining.as_ref().map(|r| r.load(Ordering::SeqCst))
    }

    /// Resume a stopped job.
    pub fn start(&self) {
        let _ = self.status.compare_exchange(
            JobStatus::Stopped as u8,
            JobStatus::Ready as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    /// Pause the job. Due ticks are skipped until it is started again.
    pub fn stop(&self) {
        let _ = self
            .status
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (JobStatus::from_u8(current) != JobStatus::Closed)
                    .then_some(JobStatus::Stopped as u8)
            });
    }

    /// Close the job. The timer drops it at its next drain.
    pub fn close(&self) {
        self.set_status(JobStatus::Closed);
    }

    fn set_status(&self, status: JobStatus) {
        self.status.store(status as u8, Ordering::Release);
    }

    /// Take one of the remaining runs.
    ///
    /// Returns `None` if none are left, otherwise whether this was the last.
    fn take_run(&self) -> Option<bool> {
        let Some(remaining) = &self.remaining else {
            return Some(false);
        };
        remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .ok()
            .map(|before| before == 1)
    }

    fn run(&self, current_ticks: i64) {
        let Some(last) = self.take_run() else {
            self.set_status(JobStatus::Closed);
            return;
        };

        tracing::trace!(job = %self.id, ticks = current_ticks, "Dispatching job run");
        let status = Arc::clone(&self.status);
        let in_flight = Arc::clone(&self.in_flight);
        in_flight.fetch_add(1, Ordering::AcqRel);
        self.dispatcher
            .dispatch(self.id.as_str(), (self.body)(current_ticks), move |_| {
                // Only the last overlapping run hands the job back
                if in_flight.fetch_sub(1, Ordering::AcqRel) == 1 {
                    let _ = status.compare_exchange(
                        JobStatus::Running as u8,
                        JobStatus::Ready as u8,
                        Ordering::AcqRel,
                        Ordering::Acquire,
                    );
                }
            });

        if last {
            tracing::debug!(job = %self.id, "Job used its last run, closing");
            self.set_status(JobStatus::Closed);
        }
    }
}

impl TickJob for IntervalJob {
    fn name(&self) -> &str {
        self.id.as_str()
    }

    fn next_ticks(&self) -> i64 {
        self.next_ticks.load(Ordering::SeqCst)
    }

    fn status(&self) -> JobStatus {
        JobStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    fn check_and_run(&self, current_ticks: i64) {
        if current_ticks < self.next_ticks() {
            return;
        }
        self.next_ticks
            .store(current_ticks + self.interval_ticks, Ordering::SeqCst);

        match self.status() {
            JobStatus::Running => {
                if self.singleton {
                    tracing::trace!(job = %self.id, ticks = current_ticks, "Previous run still executing, skipping");
                    return;
                }
            }
            JobStatus::Ready => {
                if self
                    .status
                    .compare_exchange(
                        JobStatus::Ready as u8,
                        JobStatus::Running as u8,
                        Ordering::AcqRel,
                        Ordering::Acquire,
                    )
                    .is_err()
                {
                    return;
                }
            }
            JobStatus::Stopped | JobStatus::Closed => return,
        }

        self.run(current_ticks);
    }
}
