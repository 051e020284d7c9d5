//! Timer engine implementation.
//!
//! One background task owns the tick source and the tick counter. On every
//! firing it reads the shared status once:
//! - Running: advance the tick counter and drain due jobs
//! - Stopped: ignore the firing (the counter does not advance)
//! - Closed: exit and stop the tick source

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::config::TimerConfig;
use crate::core::queue::JobQueue;
use crate::core::status::{AtomicTimerStatus, TimerStatus};

use super::drain::{DrainOutcome, drain};
use super::handle::TimerHandle;
use super::tick_source::{IntervalTickSource, TickGuard, TickSource};
use super::types::{FaultPolicy, TimerError};

/// What the loop did with one firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Firing {
    /// Running, but nothing was due.
    Idle,
    /// Running, and due jobs were drained.
    Drained(DrainOutcome),
    /// Stopped; the firing was ignored.
    Skipped,
    /// Closed; the loop must exit.
    Exit,
}

/// Per-firing state machine of the timer loop.
pub(crate) struct TickLoop<Q: JobQueue> {
    queue: Arc<Q>,
    status: Arc<AtomicTimerStatus>,
    fault_policy: FaultPolicy,
    ticks: i64,
    /// Read-only copy of `ticks` for handles.
    published: Arc<AtomicI64>,
}

impl<Q: JobQueue> TickLoop<Q> {
    /// Handle one tick firing.
    pub(crate) fn on_firing(&mut self) -> Firing {
        match self.status.load() {
            TimerStatus::Running => {
                self.ticks += 1;
                self.published.store(self.ticks, Ordering::Release);
                let due = self
                    .queue
                    .peek_min_priority()
                    .is_some_and(|min| self.ticks >= min);
                if !due {
                    tracing::trace!(ticks = self.ticks, "Tick");
                    return Firing::Idle;
                }

                let outcome = drain(self.queue.as_ref(), self.ticks, self.fault_policy);
                tracing::debug!(
                    ticks = self.ticks,
                    ran = outcome.ran,
                    requeued = outcome.requeued,
                    evicted = outcome.evicted,
                    faulted = outcome.faulted,
                    "Drained due jobs"
                );
                Firing::Drained(outcome)
            }
            TimerStatus::Stopped => Firing::Skipped,
            TimerStatus::Closed => Firing::Exit,
        }
    }

    #[cfg(test)]
    pub(crate) fn ticks(&self) -> i64 {
        self.ticks
    }
}

/// A virtual-clock timer over a shared job queue.
pub struct Timer<Q: JobQueue> {
    /// Jobs keyed by next due tick, shared with external producers.
    queue: Arc<Q>,
    /// Status shared with every handle.
    status: Arc<AtomicTimerStatus>,
    /// Drives the loop; stopped when the loop exits.
    tick_source: Box<dyn TickSource>,
    /// How panics from a job's check-and-run are treated.
    fault_policy: FaultPolicy,
    /// Current tick, written only by the loop.
    ticks: Arc<AtomicI64>,
}

impl<Q: JobQueue + 'static> Timer<Q> {
    /// Create a timer ticking every `interval` over the given queue.
    pub fn new(queue: Arc<Q>, interval: Duration) -> Result<Self, TimerError> {
        let source = IntervalTickSource::new(interval)?;
        Ok(Self::with_tick_source(queue, source))
    }

    /// Create a timer driven by a custom tick source.
    pub fn with_tick_source(queue: Arc<Q>, source: impl TickSource + 'static) -> Self {
        Self {
            queue,
            status: Arc::new(AtomicTimerStatus::new(TimerStatus::Running)),
            tick_source: Box::new(source),
            fault_policy: FaultPolicy::default(),
            ticks: Arc::new(AtomicI64::new(0)),
        }
    }

    /// Create a timer from configuration.
    pub fn from_config(queue: Arc<Q>, config: &TimerConfig) -> Result<Self, TimerError> {
        config.validate()?;
        let initial = if config.start_stopped {
            TimerStatus::Stopped
        } else {
            TimerStatus::Running
        };
        Ok(Self::new(queue, config.interval())?
            .with_fault_policy(config.fault_policy)
            .with_initial_status(initial))
    }

    /// Set the status the loop starts in.
    pub fn with_initial_status(self, status: TimerStatus) -> Self {
        Self {
            status: Arc::new(AtomicTimerStatus::new(status)),
            ..self
        }
    }

    /// Set the fault policy.
    pub fn with_fault_policy(mut self, policy: FaultPolicy) -> Self {
        self.fault_policy = policy;
        self
    }

    /// Get a handle for controlling this timer.
    pub fn handle(&self) -> TimerHandle<Q> {
        TimerHandle {
            status: Arc::clone(&self.status),
            queue: Arc::clone(&self.queue),
            ticks: Arc::clone(&self.ticks),
        }
    }

    /// Start the loop on a background task and return a handle for controlling it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(self) -> (TimerHandle<Q>, JoinHandle<()>) {
        let handle = self.handle();
        let task = tokio::spawn(self.run());
        (handle, task)
    }

    /// Main timer loop.
    async fn run(self) {
        let Timer {
            queue,
            status,
            tick_source,
            fault_policy,
            ticks,
        } = self;

        let mut tick_loop = TickLoop {
            queue,
            status,
            fault_policy,
            ticks: ticks.load(Ordering::Acquire),
            published: ticks,
        };
        // Dropped on every exit path, unwinding included
        let mut ticker = TickGuard::new(tick_source);

        tracing::info!(?fault_policy, "Timer loop started");

        while ticker.fired().await {
            if tick_loop.on_firing() == Firing::Exit {
                tracing::info!(ticks = tick_loop.ticks, "Timer closed, loop exiting");
                return;
            }
        }

        tracing::info!(ticks = tick_loop.ticks, "Tick source exhausted, loop exiting");
    }
}
