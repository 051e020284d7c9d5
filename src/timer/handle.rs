//! Timer handle for controlling a running timer.
//!
//! This module provides the `TimerHandle` type that lets external owners
//! start, stop, and close the timer and reach its shared job queue. Status
//! changes are picked up by the loop at its next tick firing.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::core::queue::JobQueue;
use crate::core::status::{AtomicTimerStatus, TimerStatus};

use super::types::TimerError;

/// Handle for controlling a timer.
pub struct TimerHandle<Q: JobQueue> {
    pub(crate) status: Arc<AtomicTimerStatus>,
    pub(crate) queue: Arc<Q>,
    pub(crate) ticks: Arc<AtomicI64>,
}

impl<Q: JobQueue> Clone for TimerHandle<Q> {
    fn clone(&self) -> Self {
        Self {
            status: Arc::clone(&self.status),
            queue: Arc::clone(&self.queue),
            ticks: Arc::clone(&self.ticks),
        }
    }
}

impl<Q: JobQueue> TimerHandle<Q> {
    /// Resume processing ticks.
    pub fn start(&self) -> Result<(), TimerError> {
        let prev = self.status.transition(TimerStatus::Running)?;
        if prev != TimerStatus::Running {
            tracing::info!("Timer started");
        }
        Ok(())
    }

    /// Pause the timer.
    ///
    /// While stopped, firings are consumed but the tick counter does not
    /// advance and no job is inspected.
    pub fn stop(&self) -> Result<(), TimerError> {
        let prev = self.status.transition(TimerStatus::Stopped)?;
        if prev != TimerStatus::Stopped {
            tracing::info!("Timer stopped");
        }
        Ok(())
    }

    /// Close the timer permanently.
    ///
    /// The loop exits at its next firing and releases its tick source. A
    /// drain already in progress runs to completion.
    pub fn close(&self) {
        if self.status.close() != TimerStatus::Closed {
            tracing::info!("Timer closing");
        }
    }

    /// Get the current timer status.
    pub fn status(&self) -> TimerStatus {
        self.status.load()
    }

    /// Check if the timer is running.
    pub fn is_running(&self) -> bool {
        self.status.load() == TimerStatus::Running
    }

    /// Check if the timer has been closed.
    pub fn is_closed(&self) -> bool {
        self.status.load() == TimerStatus::Closed
    }

    /// The loop's current tick.
    ///
    /// Jobs registered while the timer runs should count their first
    /// interval from here (see [`IntervalJob::starting_at`]).
    ///
    /// [`IntervalJob::starting_at`]: crate::execution::IntervalJob::starting_at
    pub fn ticks(&self) -> i64 {
        self.ticks.load(Ordering::Acquire)
    }

    /// The job queue shared with the loop.
    pub fn queue(&self) -> &Arc<Q> {
        &self.queue
    }
}
