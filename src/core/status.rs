//! Run status for the timer loop and for individual jobs.
//!
//! The timer status is shared between the scheduling task and any number of
//! controllers, so it lives in a single atomic byte and is read once per
//! tick firing.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU8, Ordering};

use crate::timer::TimerError;

/// Status of the timer loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum TimerStatus {
    /// Firings advance the tick counter and drain due jobs.
    Running = 0,
    /// Firings are consumed but ignored; the tick counter does not advance.
    Stopped = 1,
    /// The loop exits on its next firing. Permanent.
    Closed = 2,
}

impl TimerStatus {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => TimerStatus::Running,
            1 => TimerStatus::Stopped,
            _ => TimerStatus::Closed,
        }
    }
}

/// Atomically readable timer status.
#[derive(Debug)]
pub struct AtomicTimerStatus(AtomicU8);

impl AtomicTimerStatus {
    /// Create a new status cell.
    pub fn new(status: TimerStatus) -> Self {
        Self(AtomicU8::new(status as u8))
    }

    /// Read the current status.
    pub fn load(&self) -> TimerStatus {
        TimerStatus::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Move to `to` unless the timer is already closed.
    ///
    /// Returns the previous status.
    pub fn transition(&self, to: TimerStatus) -> Result<TimerStatus, TimerError> {
        self.0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                if TimerStatus::from_u8(current) == TimerStatus::Closed {
                    None
                } else {
                    Some(to as u8)
                }
            })
            .map(TimerStatus::from_u8)
            .map_err(|_| TimerError::Closed)
    }

    /// Close the timer. Returns the previous status.
    pub fn close(&self) -> TimerStatus {
        TimerStatus::from_u8(self.0.swap(TimerStatus::Closed as u8, Ordering::AcqRel))
    }
}

/// Status of a single job.
///
/// The timer loop only distinguishes `Closed` from everything else; the other
/// variants belong to the job's own execution bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum JobStatus {
    /// Waiting for its next due tick.
    Ready = 0,
    /// A run is in progress.
    Running = 1,
    /// Paused; due ticks are skipped.
    Stopped = 2,
    /// Finished for good; evicted from the queue at its next drain.
    Closed = 3,
}

impl JobStatus {
    /// Check if the job has been closed.
    pub fn is_closed(&self) -> bool {
        *self == JobStatus::Closed
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => JobStatus::Ready,
            1 => JobStatus::Running,
            2 => JobStatus::Stopped,
            _ => JobStatus::Closed,
        }
    }
}
