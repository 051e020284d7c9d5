//! Tick sources that drive the timer loop.
//!
//! A tick source fires at a fixed wall-clock period and is owned by exactly
//! one loop. The loop holds it in a [`TickGuard`] so the source is stopped
//! exactly once however the loop exits.

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use super::types::TimerError;

/// A source of periodic firings.
#[async_trait]
pub trait TickSource: Send {
    /// Wait for the next firing.
    ///
    /// Returns `false` once the source is exhausted or stopped; the loop then
    /// exits.
    async fn fired(&mut self) -> bool;

    /// Release the source's timer resources.
    fn stop(&mut self);
}

/// Tick source backed by a tokio interval.
///
/// The first firing comes one period after the first poll. When the
/// consumer falls behind, one late firing is delivered and the rest are
/// dropped.
pub struct IntervalTickSource {
    period: Duration,
    interval: Option<Interval>,
    stopped: bool,
}

impl IntervalTickSource {
    /// Create a tick source firing every `period`.
    pub fn new(period: Duration) -> Result<Self, TimerError> {
        if period.is_zero() {
            return Err(TimerError::InvalidInterval(period));
        }
        Ok(Self {
            period,
            interval: None,
            stopped: false,
        })
    }

    /// Get the firing period.
    pub fn period(&self) -> Duration {
        self.period
    }
}

#[async_trait]
impl TickSource for IntervalTickSource {
    async fn fired(&mut self) -> bool {
        if self.stopped {
            return false;
        }
        let period = self.period;
        // Created lazily so construction does not need a runtime
        let interval = self.interval.get_or_insert_with(|| {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval
        });
        interval.tick().await;
        true
    }

    fn stop(&mut self) {
        self.stopped = true;
        self.interval = None;
        tracing::debug!(period = ?self.period, "Tick source stopped");
    }
}

/// Owns a tick source and stops it when dropped.
pub(crate) struct TickGuard {
    source: Box<dyn TickSource>,
}

impl TickGuard {
    pub(crate) fn new(source: Box<dyn TickSource>) -> Self {
        Self { source }
    }

    pub(crate) async fn fired(&mut self) -> bool {
        self.source.fired().await
    }
}

impl Drop for TickGuard {
    fn drop(&mut self) {
        self.source.stop();
    }
}
