//! The job capability the timer loop schedules.
//!
//! The loop never builds, runs, or frees a job body. It reads a job's next
//! due tick, asks it to check-and-run at the current tick, and re-inserts it
//! unless it reports `Closed`.

use std::sync::Arc;

use super::status::JobStatus;

/// A job the timer loop can schedule.
///
/// Implementations must be cheap to call: `check_and_run` is invoked on the
/// scheduling task and should hand real work off (see
/// [`Dispatcher`](crate::execution::Dispatcher)) rather than block.
///
/// After a run, a job must either advance [`next_ticks`](TickJob::next_ticks)
/// past the tick it was given or report `Closed`; otherwise it is due again
/// immediately and the same drain pops it again.
pub trait TickJob: Send + Sync {
    /// Name used in log output.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// The tick at which this job next needs inspecting.
    fn next_ticks(&self) -> i64;

    /// Current status of the job.
    fn status(&self) -> JobStatus;

    /// Decide whether the job runs at `current_ticks` and, if so, run it.
    fn check_and_run(&self, current_ticks: i64);
}

/// A job shared between the queue, the loop, and its owner.
pub type SharedJob = Arc<dyn TickJob>;
