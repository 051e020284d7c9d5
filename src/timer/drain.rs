//! Draining due jobs from the queue.
//!
//! The queue works as a lazy schedule: the globally smallest key is popped
//! and checked against the current tick, and the first job found not yet due
//! ends the drain. Cost per tick is proportional to the jobs actually due.

use std::panic::{self, AssertUnwindSafe};

use crate::core::job::SharedJob;
use crate::core::queue::JobQueue;

use super::types::FaultPolicy;

/// Counters describing one drain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainOutcome {
    /// Jobs popped from the queue, including one pushed back as not yet due.
    pub popped: usize,
    /// Jobs whose check-and-run was invoked.
    pub ran: usize,
    /// Jobs re-inserted after running.
    pub requeued: usize,
    /// Jobs dropped because they reported `Closed`.
    pub evicted: usize,
    /// Jobs dropped because their check-and-run panicked.
    pub faulted: usize,
    /// The drain stopped on a job that was not yet due.
    pub halted_on_not_due: bool,
}

/// Pop, check, and re-insert every job due at `current_ticks`.
///
/// A job popped while its freshly read next tick is still ahead of
/// `current_ticks` is pushed back under that tick and the drain stops.
/// Otherwise the job's check-and-run is invoked, and the job is re-inserted
/// under its possibly updated next tick unless it now reports `Closed`.
pub fn drain<Q>(queue: &Q, current_ticks: i64, policy: FaultPolicy) -> DrainOutcome
where
    Q: JobQueue + ?Sized,
{
    let mut outcome = DrainOutcome::default();

    while let Some(job) = queue.pop() {
        outcome.popped += 1;

        // Read fresh; the key it was queued under may be stale
        let job_next_ticks = job.next_ticks();
        if current_ticks < job_next_ticks {
            queue.push(job, job_next_ticks);
            outcome.halted_on_not_due = true;
            break;
        }

        outcome.ran += 1;
        if !check_and_run(&job, current_ticks, policy) {
            outcome.faulted += 1;
            continue;
        }

        if job.status().is_closed() {
            tracing::debug!(job = %job.name(), ticks = current_ticks, "Evicting closed job");
            outcome.evicted += 1;
        } else {
            let next_ticks = job.next_ticks();
            queue.push(job, next_ticks);
            outcome.requeued += 1;
        }
    }

    outcome
}

/// Invoke the job's check-and-run under the fault policy.
///
/// Returns `false` if the call panicked and the panic was contained.
fn check_and_run(job: &SharedJob, current_ticks: i64, policy: FaultPolicy) -> bool {
    match policy {
        FaultPolicy::Propagate => {
            job.check_and_run(current_ticks);
            true
        }
        FaultPolicy::Contain => {
            match panic::catch_unwind(AssertUnwindSafe(|| job.check_and_run(current_ticks))) {
                Ok(()) => true,
                Err(payload) => {
                    tracing::error!(
                        job = %job.name(),
                        ticks = current_ticks,
                        panic = %panic_message(payload.as_ref()),
                        "Job panicked during check-and-run, evicting it"
                    );
                    false
                }
            }
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
