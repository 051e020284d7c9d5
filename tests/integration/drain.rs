//! Drain integration tests.
//!
//! Tests the public `drain` entry point against a shared queue.

use std::sync::Arc;
use tickloop::testing::{CountingQueue, RecordingJob};
use tickloop::{DrainOutcome, FaultPolicy, HeapQueue, JobQueue, drain};

use crate::common::start_manual;

#[test]
fn test_drain_runs_every_due_job_and_leaves_the_rest() {
    let queue = CountingQueue::new();
    let early = RecordingJob::repeating("early", 3, 100);
    let due_a = RecordingJob::repeating("due_a", 5, 100);
    let due_b = RecordingJob::repeating("due_b", 5, 100);
    let late = RecordingJob::repeating("late", 10, 100);
    for job in [&early, &due_a, &due_b, &late] {
        job.push_to(&queue);
    }
    queue.reset_counts();

    let outcome = drain(&queue, 5, FaultPolicy::Contain);

    assert_eq!(outcome.ran, 3);
    assert_eq!(outcome.requeued, 3);
    assert!(outcome.halted_on_not_due);
    assert_eq!(early.seen_ticks(), vec![5]);
    assert_eq!(due_a.seen_ticks(), vec![5]);
    assert_eq!(due_b.seen_ticks(), vec![5]);
    assert!(late.seen_ticks().is_empty());
    assert_eq!(queue.peek_min_priority(), Some(10));
}

#[test]
fn test_stale_key_is_corrected_and_halts() {
    let queue = CountingQueue::new();
    let job = RecordingJob::repeating("moved", 5, 1);
    job.push_to(&queue);
    job.set_next_ticks(7);
    queue.reset_counts();

    let outcome = drain(&queue, 5, FaultPolicy::Contain);

    assert_eq!(
        outcome,
        DrainOutcome {
            popped: 1,
            halted_on_not_due: true,
            ..Default::default()
        }
    );
    assert_eq!(queue.pops(), 1);
    assert_eq!(queue.pushes(), 1);
    assert_eq!(queue.peek_min_priority(), Some(7));
    assert!(job.seen_ticks().is_empty());
}

#[test]
fn test_empty_drain_is_a_no_op() {
    let queue = CountingQueue::new();
    let outcome = drain(&queue, 42, FaultPolicy::Contain);

    assert_eq!(outcome, DrainOutcome::default());
    assert_eq!(queue.pops(), 0);
    assert_eq!(queue.pushes(), 0);
}

#[tokio::test]
async fn test_closed_job_is_never_seen_again() {
    let queue = Arc::new(HeapQueue::new());
    let once = RecordingJob::closing_after("once", 2, 1);
    let steady = RecordingJob::repeating("steady", 1, 1);
    once.push_to(queue.as_ref());
    steady.push_to(queue.as_ref());

    let mut timer = start_manual(Arc::clone(&queue), FaultPolicy::Contain);
    timer.ticks.tick_n(6).await;

    assert_eq!(once.seen_ticks(), vec![2]);
    assert_eq!(steady.run_count(), 6);
    assert_eq!(queue.len(), 1);
}

#[tokio::test]
async fn test_job_closed_from_outside_is_evicted_when_next_due() {
    let queue = Arc::new(HeapQueue::new());
    let job = RecordingJob::repeating("cancelled", 1, 2);
    job.push_to(queue.as_ref());

    let mut timer = start_manual(Arc::clone(&queue), FaultPolicy::Contain);
    timer.ticks.tick().await;
    assert_eq!(queue.len(), 1);

    job.close();
    timer.ticks.tick_n(4).await;

    // The job still runs once more when due, then is dropped
    assert_eq!(job.seen_ticks(), vec![1, 3]);
    assert!(queue.is_empty());
}
