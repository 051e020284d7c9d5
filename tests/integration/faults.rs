//! Fault handling integration tests.
//!
//! Tests what happens to the loop when a job's check-and-run panics under
//! each fault policy.

use std::sync::Arc;
use tickloop::testing::RecordingJob;
use tickloop::{FaultPolicy, HeapQueue, JobQueue};

use crate::common::start_manual;

#[tokio::test]
async fn test_contained_panic_keeps_loop_alive() {
    let queue = Arc::new(HeapQueue::new());
    let bad = RecordingJob::panicking("bad", 1);
    let good = RecordingJob::repeating("good", 1, 1);
    bad.push_to(queue.as_ref());
    good.push_to(queue.as_ref());

    let mut timer = start_manual(Arc::clone(&queue), FaultPolicy::Contain);
    timer.ticks.tick_n(3).await;

    assert!(!timer.task.is_finished());
    assert_eq!(good.seen_ticks(), vec![1, 2, 3]);
    // The faulting job was evicted
    assert_eq!(queue.len(), 1);

    timer.handle.close();
    timer.ticks.tick().await;
    timer.task.await.unwrap();
}

#[tokio::test]
async fn test_propagated_panic_ends_loop_and_releases_source() {
    let queue = Arc::new(HeapQueue::new());
    RecordingJob::panicking("bad", 2).push_to(queue.as_ref());

    let mut timer = start_manual(queue, FaultPolicy::Propagate);
    timer.ticks.tick_n(2).await;

    let err = timer.task.await.unwrap_err();
    assert!(err.is_panic());
    assert_eq!(timer.ticks.stop_count(), 1);
}
