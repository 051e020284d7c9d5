//! Interval job integration tests.
//!
//! Tests interval jobs scheduled and dispatched by a running timer.

use std::sync::Arc;
use tickloop::{
    Dispatcher, FaultPolicy, HeapQueue, IntervalJob, JobQueue, JobStatus, SharedJob, TickJob,
};
use tokio::sync::mpsc;

use crate::common::{collect, start_manual};

fn reporting_job(id: &str, interval: i64) -> (IntervalJob, mpsc::UnboundedReceiver<i64>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let job = IntervalJob::new(id, interval, move |ticks| {
        let tx = tx.clone();
        async move {
            let _ = tx.send(ticks);
        }
    })
    .unwrap();
    (job, rx)
}

#[tokio::test]
async fn test_interval_job_runs_every_interval() {
    let (job, mut rx) = reporting_job("every_two", 2);
    let job = Arc::new(job);
    let queue = Arc::new(HeapQueue::new());
    queue.push(Arc::clone(&job) as SharedJob, job.next_ticks());

    let mut timer = start_manual(queue, FaultPolicy::Contain);
    timer.ticks.tick_n(6).await;

    assert_eq!(collect(&mut rx, 3).await, vec![2, 4, 6]);
    assert_eq!(job.next_ticks(), 8);
}

#[tokio::test]
async fn test_limited_job_is_evicted_after_last_run() {
    let (job, mut rx) = reporting_job("twice", 1);
    let job = Arc::new(job.with_times(2));
    let queue = Arc::new(HeapQueue::new());
    queue.push(Arc::clone(&job) as SharedJob, job.next_ticks());

    let mut timer = start_manual(Arc::clone(&queue), FaultPolicy::Contain);
    timer.ticks.tick_n(5).await;

    assert_eq!(collect(&mut rx, 2).await, vec![1, 2]);
    assert_eq!(job.status(), JobStatus::Closed);
    assert!(queue.is_empty());
}

#[tokio::test]
async fn test_stopped_job_stays_queued_without_running() {
    let (job, mut rx) = reporting_job("paused", 1);
    let job = Arc::new(job);
    job.stop();
    let queue = Arc::new(HeapQueue::new());
    queue.push(Arc::clone(&job) as SharedJob, job.next_ticks());

    let mut timer = start_manual(Arc::clone(&queue), FaultPolicy::Contain);
    timer.ticks.tick_n(3).await;
    assert_eq!(queue.len(), 1);
    assert!(rx.try_recv().is_err());

    job.start();
    timer.ticks.tick().await;
    assert_eq!(collect(&mut rx, 1).await, vec![4]);
}

#[tokio::test]
async fn test_panicking_body_does_not_reach_the_loop() {
    let job = Arc::new(
        IntervalJob::new("explodes", 1, |ticks| async move {
            if ticks > 0 {
                panic!("body failed at tick {}", ticks);
            }
        })
        .unwrap()
        .with_dispatcher(Dispatcher::with_concurrency(1)),
    );
    let queue = Arc::new(HeapQueue::new());
    queue.push(Arc::clone(&job) as SharedJob, job.next_ticks());

    // Propagate would end the loop on a panic inside check-and-run
    let mut timer = start_manual(Arc::clone(&queue), FaultPolicy::Propagate);
    timer.ticks.tick_n(3).await;

    assert!(!timer.task.is_finished());
    assert_eq!(queue.len(), 1);

    timer.handle.close();
    timer.ticks.tick().await;
    timer.task.await.unwrap();
}

#[tokio::test]
async fn test_job_registered_mid_run_waits_a_full_interval() {
    let queue = Arc::new(HeapQueue::new());
    let mut timer = start_manual(Arc::clone(&queue), FaultPolicy::Contain);
    timer.ticks.tick_n(10).await;
    assert_eq!(timer.handle.ticks(), 10);

    let (job, mut rx) = reporting_job("every_five", 5);
    let job = Arc::new(job.starting_at(timer.handle.ticks()));
    timer
        .handle
        .queue()
        .push(Arc::clone(&job) as SharedJob, job.next_ticks());

    timer.ticks.tick().await;
    assert_eq!(job.next_ticks(), 15);

    timer.ticks.tick_n(4).await;
    assert_eq!(collect(&mut rx, 1).await, vec![15]);
}
