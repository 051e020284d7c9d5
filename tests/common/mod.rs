//! Common test utilities shared across integration tests.

use std::sync::Arc;
use std::time::Duration;
use tickloop::testing::{ManualTickSource, TickController};
use tickloop::{FaultPolicy, JobQueue, Timer, TimerHandle};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A timer running on a background task, fired by hand.
pub struct ManualTimer<Q: JobQueue> {
    pub handle: TimerHandle<Q>,
    pub task: JoinHandle<()>,
    pub ticks: TickController,
}

/// Start a timer over `queue` driven by a [`ManualTickSource`].
pub fn start_manual<Q: JobQueue + 'static>(queue: Arc<Q>, policy: FaultPolicy) -> ManualTimer<Q> {
    let (source, ticks) = ManualTickSource::new();
    let (handle, task) = Timer::with_tick_source(queue, source)
        .with_fault_policy(policy)
        .start();
    ManualTimer {
        handle,
        task,
        ticks,
    }
}

/// Receive exactly `n` values, panicking if they do not all arrive in time.
///
/// Dispatched job bodies report on their own tasks, so arrival order is not
/// guaranteed; the values are returned sorted.
pub async fn collect(rx: &mut mpsc::UnboundedReceiver<i64>, n: usize) -> Vec<i64> {
    let mut values = Vec::with_capacity(n);
    for _ in 0..n {
        let value = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("timed out waiting for a job run")
            .expect("job channel closed");
        values.push(value);
    }
    values.sort_unstable();
    values
}
