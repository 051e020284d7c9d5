//! Fire-and-forget dispatch of job bodies.
//!
//! The `Dispatcher` is the boundary between the scheduling task and job
//! execution. It handles:
//! - Spawning each body as its own tokio task so the drain never blocks
//! - Optional concurrency limiting via semaphore
//! - Containing panics: a panicking body is logged and reported, never
//!   propagated back into the timer loop

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::timer::panic_message;

/// How a dispatched run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The body ran to completion.
    Completed,
    /// The body panicked; the panic was contained and logged.
    Panicked,
    /// The body never ran or was cancelled.
    Cancelled,
}

/// Spawns job bodies onto the tokio runtime.
#[derive(Clone, Default)]
pub struct Dispatcher {
    /// Limits concurrently executing bodies (None = unlimited).
    semaphore: Option<Arc<Semaphore>>,
}

impl Dispatcher {
    /// Create a dispatcher with no concurrency limit.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Create a dispatcher running at most `max_concurrency` bodies at once.
    ///
    /// Runs over the limit wait for a permit on their own task; dispatching
    /// itself never waits.
    pub fn with_concurrency(max_concurrency: usize) -> Self {
        Self {
            semaphore: Some(Arc::new(Semaphore::new(max_concurrency))),
        }
    }

    /// Get the number of free execution slots, if limited.
    pub fn available_permits(&self) -> Option<usize> {
        self.semaphore.as_ref().map(|s| s.available_permits())
    }

    /// Spawn `body` and call `on_finish` with its outcome once it ends.
    ///
    /// Returns `false` if there is no runtime to spawn on; `on_finish` is
    /// then called immediately with [`RunOutcome::Cancelled`].
    pub fn dispatch<F, D>(&self, job: &str, body: F, on_finish: D) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
        D: FnOnce(RunOutcome) + Send + 'static,
    {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(job = %job, "No tokio runtime available, job run dropped");
            on_finish(RunOutcome::Cancelled);
            return false;
        };

        let semaphore = self.semaphore.clone();
        let run = runtime.spawn(async move {
            let _permit = match semaphore {
                Some(semaphore) => match semaphore.acquire_owned().await {
                    Ok(permit) => Some(permit),
                    Err(_) => return,
                },
                None => None,
            };
            body.await;
        });

        let job = job.to_string();
        runtime.spawn(async move {
            let outcome = match run.await {
                Ok(()) => RunOutcome::Completed,
                Err(e) if e.is_panic() => {
                    let panic = e.into_panic();
                    tracing::error!(
                        job = %job,
                        panic = %panic_message(panic.as_ref()),
                        "Job run panicked, fault contained"
                    );
                    RunOutcome::Panicked
                }
                Err(_) => {
                    tracing::warn!(job = %job, "Job run cancelled");
                    RunOutcome::Cancelled
                }
            };
            on_finish(outcome);
        });

        true
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("available_permits", &self.available_permits())
            .finish()
    }
}
