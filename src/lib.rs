//! tickloop - a virtual-clock job timer.
//!
//! A [`Timer`] counts ticks of a fixed-interval clock. On every tick, while
//! running, it drains the jobs whose next due tick has been reached from a
//! min-priority [`JobQueue`], runs them, and puts them back under their new
//! due tick unless they closed.

pub mod config;
pub mod core;
pub mod execution;
pub mod testing;
pub mod timer;

pub use crate::config::{ConfigError, TimerConfig, YamlLoader};
pub use crate::core::job::{SharedJob, TickJob};
pub use crate::core::queue::{HeapQueue, JobQueue};
pub use crate::core::status::{AtomicTimerStatus, JobStatus, TimerStatus};
pub use crate::core::types::JobId;
pub use crate::execution::{Dispatcher, IntervalJob, JobError, RunOutcome};
pub use crate::timer::{
    DrainOutcome, FaultPolicy, Firing, IntervalTickSource, TickSource, Timer, TimerError,
    TimerHandle, drain,
};
