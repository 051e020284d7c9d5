//! Timer loop for tick-driven job scheduling.
//!
//! This module provides the background loop that advances a logical tick
//! counter on every firing of a tick source and drains due jobs from the
//! shared queue.

mod drain;
mod engine;
mod handle;
mod tick_source;
mod types;

pub(crate) use drain::panic_message;
pub use drain::{DrainOutcome, drain};
pub use engine::{Firing, Timer};
pub use handle::TimerHandle;
pub use tick_source::{IntervalTickSource, TickSource};
pub use types::{FaultPolicy, TimerError};
