//! Job execution.
//!
//! This module provides the dispatch boundary that runs job bodies off the
//! scheduling task, and the interval job built on top of it.

mod dispatch;
mod interval;

pub use dispatch::{Dispatcher, RunOutcome};
pub use interval::{IntervalJob, JobError};
