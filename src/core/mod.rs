//! Core types: identifiers, statuses, the job capability, and the job queue.

pub mod job;
pub mod queue;
pub mod status;
pub mod types;
