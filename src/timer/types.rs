//! Timer type definitions.
//!
//! This module contains the error type and the fault policy for the timer.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur when building or controlling a timer.
#[derive(Debug, Error)]
pub enum TimerError {
    /// The tick interval must be positive.
    #[error("invalid tick interval: {0:?}")]
    InvalidInterval(Duration),

    /// The timer has been closed and cannot be restarted.
    #[error("timer is closed")]
    Closed,

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// What the drain does when a job's check-and-run panics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultPolicy {
    /// Catch the panic, log it, and evict the job. Other jobs keep running.
    #[default]
    Contain,
    /// Let the panic unwind the scheduling task, halting all scheduling.
    Propagate,
}
