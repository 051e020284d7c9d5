//! Configuration type definitions.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::execution::Dispatcher;
use crate::timer::FaultPolicy;

use super::error::ConfigError;

/// Default tick interval in milliseconds.
pub const DEFAULT_INTERVAL_MS: u64 = 100;

/// Timer configuration (tickloop.yaml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    /// Wall-clock length of one tick in milliseconds.
    pub interval_ms: u64,
    /// What happens when a job's check-and-run panics.
    pub fault_policy: FaultPolicy,
    /// Maximum job bodies executing at once (None = unlimited).
    ///
    /// Applied through [`TimerConfig::dispatcher`]; the timer loop itself
    /// never runs job bodies.
    pub max_concurrent_runs: Option<usize>,
    /// Start the timer stopped instead of running.
    pub start_stopped: bool,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
            fault_policy: FaultPolicy::default(),
            max_concurrent_runs: None,
            start_stopped: false,
        }
    }
}

impl TimerConfig {
    /// Get the tick interval as a Duration.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Build the dispatcher jobs should run their bodies through.
    pub fn dispatcher(&self) -> Dispatcher {
        match self.max_concurrent_runs {
            Some(max) => Dispatcher::with_concurrency(max),
            None => Dispatcher::unbounded(),
        }
    }

    /// Check the configuration for values the timer cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_ms == 0 {
            return Err(ConfigError::InvalidConfig(
                "interval_ms must be greater than zero".into(),
            ));
        }

        // A zero limit would leave every job run waiting forever
        if self.max_concurrent_runs == Some(0) {
            return Err(ConfigError::InvalidConfig(
                "max_concurrent_runs cannot be zero".into(),
            ));
        }

        Ok(())
    }
}
