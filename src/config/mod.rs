//! Configuration loading and parsing.
//!
//! This module provides YAML-based configuration for the timer.

mod error;
mod types;
mod yaml;

pub use error::ConfigError;
pub use types::{DEFAULT_INTERVAL_MS, TimerConfig};
pub use yaml::YamlLoader;
