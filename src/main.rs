//! tickloop - a virtual-clock job timer.
//!
//! Usage:
//!   tl run [--config FILE]    Run the timer with a heartbeat job until Ctrl+C
//!   tl validate <FILE>        Validate a timer configuration file

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tickloop::{
    HeapQueue, IntervalJob, JobQueue, SharedJob, TickJob, Timer, TimerConfig,
    YamlLoader,
};
use tracing::{error, info};

/// tl - A virtual-clock job timer
#[derive(Parser)]
#[command(name = "tl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the timer with a heartbeat job
    Run {
        /// Path to a timer configuration YAML file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Tick interval in milliseconds (overrides the config file)
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Run the heartbeat every N ticks
        #[arg(long, default_value = "10")]
        heartbeat_ticks: i64,

        /// Stop the heartbeat after N runs (default: unlimited)
        #[arg(long)]
        times: Option<u64>,
    },

    /// Validate a timer configuration file
    Validate {
        /// Path to the configuration YAML file
        #[arg(value_name = "FILE")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            interval_ms,
            heartbeat_ticks,
            times,
        } => {
            run_timer(config, interval_ms, heartbeat_ticks, times).await?;
        }
        Commands::Validate { config } => {
            validate_config(config)?;
        }
    }

    Ok(())
}

/// Run the timer until Ctrl+C.
async fn run_timer(
    config_path: Option<PathBuf>,
    interval_ms: Option<u64>,
    heartbeat_ticks: i64,
    times: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &config_path {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            YamlLoader::load_timer_config(path)?
        }
        None => TimerConfig::default(),
    };
    if let Some(ms) = interval_ms {
        config.interval_ms = ms;
    }

    let mut heartbeat = IntervalJob::new("heartbeat", heartbeat_ticks, |ticks| async move {
        info!(ticks, "Heartbeat");
    })?
    .with_singleton(true)
    .with_dispatcher(config.dispatcher());
    if let Some(times) = times {
        heartbeat = heartbeat.with_times(times);
    }
    let heartbeat = Arc::new(heartbeat);

    let queue = Arc::new(HeapQueue::new());
    queue.push(Arc::clone(&heartbeat) as SharedJob, heartbeat.next_ticks());

    let timer = Timer::from_config(Arc::clone(&queue), &config)?;

    info!(
        "Starting timer (interval: {}ms, heartbeat every {} ticks)...",
        config.interval_ms, heartbeat_ticks
    );
    info!("Press Ctrl+C to stop");

    let (handle, mut timer_task) = timer.start();

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down...");
            handle.close();
            timer_task.await?;
        }
        result = &mut timer_task => {
            result?;
            info!("Timer stopped");
        }
    }

    info!("Goodbye!");
    Ok(())
}

/// Validate a configuration file without running.
fn validate_config(path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    info!("Validating configuration: {}", path.display());

    match YamlLoader::load_timer_config(&path) {
        Ok(config) => {
            info!(
                "Configuration is valid: interval {}ms, fault policy {:?}, max concurrent runs {}",
                config.interval_ms,
                config.fault_policy,
                config
                    .max_concurrent_runs
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "unlimited".into())
            );
            Ok(())
        }
        Err(e) => {
            error!("Validation failed: {}", e);
            Err(e.into())
        }
    }
}
