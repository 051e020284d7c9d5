//! Configuration integration tests.
//!
//! Tests building timers from YAML configuration files.

use std::io::Write;
use std::sync::Arc;
use tickloop::{ConfigError, HeapQueue, Timer, TimerConfig, TimerError, TimerStatus, YamlLoader};

#[tokio::test]
async fn test_timer_from_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "interval_ms: 5").unwrap();
    writeln!(file, "start_stopped: true").unwrap();

    let config = YamlLoader::load_timer_config(file.path()).unwrap();
    let timer = Timer::from_config(Arc::new(HeapQueue::new()), &config).unwrap();
    let (handle, task) = timer.start();

    assert_eq!(handle.status(), TimerStatus::Stopped);

    handle.close();
    task.await.unwrap();
}

#[test]
fn test_invalid_config_is_rejected_by_timer() {
    let config = TimerConfig {
        interval_ms: 0,
        ..Default::default()
    };

    let result = Timer::from_config(Arc::new(HeapQueue::new()), &config);
    assert!(matches!(
        result,
        Err(TimerError::Config(ConfigError::InvalidConfig(_)))
    ));
}
