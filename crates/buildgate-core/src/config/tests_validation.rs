//! Validation-focused tests for configuration

use crate::config::Config;
use crate::Error;

#[test]
fn test_defaults_are_valid() {
    assert!(Config::default().validate().is_ok());
}

#[test]
fn test_zero_poll_interval_rejected() {
    let mut config = Config::default();
    config.gate.poll_interval_ms = 0;
    assert!(matches!(config.validate(), Err(Error::Validation(_))));
}

#[test]
fn test_poll_interval_must_be_below_max_wait() {
    let mut config = Config::default();
    config.gate.poll_interval_ms = 1_000;
    config.gate.max_wait_ms = 1_000;
    assert!(matches!(config.validate(), Err(Error::Validation(_))));

    config.gate.max_wait_ms = 1_001;
    assert!(config.validate().is_ok());
}

#[test]
fn test_restore_lock_poll_must_be_below_timeout() {
    let mut config = Config::default();
    config.restore.lock_poll_ms = 5_000;
    config.restore.lock_timeout_ms = 100;
    assert!(matches!(config.validate(), Err(Error::Validation(_))));
}

#[test]
fn test_empty_restore_command_rejected() {
    let mut config = Config::default();
    config.restore.command = Vec::new();
    assert!(matches!(config.validate(), Err(Error::Validation(_))));

    config.restore.command = vec![" ".to_string()];
    assert!(matches!(config.validate(), Err(Error::Validation(_))));
}

#[test]
fn test_effective_durations() {
    let config = Config::default();
    assert_eq!(config.poll_interval().as_millis(), 250);
    assert_eq!(config.max_wait().as_secs(), 300);
    assert_eq!(config.worker_settings().lock_timeout.as_secs(), 60);
}
