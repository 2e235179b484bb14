//! Default configuration values

use std::path::PathBuf;

use super::types::{GateConfig, LockConfig, LockKind, RestoreConfig};

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            kind: LockKind::File,
            dir: PathBuf::from(".buildgate/locks"),
        }
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 250,
            max_wait_ms: 300_000,
        }
    }
}

impl Default for RestoreConfig {
    fn default() -> Self {
        Self {
            on_build: true,
            command: vec!["cargo".to_string(), "fetch".to_string()],
            lock_timeout_ms: 60_000,
            lock_poll_ms: 100,
        }
    }
}
