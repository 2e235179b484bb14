//! Configuration merging logic (Immutable functional pattern)
//!
//! A layer overrides exactly the fields it sets. Lists are replaced, not
//! appended: a project `restore.command` replaces the global one.

use super::types::{
    Config, ConfigLayer, GateConfig, GateLayer, LockConfig, LockLayer, RestoreConfig, RestoreLayer,
};

impl Config {
    /// Apply `layer` over this config (layer takes precedence) - immutable pattern
    pub fn merge(self, layer: ConfigLayer) -> Self {
        Self {
            lock: self.lock.merge(layer.lock),
            gate: self.gate.merge(layer.gate),
            restore: self.restore.merge(layer.restore),
        }
    }
}

impl LockConfig {
    fn merge(self, layer: LockLayer) -> Self {
        Self {
            kind: layer.kind.unwrap_or(self.kind),
            dir: layer.dir.unwrap_or(self.dir),
        }
    }
}

impl GateConfig {
    fn merge(self, layer: GateLayer) -> Self {
        Self {
            poll_interval_ms: layer.poll_interval_ms.unwrap_or(self.poll_interval_ms),
            max_wait_ms: layer.max_wait_ms.unwrap_or(self.max_wait_ms),
        }
    }
}

impl RestoreConfig {
    fn merge(self, layer: RestoreLayer) -> Self {
        Self {
            on_build: layer.on_build.unwrap_or(self.on_build),
            command: layer.command.unwrap_or(self.command),
            lock_timeout_ms: layer.lock_timeout_ms.unwrap_or(self.lock_timeout_ms),
            lock_poll_ms: layer.lock_poll_ms.unwrap_or(self.lock_poll_ms),
        }
    }
}
