//! Configuration type definitions
//!
//! `Config` is the effective configuration; `ConfigLayer` is what a single
//! file contributes, with every field optional so that a layer only
//! overrides what it actually sets.

use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::restore::WorkerSettings;

/// Which lock implementation guards restores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LockKind {
    /// Lock file shared by every process using the same lock directory
    File,
    /// Lock private to the current process
    Process,
}

// ═══════════════════════════════════════════════════════════════════════════
// EFFECTIVE CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub lock: LockConfig,
    pub gate: GateConfig,
    pub restore: RestoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LockConfig {
    pub kind: LockKind,
    /// Lock directory; relative paths are resolved against the project root
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GateConfig {
    pub poll_interval_ms: u64,
    pub max_wait_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RestoreConfig {
    /// Restore automatically when a build starts
    pub on_build: bool,
    pub command: Vec<String>,
    pub lock_timeout_ms: u64,
    pub lock_poll_ms: u64,
}

impl Config {
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.gate.poll_interval_ms)
    }

    pub const fn max_wait(&self) -> Duration {
        Duration::from_millis(self.gate.max_wait_ms)
    }

    pub const fn worker_settings(&self) -> WorkerSettings {
        WorkerSettings {
            lock_timeout: Duration::from_millis(self.restore.lock_timeout_ms),
            lock_poll: Duration::from_millis(self.restore.lock_poll_ms),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// FILE LAYERS
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
    pub lock: LockLayer,
    pub gate: GateLayer,
    pub restore: RestoreLayer,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LockLayer {
    pub kind: Option<LockKind>,
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct GateLayer {
    pub poll_interval_ms: Option<u64>,
    pub max_wait_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RestoreLayer {
    pub on_build: Option<bool>,
    pub command: Option<Vec<String>>,
    pub lock_timeout_ms: Option<u64>,
    pub lock_poll_ms: Option<u64>,
}
