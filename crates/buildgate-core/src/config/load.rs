//! Configuration loading from files and environment (Immutable functional pattern)
//!
//! This module handles loading configuration from:
//! 1. Built-in defaults
//! 2. Global config: ~/.config/buildgate/config.toml
//! 3. Project config: .buildgate/config.toml
//! 4. Environment variables: BUILDGATE_*
//!
//! All operations return new instances rather than mutating in place.

use std::path::{Path, PathBuf};

use super::types::{Config, ConfigLayer, LockKind};
use crate::{consent::parse_flag, Error, Result};

// ═══════════════════════════════════════════════════════════════════════════
// PUBLIC API
// ═══════════════════════════════════════════════════════════════════════════

/// Load configuration for the project in the current directory.
///
/// # Errors
///
/// Returns error if:
/// - Current directory cannot be determined
/// - Config file is malformed TOML
/// - Config values fail validation
pub fn load_config() -> Result<Config> {
    let root = std::env::current_dir()
        .map_err(|e| Error::io_error(format!("Failed to get current directory: {e}")))?;
    load_config_from(&root)
}

/// Load configuration for the project rooted at `project_root`.
///
/// # Errors
///
/// Same as [`load_config`].
pub fn load_config_from(project_root: &Path) -> Result<Config> {
    // 1. Start with built-in defaults
    let config = Config::default();

    // 2. Load global config if exists
    let config = match global_config_path() {
        Some(global_path) if global_path.is_file() => config.merge(load_toml_file(&global_path)?),
        _ => config,
    };

    // 3. Load project config if exists
    let project_path = project_config_path(project_root);
    let config = if project_path.exists() {
        config.merge(load_toml_file(&project_path)?)
    } else {
        config
    };

    // 4. Apply environment variable overrides
    let config = config.apply_env_vars()?;

    // 5. Anchor relative paths, then validate
    let config = config.resolve_paths(project_root);
    config.validate()?;

    Ok(config)
}

// ═══════════════════════════════════════════════════════════════════════════
// PATH HELPERS
// ═══════════════════════════════════════════════════════════════════════════

/// Get path to global config file
pub fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "buildgate")
        .map(|proj_dirs| proj_dirs.config_dir().join("config.toml"))
}

/// Get path to project config file
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".buildgate").join("config.toml")
}

/// Load a TOML file into a config layer
///
/// # Errors
///
/// Returns error if:
/// - File cannot be read
/// - Path is a directory instead of a file
/// - TOML is malformed or names unknown keys
pub fn load_toml_file(path: &Path) -> Result<ConfigLayer> {
    if path.is_dir() {
        return Err(Error::io_error(format!(
            "Config path is a directory, not a file: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::io_error(format!(
            "Failed to read config file {}: {e}",
            path.display()
        ))
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::parse_error(format!(
            "Failed to parse config file {}: {e}",
            path.display()
        ))
    })
}

// ═══════════════════════════════════════════════════════════════════════════
// ENVIRONMENT VARIABLE OVERRIDES (Immutable pattern)
// ═══════════════════════════════════════════════════════════════════════════

fn env_u64(name: &str) -> Result<Option<u64>> {
    std::env::var(name).ok().map_or(Ok(None), |value| {
        value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::invalid_config(format!("Invalid {name} value: {e}")))
    })
}

impl Config {
    /// Apply environment variable overrides - immutable pattern
    ///
    /// # Errors
    ///
    /// Returns error if environment variable values are invalid
    pub fn apply_env_vars(mut self) -> Result<Self> {
        // BUILDGATE_LOCK_KIND
        if let Ok(value) = std::env::var("BUILDGATE_LOCK_KIND") {
            self.lock.kind = value.parse::<LockKind>().map_err(|_| {
                Error::invalid_config(format!(
                    "Invalid BUILDGATE_LOCK_KIND value: {value:?} (expected file or process)"
                ))
            })?;
        }

        // BUILDGATE_LOCK_DIR
        if let Ok(value) = std::env::var("BUILDGATE_LOCK_DIR") {
            if value.trim().is_empty() {
                return Err(Error::invalid_config(
                    "BUILDGATE_LOCK_DIR cannot be empty - unset the variable or provide a path",
                ));
            }
            self.lock.dir = PathBuf::from(value);
        }

        // BUILDGATE_GATE_POLL_MS
        if let Some(value) = env_u64("BUILDGATE_GATE_POLL_MS")? {
            self.gate.poll_interval_ms = value;
        }

        // BUILDGATE_GATE_MAX_WAIT_MS
        if let Some(value) = env_u64("BUILDGATE_GATE_MAX_WAIT_MS")? {
            self.gate.max_wait_ms = value;
        }

        // BUILDGATE_RESTORE_ON_BUILD
        if let Ok(value) = std::env::var("BUILDGATE_RESTORE_ON_BUILD") {
            self.restore.on_build = parse_flag(&value).ok_or_else(|| {
                Error::invalid_config(format!(
                    "Invalid BUILDGATE_RESTORE_ON_BUILD value: {value:?} (expected true or false)"
                ))
            })?;
        }

        // BUILDGATE_RESTORE_COMMAND (whitespace separated)
        if let Ok(value) = std::env::var("BUILDGATE_RESTORE_COMMAND") {
            self.restore.command = value.split_whitespace().map(String::from).collect();
        }

        // BUILDGATE_RESTORE_LOCK_TIMEOUT_MS
        if let Some(value) = env_u64("BUILDGATE_RESTORE_LOCK_TIMEOUT_MS")? {
            self.restore.lock_timeout_ms = value;
        }

        // BUILDGATE_RESTORE_LOCK_POLL_MS
        if let Some(value) = env_u64("BUILDGATE_RESTORE_LOCK_POLL_MS")? {
            self.restore.lock_poll_ms = value;
        }

        Ok(self)
    }

    /// Anchor a relative lock directory at `project_root` - immutable pattern
    pub fn resolve_paths(mut self, project_root: &Path) -> Self {
        if self.lock.dir.is_relative() {
            self.lock.dir = project_root.join(&self.lock.dir);
        }
        self
    }
}
