//! Command implementations

pub mod build;
pub mod config;
pub mod restore;
pub mod status;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use buildgate_core::{load_config_from, Config, FileLock, LockKind, ProcessLock, SharedLock};

/// Effective configuration for the project in the current directory.
pub(crate) struct Project {
    pub root: PathBuf,
    pub config: Config,
}

impl Project {
    pub(crate) fn load() -> Result<Self> {
        let root = std::env::current_dir().context("Failed to get current directory")?;
        // Keep the core error as the root so its exit code survives
        let config = load_config_from(&root).map_err(anyhow::Error::new)?;
        Ok(Self { root, config })
    }

    /// Open the lock builds and restores contend on.
    pub(crate) fn open_lock(&self) -> Result<SharedLock> {
        let lock: SharedLock = match self.config.lock.kind {
            LockKind::File => Arc::new(
                FileLock::new(&self.config.lock.dir)
                    .map_err(buildgate_core::Error::from)?
                    .with_poll_interval(self.config.worker_settings().lock_poll),
            ),
            LockKind::Process => Arc::new(ProcessLock::new()),
        };
        Ok(lock)
    }
}
