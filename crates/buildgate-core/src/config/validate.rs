//! Configuration validation

use super::types::Config;
use crate::{Error, Result};

impl Config {
    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any values are out of range or invalid
    pub fn validate(&self) -> Result<()> {
        if self.gate.poll_interval_ms == 0 {
            return Err(Error::validation("gate.poll_interval_ms must be > 0"));
        }

        if self.gate.max_wait_ms == 0 {
            return Err(Error::validation("gate.max_wait_ms must be > 0"));
        }

        if self.gate.poll_interval_ms >= self.gate.max_wait_ms {
            return Err(Error::validation(format!(
                "gate.poll_interval_ms ({}) must be < gate.max_wait_ms ({})",
                self.gate.poll_interval_ms, self.gate.max_wait_ms
            )));
        }

        if self.restore.lock_poll_ms == 0 || self.restore.lock_timeout_ms == 0 {
            return Err(Error::validation(
                "restore.lock_poll_ms and restore.lock_timeout_ms must be > 0",
            ));
        }

        if self.restore.lock_poll_ms >= self.restore.lock_timeout_ms {
            return Err(Error::validation(format!(
                "restore.lock_poll_ms ({}) must be < restore.lock_timeout_ms ({})",
                self.restore.lock_poll_ms, self.restore.lock_timeout_ms
            )));
        }

        if self
            .restore
            .command
            .first()
            .map_or(true, |program| program.trim().is_empty())
        {
            return Err(Error::validation(
                "restore.command must name a program, e.g. [\"cargo\", \"fetch\"]",
            ));
        }

        Ok(())
    }
}
