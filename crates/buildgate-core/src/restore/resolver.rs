//! The restore computation itself, behind a trait.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;

use super::request::RestoreRequest;
use crate::{Error, Result};

/// Set to `1` for forced restores when running a [`CommandResolver`].
pub const RESTORE_FORCE_ENV: &str = "BUILDGATE_RESTORE_FORCE";

/// Performs dependency resolution. Called with the restore lock held.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Resolve dependencies, returning a short description of the result.
    async fn resolve(&self, request: &RestoreRequest) -> Result<String>;
}

/// Runs an external command such as `cargo fetch` as the restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResolver {
    program: String,
    args: Vec<String>,
    working_dir: PathBuf,
}

impl CommandResolver {
    /// Build a resolver from `[program, args...]`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `command` is empty or the program name is blank.
    pub fn new(command: &[String], working_dir: impl Into<PathBuf>) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| Error::validation("restore command cannot be empty"))?;

        if program.trim().is_empty() {
            return Err(Error::validation("restore command program cannot be blank"));
        }

        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            working_dir: working_dir.into(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl Resolver for CommandResolver {
    async fn resolve(&self, request: &RestoreRequest) -> Result<String> {
        tracing::info!(
            program = %self.program,
            trigger = %request.trigger,
            force = request.force,
            "running restore command"
        );

        let output = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.working_dir)
            .env(RESTORE_FORCE_ENV, if request.force { "1" } else { "0" })
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| Error::restore_failed(format!("failed to run {}: {e}", self.program)))?;

        if output.status.success() {
            Ok(format!("{} {}", self.program, self.args.join(" "))
                .trim_end()
                .to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(Error::restore_failed(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )))
        }
    }
}
