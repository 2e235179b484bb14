//! Crate-wide error type.
//!
//! Errors fall into four exit-code buckets:
//!
//! - **Validation**: bad input or configuration (exit code 1)
//! - **System**: IO and lock plumbing (exit code 2)
//! - **Contention**: gave up waiting for the restore lock (exit code 3)
//! - **Execution**: the build or restore itself failed (exit code 4)
//!
//! Note that the gate never produces any of these: contention at the gate is
//! a `delay = true` answer, not an error.

use thiserror::Error;

use crate::lock::LockError;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// Configuration file or environment override is invalid
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Input could not be parsed
    #[error("parse error: {0}")]
    ParseError(String),

    /// Input parsed but is not acceptable
    #[error("validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error(transparent)]
    Lock(#[from] LockError),

    /// The orchestrator stopped polling the gate
    #[error("gave up waiting for the restore lock after {waited_ms} ms")]
    GateTimeout { waited_ms: u64 },

    #[error("restore failed: {0}")]
    RestoreFailed(String),

    #[error("build failed: {0}")]
    BuildFailed(String),
}

impl Error {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    pub fn restore_failed(msg: impl Into<String>) -> Self {
        Self::RestoreFailed(msg.into())
    }

    pub fn build_failed(msg: impl Into<String>) -> Self {
        Self::BuildFailed(msg.into())
    }

    /// Returns the process exit code for this error.
    ///
    /// - 1: validation, parse or configuration problems
    /// - 2: IO and lock plumbing failures
    /// - 3: gave up waiting for the lock
    /// - 4: the build or restore command failed
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidConfig(_) | Self::ParseError(_) | Self::Validation(_) => 1,
            Self::Io(_) | Self::Lock(_) => 2,
            Self::GateTimeout { .. } => 3,
            Self::RestoreFailed(_) | Self::BuildFailed(_) => 4,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::io_error(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::parse_error(format!("Failed to parse config: {err}"))
    }
}
