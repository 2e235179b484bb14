//! Lock contract, ownership token and lock errors.

use std::{fmt, io, path::PathBuf, sync::Arc, time::Duration};

use thiserror::Error;

/// Failures of the lock plumbing itself.
///
/// Contention is never one of these: a busy lock is `Ok(None)` from
/// [`MutualExclusionLock::try_acquire`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LockError {
    /// Lock directory could not be created
    #[error("failed to create lock directory at {path}: {source}")]
    LockDirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: IoErrorKind,
    },

    /// Lock file could not be opened or created
    #[error("failed to open lock file at {path}: {source}")]
    LockFileOpenFailed {
        path: PathBuf,
        #[source]
        source: IoErrorKind,
    },

    /// Failed to read PID from lock file
    #[error("failed to read PID from lock file: {source}")]
    PidReadFailed {
        #[source]
        source: IoErrorKind,
    },

    /// Lock file contains invalid PID data
    #[error("invalid PID in lock file: '{raw}'")]
    InvalidPid { raw: String },

    /// Locking, unlocking or writing the holder record failed
    #[error("lock operation failed: {source}")]
    LockOperationFailed {
        #[source]
        source: IoErrorKind,
    },
}

/// IO error kinds (cloneable, no source chain issues)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IoErrorKind {
    NotFound,
    PermissionDenied,
    WouldBlock,
    Interrupted,
    Other(String),
}

impl fmt::Display for IoErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::PermissionDenied => write!(f, "permission denied"),
            Self::WouldBlock => write!(f, "would block"),
            Self::Interrupted => write!(f, "interrupted"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for IoErrorKind {}

impl From<io::Error> for IoErrorKind {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            io::ErrorKind::WouldBlock => Self::WouldBlock,
            io::ErrorKind::Interrupted => Self::Interrupted,
            _ => Self::Other(err.to_string()),
        }
    }
}

/// Proof of lock ownership.
///
/// Releasing frees the lock for the next contender. [`LockToken::release`] is
/// idempotent and dropping an unreleased token releases it, so the lock is
/// freed even when the owner unwinds.
pub struct LockToken {
    holder: u64,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl LockToken {
    /// Wrap a release action into a token.
    ///
    /// `holder` identifies the acquisition for diagnostics; `release` runs at
    /// most once.
    pub fn new(holder: u64, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            holder,
            release: Some(Box::new(release)),
        }
    }

    pub const fn holder(&self) -> u64 {
        self.holder
    }

    pub const fn is_released(&self) -> bool {
        self.release.is_none()
    }

    /// Release the lock. Calling this again is a no-op.
    pub fn release(&mut self) {
        if let Some(release) = self.release.take() {
            tracing::trace!(holder = self.holder, "releasing lock token");
            release();
        }
    }
}

impl Drop for LockToken {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for LockToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockToken")
            .field("holder", &self.holder)
            .field("released", &self.is_released())
            .finish()
    }
}

/// A process-wide exclusive lock.
///
/// The lock is not reentrant: a holder asking again is refused like anyone
/// else.
pub trait MutualExclusionLock: Send + Sync {
    /// Whether anyone currently holds the lock. Never blocks.
    fn is_held(&self) -> bool;

    /// Try to take the lock, waiting at most `timeout`.
    ///
    /// `Duration::ZERO` makes exactly one attempt. `Ok(None)` means the lock
    /// stayed busy for the whole window.
    fn try_acquire(&self, timeout: Duration) -> Result<Option<LockToken>, LockError>;
}

/// Shared handle to whichever lock the host composed.
pub type SharedLock = Arc<dyn MutualExclusionLock>;

impl<L: MutualExclusionLock + ?Sized> MutualExclusionLock for Arc<L> {
    fn is_held(&self) -> bool {
        (**self).is_held()
    }

    fn try_acquire(&self, timeout: Duration) -> Result<Option<LockToken>, LockError> {
        (**self).try_acquire(timeout)
    }
}
