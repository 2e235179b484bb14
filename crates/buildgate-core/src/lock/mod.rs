//! The shared mutual-exclusion lock that builds and restores contend on.
//!
//! Two implementations are provided:
//!
//! - [`ProcessLock`]: in-process, backed by a single atomic holder slot
//! - [`FileLock`]: cross-process, backed by an `fs2` advisory lock on
//!   `<dir>/restore.lock` that records the holder's PID
//!
//! Both hand out a [`LockToken`] on success. Releasing or dropping the token
//! frees the lock; releasing it twice is a no-op.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use buildgate_core::lock::{MutualExclusionLock, ProcessLock};
//!
//! let lock = ProcessLock::new();
//! let mut token = lock.try_acquire(Duration::ZERO)?.ok_or("lock busy")?;
//! assert!(lock.is_held());
//! token.release();
//! assert!(!lock.is_held());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod file;
mod process;
pub mod types;

pub use file::{FileLock, LOCK_FILE_NAME};
pub use process::ProcessLock;
pub use types::{IoErrorKind, LockError, LockToken, MutualExclusionLock, SharedLock};
