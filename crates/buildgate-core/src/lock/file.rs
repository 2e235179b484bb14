//! Cross-process lock on a file in a lock directory.
//!
//! The holder takes an exclusive `fs2` lock on `<dir>/restore.lock` and
//! writes its PID into it. The OS drops the lock when the holder's file
//! handle closes, including when the holder process dies, so there is no
//! stale lock to clean up. The file itself is never removed: unlinking a
//! locked file would let a second contender lock a fresh inode.

use std::{
    fs::{self, File, OpenOptions},
    io::{self, Read, Write},
    path::{Path, PathBuf},
    thread,
    time::{Duration, Instant},
};

use fs2::FileExt;

use super::types::{IoErrorKind, LockError, LockToken, MutualExclusionLock};

/// Name of the lock file inside the lock directory.
pub const LOCK_FILE_NAME: &str = "restore.lock";

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Create lock directory if it doesn't exist.
fn create_lock_directory(lock_dir: &Path) -> Result<(), LockError> {
    fs::create_dir_all(lock_dir).map_err(|e| LockError::LockDirectoryCreationFailed {
        path: lock_dir.to_path_buf(),
        source: e.into(),
    })
}

/// Attempt a non-blocking exclusive lock on `file`.
fn try_lock_file(file: &File) -> Result<(), LockError> {
    file.try_lock_exclusive().map_err(|err| {
        // fs2 reports contention with the platform's own error on some targets
        if err.kind() == io::ErrorKind::WouldBlock
            || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
        {
            LockError::LockOperationFailed {
                source: IoErrorKind::WouldBlock,
            }
        } else {
            LockError::LockOperationFailed { source: err.into() }
        }
    })
}

fn is_contended(err: &LockError) -> bool {
    matches!(
        err,
        LockError::LockOperationFailed {
            source: IoErrorKind::WouldBlock
        }
    )
}

/// Parse PID from lock file content. Empty content means nobody is recorded.
fn parse_pid(content: &str) -> Result<Option<u32>, LockError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<u32>()
        .map(Some)
        .map_err(|_| LockError::InvalidPid {
            raw: content.to_string(),
        })
}

/// Write current PID to lock file.
fn write_pid_to_lock(file: &mut File) -> Result<(), LockError> {
    file.set_len(0)
        .and_then(|()| file.write_all(std::process::id().to_string().as_bytes()))
        .and_then(|()| file.flush())
        .map_err(|e| LockError::LockOperationFailed { source: e.into() })
}

fn release_file(file: &File, lock_path: &Path) {
    if let Err(e) = file.set_len(0) {
        tracing::warn!(path = %lock_path.display(), "failed to clear holder PID: {e}");
    }
    if let Err(e) = FileExt::unlock(file) {
        // Closing the handle below still drops the lock
        tracing::warn!(path = %lock_path.display(), "failed to unlock restore lock: {e}");
    }
}

/// Exclusive lock shared between processes through a lock file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLock {
    lock_path: PathBuf,
    poll_interval: Duration,
}

impl FileLock {
    /// Create a lock rooted in `lock_dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// - `LockDirectoryCreationFailed` if the directory cannot be created
    pub fn new(lock_dir: impl Into<PathBuf>) -> Result<Self, LockError> {
        let lock_dir = lock_dir.into();
        create_lock_directory(&lock_dir).map(|()| Self {
            lock_path: lock_dir.join(LOCK_FILE_NAME),
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    /// Interval between attempts when acquiring with a non-zero timeout.
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn path(&self) -> &Path {
        &self.lock_path
    }

    /// PID recorded by the current holder, if any.
    ///
    /// A missing or empty lock file yields `None`.
    pub fn holder_pid(&self) -> Result<Option<u32>, LockError> {
        let mut file = match File::open(&self.lock_path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(LockError::PidReadFailed { source: e.into() }),
        };

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| LockError::PidReadFailed { source: e.into() })?;

        parse_pid(&content)
    }

    fn open(&self) -> Result<File, LockError> {
        // Never truncate on open: the holder's PID must survive contenders
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_path)
            .map_err(|e| LockError::LockFileOpenFailed {
                path: self.lock_path.clone(),
                source: e.into(),
            })
    }

    /// Single attempt to acquire the lock.
    fn try_acquire_once(&self) -> Result<Option<LockToken>, LockError> {
        let mut file = self.open()?;

        match try_lock_file(&file) {
            Ok(()) => {
                if let Err(e) = write_pid_to_lock(&mut file) {
                    let _ = FileExt::unlock(&file);
                    return Err(e);
                }

                let pid = std::process::id();
                let lock_path = self.lock_path.clone();
                tracing::debug!(path = %lock_path.display(), pid, "restore lock acquired");
                Ok(Some(LockToken::new(u64::from(pid), move || {
                    release_file(&file, &lock_path);
                })))
            }
            Err(e) if is_contended(&e) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl MutualExclusionLock for FileLock {
    /// Probes the lock with a second handle.
    ///
    /// The probe holds the lock for an instant when it is free, so a
    /// concurrent zero-timeout contender may see it as busy and poll again.
    fn is_held(&self) -> bool {
        let probe = match self.open() {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!("cannot probe restore lock: {e}");
                return false;
            }
        };

        match try_lock_file(&probe) {
            Ok(()) => {
                let _ = FileExt::unlock(&probe);
                false
            }
            Err(e) if is_contended(&e) => true,
            Err(e) => {
                tracing::warn!("cannot probe restore lock: {e}");
                false
            }
        }
    }

    fn try_acquire(&self, timeout: Duration) -> Result<Option<LockToken>, LockError> {
        let start = Instant::now();

        loop {
            if let Some(token) = self.try_acquire_once()? {
                return Ok(Some(token));
            }

            let elapsed = start.elapsed();
            if elapsed >= timeout {
                return Ok(None);
            }
            thread::sleep(self.poll_interval.min(timeout - elapsed));
        }
    }
}
