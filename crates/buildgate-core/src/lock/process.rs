//! In-process lock backed by a single atomic holder slot.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

use super::types::{LockError, LockToken, MutualExclusionLock};

const FREE: u64 = 0;
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Exclusive lock shared by every clone within one process.
///
/// Each acquisition gets a fresh holder id, so a stale token can never free
/// a later holder's lock.
#[derive(Debug, Clone)]
pub struct ProcessLock {
    holder: Arc<AtomicU64>,
    next_id: Arc<AtomicU64>,
    poll_interval: Duration,
}

impl ProcessLock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            holder: Arc::new(AtomicU64::new(FREE)),
            next_id: Arc::new(AtomicU64::new(1)),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Interval between attempts when acquiring with a non-zero timeout.
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Id of the current holder, if any.
    pub fn holder(&self) -> Option<u64> {
        match self.holder.load(Ordering::Acquire) {
            FREE => None,
            id => Some(id),
        }
    }

    fn try_acquire_once(&self) -> Option<LockToken> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.holder
            .compare_exchange(FREE, id, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| {
                let slot = Arc::clone(&self.holder);
                LockToken::new(id, move || {
                    // Only clears the slot if we still own it
                    let _ = slot.compare_exchange(id, FREE, Ordering::AcqRel, Ordering::Acquire);
                })
            })
    }
}

impl Default for ProcessLock {
    fn default() -> Self {
        Self::new()
    }
}

impl MutualExclusionLock for ProcessLock {
    fn is_held(&self) -> bool {
        self.holder.load(Ordering::Acquire) != FREE
    }

    fn try_acquire(&self, timeout: Duration) -> Result<Option<LockToken>, LockError> {
        let start = Instant::now();

        loop {
            if let Some(token) = self.try_acquire_once() {
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
