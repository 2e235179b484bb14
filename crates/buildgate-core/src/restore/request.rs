//! Restore requests and what the worker reports about them.

use chrono::{DateTime, Utc};
use strum::Display;

/// Why a restore was asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum RestoreTrigger {
    OnBuild,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RestoreRequest {
    pub trigger: RestoreTrigger,
    /// Restore even if a memoized resolution exists
    pub force: bool,
}

impl RestoreRequest {
    pub const fn on_build(force: bool) -> Self {
        Self {
            trigger: RestoreTrigger::OnBuild,
            force,
        }
    }

    pub const fn manual(force: bool) -> Self {
        Self {
            trigger: RestoreTrigger::Manual,
            force,
        }
    }

    /// Fold a later queued request into this one.
    ///
    /// The first trigger wins; force sticks once any request asked for it.
    #[must_use]
    pub const fn coalesce(self, later: Self) -> Self {
        Self {
            trigger: self.trigger,
            force: self.force || later.force,
        }
    }
}

/// Memoized outcome of the last successful restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionSummary {
    pub request: RestoreRequest,
    pub completed_at: DateTime<Utc>,
    /// Resolver-provided description of what was resolved
    pub detail: String,
}

/// Progress of queued restores, broadcast to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreEvent {
    /// The lock is held and the resolver is running
    Started(RestoreRequest),
    /// Resolution finished and the lock has been released
    Completed(ResolutionSummary),
    /// Not forced and a memoized resolution exists
    Skipped(RestoreRequest),
    /// The resolver failed; the lock has been released
    Failed {
        request: RestoreRequest,
        message: String,
    },
    /// The lock stayed busy for the whole wait window
    TimedOut(RestoreRequest),
}
