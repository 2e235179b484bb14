//! The delay-or-proceed gate in front of a build batch.
//!
//! # State machine
//!
//! ```text
//!              query_delay() acquires
//!   Unlocked ─────────────────────────▶ Locked ──┐ query_delay() -> false
//!      ▲                                  │  ◀───┘ (no new attempt)
//!      └──────── on_batch_end() ──────────┘
//! ```
//!
//! The gate never waits. `query_delay` either takes the lock with a
//! zero-duration attempt or answers `true`, and the orchestrator decides when
//! to ask again. The token taken by `query_delay` is released only by
//! `on_batch_end`.

use std::time::Duration;

use strum::Display;

use crate::{
    lifecycle::{BuildLifecycle, BuildLifecyclePhase},
    lock::{LockToken, MutualExclusionLock},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum GateState {
    Unlocked,
    Locked,
}

impl GateState {
    pub const fn all_states() -> &'static [Self] {
        &[Self::Unlocked, Self::Locked]
    }

    /// Every state can be left again; the gate lives as long as its host.
    pub fn valid_next_states(self) -> Vec<Self> {
        match self {
            Self::Unlocked => vec![Self::Unlocked, Self::Locked],
            Self::Locked => vec![Self::Locked, Self::Unlocked],
        }
    }

    pub const fn is_terminal(self) -> bool {
        false
    }
}

/// Gate holding at most one token of the shared lock.
#[derive(Debug)]
pub struct LockGate<L> {
    lock: L,
    token: Option<LockToken>,
}

impl<L: MutualExclusionLock> LockGate<L> {
    pub const fn new(lock: L) -> Self {
        Self { lock, token: None }
    }

    pub const fn state(&self) -> GateState {
        if self.token.is_some() {
            GateState::Locked
        } else {
            GateState::Unlocked
        }
    }

    pub const fn lock(&self) -> &L {
        &self.lock
    }

    /// Whether the batch has to wait.
    ///
    /// - Already holding a token: `false`, without touching the lock again.
    /// - Lock held by someone else: `true`, without attempting to acquire.
    /// - Otherwise one zero-timeout acquisition: `false` on success, `true`
    ///   on failure. Lock plumbing errors are logged and also answer `true`.
    pub fn query_delay(&mut self) -> bool {
        let phase = BuildLifecyclePhase::QueryDelayFirstAction;

        if self.token.is_some() {
            tracing::trace!(%phase, "gate already locked, proceeding");
            return false;
        }

        if self.lock.is_held() {
            tracing::debug!(%phase, "restore lock held elsewhere, delaying batch");
            return true;
        }

        match self.lock.try_acquire(Duration::ZERO) {
            Ok(Some(token)) => {
                tracing::debug!(%phase, holder = token.holder(), "gate locked");
                self.token = Some(token);
                false
            }
            Ok(None) => {
                tracing::debug!(%phase, "lost the race for the restore lock, delaying batch");
                true
            }
            Err(e) => {
                tracing::warn!(%phase, "restore lock unavailable, delaying batch: {e}");
                true
            }
        }
    }

    pub fn on_batch_begin(&mut self) {}

    /// Release the held token, if any. Safe to call in any state.
    pub fn on_batch_end(&mut self) {
        if let Some(mut token) = self.token.take() {
            token.release();
            tracing::debug!(
                phase = %BuildLifecyclePhase::EndLastAction,
                holder = token.holder(),
                "gate unlocked"
            );
        }
    }

    pub fn on_action_begin(&mut self, _action_id: u32) {}

    pub fn on_action_end(&mut self, _action_id: u32) {}
}

impl<L: MutualExclusionLock> BuildLifecycle for LockGate<L> {
    fn query_delay_first_action(&mut self) -> bool {
        self.query_delay()
    }

    fn begin_first_action(&mut self) {
        self.on_batch_begin();
    }

    fn end_last_action(&mut self) {
        self.on_batch_end();
    }

    fn begin_action(&mut self, action_id: u32) {
        self.on_action_begin(action_id);
    }

    fn end_action(&mut self, action_id: u32) {
        self.on_action_end(action_id);
    }
}
