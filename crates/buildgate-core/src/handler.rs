//! Build lifecycle handler that keeps restores and builds apart.

use crate::{
    classifier::{classify, BuildEvent, Decision},
    consent::ConsentPolicy,
    gate::{GateState, LockGate},
    lifecycle::{BuildEventListener, BuildLifecycle},
    lock::MutualExclusionLock,
    restore::{RestoreRequest, RestoreWorker},
};

/// Composes the gate with the restore worker and the consent source.
///
/// Register it with the orchestrator for both batch checkpoints and
/// build-begin notifications. The lock handed to the gate must be the same
/// lock the worker restores under.
#[derive(Debug)]
pub struct RestoreBuildHandler<L, W, C> {
    gate: LockGate<L>,
    worker: W,
    consent: C,
}

impl<L, W, C> RestoreBuildHandler<L, W, C>
where
    L: MutualExclusionLock,
    W: RestoreWorker,
    C: ConsentPolicy,
{
    pub const fn new(lock: L, worker: W, consent: C) -> Self {
        Self {
            gate: LockGate::new(lock),
            worker,
            consent,
        }
    }

    pub const fn gate_state(&self) -> GateState {
        self.gate.state()
    }

    pub const fn worker(&self) -> &W {
        &self.worker
    }

    fn apply(&self, decision: Decision) {
        match decision {
            Decision::Skip => {}
            Decision::InvalidateCache => self.worker.clear_cache(),
            Decision::TriggerRestore { force } => {
                self.worker.restore(RestoreRequest::on_build(force));
            }
        }
    }
}

impl<L, W, C> BuildEventListener for RestoreBuildHandler<L, W, C>
where
    L: MutualExclusionLock,
    W: RestoreWorker,
    C: ConsentPolicy,
{
    fn on_build_begin(&mut self, event: &BuildEvent) -> Decision {
        let decision = classify(event, self.consent.is_automatic());
        tracing::info!(
            scope = %event.scope,
            action = %event.action,
            %decision,
            "build starting"
        );
        self.apply(decision);
        decision
    }
}

impl<L, W, C> BuildLifecycle for RestoreBuildHandler<L, W, C>
where
    L: MutualExclusionLock,
    W: RestoreWorker,
    C: ConsentPolicy,
{
    fn query_delay_first_action(&mut self) -> bool {
        self.gate.query_delay()
    }

    fn begin_first_action(&mut self) {
        self.gate.on_batch_begin();
    }

    fn end_last_action(&mut self) {
        self.gate.on_batch_end();
    }

    fn begin_action(&mut self, action_id: u32) {
        self.gate.on_action_begin(action_id);
    }

    fn end_action(&mut self, action_id: u32) {
        self.gate.on_action_end(action_id);
    }
}
