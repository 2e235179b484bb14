//! Checkpoints a build orchestrator exposes around a batch of build steps.
//!
//! A batch looks like:
//!
//! ```text
//! on_build_begin(event)
//! query_delay_first_action()   (repeated until it answers false)
//! begin_first_action()
//!   begin_action(1) .. end_action(1)
//!   begin_action(n) .. end_action(n)
//! end_last_action()            (always, even when the build failed)
//! ```
//!
//! Callbacks are delivered serially from one logical thread, which is why
//! the checkpoint methods take `&mut self` and implementors need no internal
//! locking.

use strum::{Display, EnumIter};

use crate::classifier::{BuildEvent, Decision};

/// The checkpoint being delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum BuildLifecyclePhase {
    QueryDelayFirstAction,
    BeginFirstAction,
    EndLastAction,
    BeginAction,
    EndAction,
}

/// Batch checkpoints.
pub trait BuildLifecycle {
    /// Asked before the first action of a batch. `true` means "not yet, ask
    /// again later"; the orchestrator owns the retry cadence.
    fn query_delay_first_action(&mut self) -> bool;

    fn begin_first_action(&mut self);

    /// The batch is over, successfully or not.
    fn end_last_action(&mut self);

    fn begin_action(&mut self, action_id: u32);

    fn end_action(&mut self, action_id: u32);
}

/// Build-begin notification, delivered once per batch before the first
/// `query_delay_first_action`.
pub trait BuildEventListener {
    fn on_build_begin(&mut self, event: &BuildEvent) -> Decision;
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_phase_names_are_snake_case() {
        let names: Vec<String> = BuildLifecyclePhase::iter().map(|p| p.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "query_delay_first_action",
                "begin_first_action",
                "end_last_action",
                "begin_action",
                "end_action",
            ]
        );
    }
}
