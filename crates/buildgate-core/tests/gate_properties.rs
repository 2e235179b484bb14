//! Property tests for the lock gate against an external contender.

use std::time::Duration;

use buildgate_core::{GateState, LockGate, LockToken, MutualExclusionLock, ProcessLock};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Op {
    QueryDelay,
    BatchEnd,
    ExternalAcquire,
    ExternalRelease,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::QueryDelay),
        2 => Just(Op::BatchEnd),
        1 => Just(Op::ExternalAcquire),
        1 => Just(Op::ExternalRelease),
    ]
}

proptest! {
    #[test]
    fn gate_and_contender_never_both_hold(ops in prop::collection::vec(op(), 1..64)) {
        let lock = ProcessLock::new();
        let mut gate = LockGate::new(lock.clone());
        let mut external: Option<LockToken> = None;

        for op in ops {
            match op {
                Op::QueryDelay => {
                    let was_locked = gate.state() == GateState::Locked;
                    let delay = gate.query_delay();

                    if was_locked {
                        prop_assert!(!delay, "locked gate must keep answering proceed");
                    } else {
                        // Free lock means progress, foreign holder means delay
                        prop_assert_eq!(delay, external.is_some());
                    }
                }
                Op::BatchEnd => {
                    gate.on_batch_end();
                    prop_assert_eq!(gate.state(), GateState::Unlocked);
                }
                Op::ExternalAcquire => {
                    if external.is_none() {
                        external = lock.try_acquire(Duration::ZERO).ok().flatten();
                        if gate.state() == GateState::Locked {
                            prop_assert!(external.is_none(), "contender got a held lock");
                        }
                    }
                }
                Op::ExternalRelease => {
                    external = None;
                }
            }

            let gate_holds = gate.state() == GateState::Locked;
            prop_assert!(!(gate_holds && external.is_some()));
            prop_assert_eq!(lock.is_held(), gate_holds || external.is_some());
        }
    }

    #[test]
    fn repeated_batch_end_is_idempotent(ends in 1_usize..8) {
        let lock = ProcessLock::new();
        let mut gate = LockGate::new(lock.clone());

        for _ in 0..ends {
            gate.on_batch_end();
            prop_assert_eq!(gate.state(), GateState::Unlocked);
            prop_assert!(!lock.is_held());
        }
    }

    #[test]
    fn repeated_queries_while_locked_keep_one_holder(queries in 1_usize..16) {
        let lock = ProcessLock::new();
        let mut gate = LockGate::new(lock.clone());

        prop_assert!(!gate.query_delay());
        let holder = lock.holder();
        for _ in 0..queries {
            prop_assert!(!gate.query_delay());
            prop_assert_eq!(lock.holder(), holder);
        }
    }
}
