//! # Buildgate Core
//!
//! Keeps a build and a dependency restore from running against the same
//! dependency graph at the same time.
//!
//! ## Laws (Compiler Enforced)
//!
//! - No `unwrap()` - returns `Result` instead
//! - No `expect()` - returns `Result` instead
//! - No `panic!()` - returns `Result` instead
//! - No `unsafe` - safe Rust only
//!
//! ## Pieces
//!
//! - [`gate::LockGate`]: the poll-based delay-or-proceed gate a build
//!   orchestrator consults before the first build action of a batch
//! - [`classifier::classify`]: maps a build-begin event onto a restore decision
//! - [`lock`]: the shared mutual-exclusion lock both sides contend on
//! - [`restore`]: the queued restore worker and its resolvers
//! - [`handler::RestoreBuildHandler`]: wires the gate, classifier and worker
//!   to the build lifecycle checkpoints
//! - [`driver::BuildDriver`]: a polling orchestrator for hosts that do not
//!   bring their own

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

pub mod classifier;
pub mod config;
pub mod consent;
pub mod driver;
mod error;
pub mod gate;
pub mod handler;
pub mod lifecycle;
pub mod lock;
pub mod restore;

pub use classifier::{classify, BuildAction, BuildEvent, BuildScope, Decision};
pub use config::{load_config, load_config_from, Config, LockKind};
pub use consent::{ConsentPolicy, EnvConsent, FixedConsent};
pub use driver::{BatchReport, BuildDriver};
pub use error::{Error, Result};
pub use gate::{GateState, LockGate};
pub use handler::RestoreBuildHandler;
pub use lifecycle::{BuildEventListener, BuildLifecycle, BuildLifecyclePhase};
pub use lock::{FileLock, LockError, LockToken, MutualExclusionLock, ProcessLock, SharedLock};
pub use restore::{
    CommandResolver, QueuedRestoreWorker, ResolutionSummary, Resolver, RestoreEvent,
    RestoreRequest, RestoreTrigger, RestoreWorker,
};
