//! Restore side: the queued worker and the resolvers it runs.
//!
//! # Module Structure
//!
//! - `request`: requests, memoized results and progress events
//! - `resolver`: what a restore actually executes
//! - `worker`: the queue that serializes restores on the shared lock

mod request;
mod resolver;
mod worker;

pub use request::{ResolutionSummary, RestoreEvent, RestoreRequest, RestoreTrigger};
pub use resolver::{CommandResolver, Resolver, RESTORE_FORCE_ENV};
pub use worker::{QueuedRestoreWorker, RestoreWorker, WorkerSettings};
