//! Manual restore through the same queue builds use

use std::sync::Arc;

use anyhow::Result;
use buildgate_core::{
    CommandResolver, Error, QueuedRestoreWorker, RestoreEvent, RestoreRequest, RestoreWorker,
};

use super::Project;

/// Queue a manual restore and wait for its outcome.
///
/// # Errors
///
/// Returns error if:
/// - Configuration cannot be loaded or the lock cannot be opened
/// - The lock stays busy for the whole restore wait window
/// - The restore command fails
pub async fn run(force: bool) -> Result<()> {
    let project = Project::load()?;
    let config = &project.config;
    let settings = config.worker_settings();

    let resolver = CommandResolver::new(&config.restore.command, project.root.clone())?;
    let worker = QueuedRestoreWorker::spawn(project.open_lock()?, Arc::new(resolver), settings);
    let mut events = worker.subscribe();

    worker.restore(RestoreRequest::manual(force));
    worker.shutdown().await;

    while let Ok(event) = events.try_recv() {
        match event {
            RestoreEvent::Started(_) => {}
            RestoreEvent::Completed(summary) => {
                println!("restored: {}", summary.detail);
                return Ok(());
            }
            RestoreEvent::Skipped(_) => {
                println!("restore skipped: already resolved");
                return Ok(());
            }
            RestoreEvent::Failed { message, .. } => {
                return Err(Error::restore_failed(message).into());
            }
            RestoreEvent::TimedOut(_) => {
                return Err(Error::GateTimeout {
                    waited_ms: u64::try_from(settings.lock_timeout.as_millis())
                        .unwrap_or(u64::MAX),
                }
                .into());
            }
        }
    }

    anyhow::bail!("restore worker stopped without reporting an outcome")
}
