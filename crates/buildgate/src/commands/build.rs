//! Gated build: classify, restore if asked, wait for the lock, then build

use std::{path::Path, sync::Arc};

use anyhow::Result;
use buildgate_core::{
    BatchReport, BuildAction, BuildDriver, BuildEvent, BuildScope, CommandResolver,
    ConsentPolicy, EnvConsent, Error, FixedConsent, QueuedRestoreWorker, Resolver,
    RestoreBuildHandler, RestoreEvent,
};
use tokio::{process::Command, sync::broadcast};

use super::Project;

#[derive(Debug)]
pub struct BuildOptions {
    pub action: BuildAction,
    pub scope: BuildScope,
    pub no_restore: bool,
    /// `[program, args...]`
    pub command: Vec<String>,
}

/// Run one gated build batch.
///
/// # Errors
///
/// Returns error if:
/// - Configuration cannot be loaded or the lock cannot be opened
/// - The lock stays busy longer than the configured wait
/// - The build command fails
pub async fn run(options: BuildOptions) -> Result<()> {
    let project = Project::load()?;
    let config = &project.config;
    let lock = project.open_lock()?;

    let resolver: Arc<dyn Resolver> =
        Arc::new(CommandResolver::new(&config.restore.command, project.root.clone())?);
    let worker = Arc::new(QueuedRestoreWorker::spawn(
        Arc::clone(&lock),
        resolver,
        config.worker_settings(),
    ));
    let mut events = worker.subscribe();

    let consent: Arc<dyn ConsentPolicy> = if options.no_restore {
        Arc::new(FixedConsent::new(false))
    } else {
        Arc::new(EnvConsent::new(config.restore.on_build))
    };
    let mut handler = RestoreBuildHandler::new(lock, Arc::clone(&worker), consent);

    let driver = BuildDriver::new(config.poll_interval(), config.max_wait());
    let event = BuildEvent::new(options.scope, options.action);
    let outcome = driver
        .run_batch(&mut handler, &event, || {
            run_build_command(&options.command, &project.root)
        })
        .await;

    // Let a restore that is still queued finish before exiting
    drop(handler);
    match Arc::try_unwrap(worker) {
        Ok(worker) => worker.shutdown().await,
        Err(_) => tracing::warn!("restore worker still shared at exit"),
    }
    report_restores(&mut events);

    let report = outcome?;
    print_report(&report);
    Ok(())
}

async fn run_build_command(command: &[String], dir: &Path) -> buildgate_core::Result<()> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| Error::validation("build command cannot be empty"))?;

    tracing::info!(%program, "running build command");
    let status = Command::new(program)
        .args(args)
        .current_dir(dir)
        .status()
        .await
        .map_err(|e| Error::build_failed(format!("failed to run {program}: {e}")))?;

    if status.success() {
        Ok(())
    } else {
        Err(Error::build_failed(format!("{program} exited with {status}")))
    }
}

fn report_restores(events: &mut broadcast::Receiver<RestoreEvent>) {
    while let Ok(event) = events.try_recv() {
        match event {
            RestoreEvent::Started(_) => {}
            RestoreEvent::Completed(summary) => {
                tracing::info!(detail = %summary.detail, "restore completed");
            }
            RestoreEvent::Skipped(_) => tracing::info!("restore skipped, already resolved"),
            RestoreEvent::Failed { message, .. } => {
                tracing::warn!("restore failed: {message}");
            }
            RestoreEvent::TimedOut(_) => {
                tracing::warn!("restore gave up waiting for the lock");
            }
        }
    }
}

fn print_report(report: &BatchReport<()>) {
    println!("decision: {}", report.decision);
    println!(
        "gate:     {} poll(s), waited {}ms",
        report.polls,
        report.waited.as_millis()
    );
}
