//! Queued restore worker.
//!
//! Requests go onto an unbounded queue drained by one background task, so
//! restores never overlap each other. Each restore runs with the shared
//! lock held, which is what keeps it from overlapping a gated build.

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};

use chrono::Utc;
use tokio::{
    sync::{broadcast, mpsc},
    task::JoinHandle,
};

use super::{
    request::{ResolutionSummary, RestoreEvent, RestoreRequest},
    resolver::Resolver,
};
use crate::lock::{LockError, LockToken, MutualExclusionLock, SharedLock};

const EVENT_CAPACITY: usize = 64;

/// Restore side as seen by the build handler.
pub trait RestoreWorker: Send + Sync {
    /// Queue a restore and return immediately.
    fn restore(&self, request: RestoreRequest);

    /// Forget any memoized resolution result. Synchronous.
    fn clear_cache(&self);
}

impl<W: RestoreWorker + ?Sized> RestoreWorker for Arc<W> {
    fn restore(&self, request: RestoreRequest) {
        (**self).restore(request);
    }

    fn clear_cache(&self) {
        (**self).clear_cache();
    }
}

/// How long a queued restore waits for the lock when it could not reserve
/// it up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerSettings {
    pub lock_timeout: Duration,
    pub lock_poll: Duration,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(60),
            lock_poll: Duration::from_millis(100),
        }
    }
}

type Cache = Arc<Mutex<Option<ResolutionSummary>>>;

struct Job {
    request: RestoreRequest,
    reserved: Option<LockToken>,
}

impl Job {
    fn coalesce(self, later: Self) -> Self {
        Self {
            request: self.request.coalesce(later.request),
            reserved: self.reserved.or(later.reserved),
        }
    }
}

/// Background restore queue bound to the shared lock.
pub struct QueuedRestoreWorker {
    lock: SharedLock,
    queue: mpsc::UnboundedSender<Job>,
    cache: Cache,
    events: broadcast::Sender<RestoreEvent>,
    task: JoinHandle<()>,
}

impl QueuedRestoreWorker {
    /// Start the worker task. Must be called from within a Tokio runtime.
    pub fn spawn(lock: SharedLock, resolver: Arc<dyn Resolver>, settings: WorkerSettings) -> Self {
        let (queue, jobs) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let cache: Cache = Arc::new(Mutex::new(None));

        let runner = Runner {
            lock: Arc::clone(&lock),
            resolver,
            cache: Arc::clone(&cache),
            events: events.clone(),
            settings,
        };
        let task = tokio::spawn(runner.run(jobs));

        Self {
            lock,
            queue,
            cache,
            events,
            task,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RestoreEvent> {
        self.events.subscribe()
    }

    /// The memoized result of the last successful restore.
    pub fn memoized(&self) -> Option<ResolutionSummary> {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Stop accepting requests, finish the queued ones and wait for the task.
    pub async fn shutdown(self) {
        drop(self.queue);
        if let Err(e) = self.task.await {
            tracing::warn!("restore worker task ended abnormally: {e}");
        }
    }
}

impl RestoreWorker for QueuedRestoreWorker {
    /// Reserves the lock on the caller's thread when it is free, so a
    /// restore queued at build-begin wins over the build's first gate poll.
    fn restore(&self, request: RestoreRequest) {
        let reserved = self
            .lock
            .try_acquire(Duration::ZERO)
            .unwrap_or_else(|e| {
                tracing::warn!("could not reserve restore lock up front: {e}");
                None
            });

        tracing::debug!(
            trigger = %request.trigger,
            force = request.force,
            reserved = reserved.is_some(),
            "restore queued"
        );

        if self.queue.send(Job { request, reserved }).is_err() {
            tracing::warn!(trigger = %request.trigger, "restore worker stopped, request dropped");
        }
    }

    fn clear_cache(&self) {
        let previous = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if previous.is_some() {
            tracing::info!("memoized resolution cleared");
        }
    }
}

struct Runner {
    lock: SharedLock,
    resolver: Arc<dyn Resolver>,
    cache: Cache,
    events: broadcast::Sender<RestoreEvent>,
    settings: WorkerSettings,
}

impl Runner {
    async fn run(self, mut jobs: mpsc::UnboundedReceiver<Job>) {
        while let Some(first) = jobs.recv().await {
            let mut job = first;
            while let Ok(next) = jobs.try_recv() {
                job = job.coalesce(next);
            }
            self.process(job).await;
        }
        tracing::debug!("restore queue closed");
    }

    fn emit(&self, event: RestoreEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn memoized(&self) -> Option<ResolutionSummary> {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn process(&self, job: Job) {
        let Job { request, reserved } = job;

        if !request.force && self.memoized().is_some() {
            drop(reserved);
            tracing::debug!(trigger = %request.trigger, "resolution memoized, restore skipped");
            self.emit(RestoreEvent::Skipped(request));
            return;
        }

        let token = match reserved {
            Some(token) => token,
            None => match self.wait_for_lock().await {
                Ok(Some(token)) => token,
                Ok(None) => {
                    tracing::warn!(
                        timeout_ms = self.settings.lock_timeout.as_millis(),
                        "restore lock stayed busy, restore dropped"
                    );
                    self.emit(RestoreEvent::TimedOut(request));
                    return;
                }
                Err(e) => {
                    tracing::error!("restore lock unavailable: {e}");
                    self.emit(RestoreEvent::Failed {
                        request,
                        message: e.to_string(),
                    });
                    return;
                }
            },
        };

        tracing::info!(trigger = %request.trigger, force = request.force, "restore started");
        self.emit(RestoreEvent::Started(request));

        let outcome = self.resolver.resolve(&request).await;

        match outcome {
            Ok(detail) => {
                let summary = ResolutionSummary {
                    request,
                    completed_at: Utc::now(),
                    detail,
                };
                // Memoize before release: whoever takes the lock next must see it
                *self.cache.lock().unwrap_or_else(PoisonError::into_inner) = Some(summary.clone());
                drop(token);
                tracing::info!(detail = %summary.detail, "restore completed");
                self.emit(RestoreEvent::Completed(summary));
            }
            Err(e) => {
                drop(token);
                tracing::error!("restore failed: {e}");
                self.emit(RestoreEvent::Failed {
                    request,
                    message: e.to_string(),
                });
            }
        }
    }

    /// Poll the lock without blocking the runtime.
    async fn wait_for_lock(&self) -> Result<Option<LockToken>, LockError> {
        let start = Instant::now();

        loop {
            if let Some(token) = self.lock.try_acquire(Duration::ZERO)? {
                return Ok(Some(token));
            }
            if start.elapsed() >= self.settings.lock_timeout {
                return Ok(None);
            }
            tokio::time::sleep(self.settings.lock_poll).await;
        }
    }
}
