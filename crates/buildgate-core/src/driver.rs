//! A polling orchestrator for hosts without their own build checkpoints.
//!
//! The gate never waits, so somebody has to own the retry cadence. The
//! driver asks `query_delay_first_action` every `poll_interval` until the
//! gate lets the batch through or `max_wait` runs out.

use std::{
    future::Future,
    time::{Duration, Instant},
};

use crate::{
    classifier::{BuildEvent, Decision},
    lifecycle::{BuildEventListener, BuildLifecycle},
    Error, Result,
};

/// Id of the single action a driven batch consists of.
pub const BUILD_ACTION_ID: u32 = 1;

/// What happened in one driven batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport<T> {
    pub decision: Decision,
    /// How many times the gate was asked
    pub polls: u32,
    /// Time spent waiting at the gate
    pub waited: Duration,
    pub output: T,
}

/// Ends the batch on every exit path, unwinding included.
struct BatchGuard<'a, H: BuildLifecycle> {
    handler: &'a mut H,
}

impl<H: BuildLifecycle> Drop for BatchGuard<'_, H> {
    fn drop(&mut self) {
        self.handler.end_last_action();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildDriver {
    poll_interval: Duration,
    max_wait: Duration,
}

impl BuildDriver {
    pub const fn new(poll_interval: Duration, max_wait: Duration) -> Self {
        Self {
            poll_interval,
            max_wait,
        }
    }

    /// Run one build batch through `handler`.
    ///
    /// `end_last_action` is delivered whether the build succeeds, fails,
    /// panics or never gets past the gate, and also when this future is
    /// dropped mid-batch.
    ///
    /// # Errors
    ///
    /// - `GateTimeout` if the gate still says "delay" after `max_wait`
    /// - whatever `build` fails with
    pub async fn run_batch<H, F, Fut, T>(
        &self,
        handler: &mut H,
        event: &BuildEvent,
        build: F,
    ) -> Result<BatchReport<T>>
    where
        H: BuildLifecycle + BuildEventListener,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let decision = handler.on_build_begin(event);
        let mut batch = BatchGuard { handler };

        let start = Instant::now();
        let mut polls = 0_u32;
        loop {
            polls = polls.saturating_add(1);
            if !batch.handler.query_delay_first_action() {
                break;
            }

            let waited = start.elapsed();
            if waited >= self.max_wait {
                return Err(Error::GateTimeout {
                    waited_ms: u64::try_from(waited.as_millis()).unwrap_or(u64::MAX),
                });
            }
            tracing::debug!(polls, "build delayed by restore lock");
            tokio::time::sleep(self.poll_interval.min(self.max_wait - waited)).await;
        }
        let waited = start.elapsed();

        batch.handler.begin_first_action();
        batch.handler.begin_action(BUILD_ACTION_ID);
        let outcome = build().await;
        batch.handler.end_action(BUILD_ACTION_ID);
        drop(batch);

        if let Err(e) = &outcome {
            tracing::warn!("build batch failed: {e}");
        }

        outcome.map(|output| BatchReport {
            decision,
            polls,
            waited,
            output,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, Mutex, PoisonError},
        time::Duration,
    };

    use super::*;
    use crate::classifier::BuildAction;

    /// Records checkpoints; delays for the first `delays` polls.
    #[derive(Debug)]
    struct RecordingHandler {
        calls: Arc<Mutex<Vec<String>>>,
        delays: u32,
    }

    impl RecordingHandler {
        fn record(&self, call: impl Into<String>) {
            self.calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(call.into());
        }
    }

    impl BuildEventListener for RecordingHandler {
        fn on_build_begin(&mut self, _event: &BuildEvent) -> Decision {
            self.record("build_begin");
            Decision::Skip
        }
    }

    impl BuildLifecycle for RecordingHandler {
        fn query_delay_first_action(&mut self) -> bool {
            self.record("query_delay");
            if self.delays == 0 {
                false
            } else {
                self.delays -= 1;
                true
            }
        }

        fn begin_first_action(&mut self) {
            self.record("begin_first");
        }

        fn end_last_action(&mut self) {
            self.record("end_last");
        }

        fn begin_action(&mut self, action_id: u32) {
            self.record(format!("begin_action({action_id})"));
        }

        fn end_action(&mut self, action_id: u32) {
            self.record(format!("end_action({action_id})"));
        }
    }

    fn recorded(calls: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
        calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    const fn build_panics() -> bool {
        true
    }

    fn driver() -> BuildDriver {
        BuildDriver::new(Duration::from_millis(1), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_checkpoints_arrive_in_order() -> Result<()> {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut handler = RecordingHandler {
            calls: Arc::clone(&calls),
            delays: 2,
        };

        let report = driver()
            .run_batch(
                &mut handler,
                &BuildEvent::solution(BuildAction::Build),
                || async { Ok(7) },
            )
            .await?;

        assert_eq!(report.polls, 3);
        assert_eq!(report.output, 7);
        assert_eq!(
            recorded(&calls),
            [
                "build_begin",
                "query_delay",
                "query_delay",
                "query_delay",
                "begin_first",
                "begin_action(1)",
                "end_action(1)",
                "end_last",
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_panicking_build_still_ends_batch() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let task_calls = Arc::clone(&calls);

        let joined = tokio::spawn(async move {
            let mut handler = RecordingHandler {
                calls: task_calls,
                delays: 0,
            };
            driver()
                .run_batch(
                    &mut handler,
                    &BuildEvent::solution(BuildAction::Build),
                    || async {
                        if build_panics() {
                            panic!("build script blew up");
                        }
                        Ok::<(), Error>(())
                    },
                )
                .await
        })
        .await;

        assert!(joined.is_err_and(|e| e.is_panic()));
        assert_eq!(recorded(&calls).last().map(String::as_str), Some("end_last"));
    }

    #[tokio::test]
    async fn test_cancelled_batch_still_ends_batch() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut handler = RecordingHandler {
            calls: Arc::clone(&calls),
            delays: 0,
        };

        let cancelled = tokio::time::timeout(
            Duration::from_millis(20),
            driver().run_batch(
                &mut handler,
                &BuildEvent::solution(BuildAction::Build),
                || std::future::pending::<Result<()>>(),
            ),
        )
        .await;

        assert!(cancelled.is_err());
        assert_eq!(recorded(&calls).last().map(String::as_str), Some("end_last"));
    }

    #[tokio::test]
    async fn test_gate_timeout_ends_batch_once() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut handler = RecordingHandler {
            calls: Arc::clone(&calls),
            delays: u32::MAX,
        };

        let result = BuildDriver::new(Duration::from_millis(2), Duration::from_millis(10))
            .run_batch(
                &mut handler,
                &BuildEvent::solution(BuildAction::Build),
                || async { Ok(()) },
            )
            .await;

        assert!(matches!(result, Err(Error::GateTimeout { .. })));
        let calls = recorded(&calls);
        assert_eq!(calls.iter().filter(|c| *c == "end_last").count(), 1);
        assert!(!calls.iter().any(|c| c == "begin_first"));
    }
}
