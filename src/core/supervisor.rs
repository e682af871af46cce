//! # RetrySupervisor: single-flight reconnect loop.
//!
//! Repeats one [`Operation`] until it succeeds, waiting a growing
//! [`BackoffPolicy`] delay between failures, and narrates progress through the
//! [`EventHub`]. At most one loop runs at a time; triggers that arrive while a
//! loop is in flight are ignored.
//!
//! ## Loop
//! ```text
//! try_run(op, hub)
//!   ├─► running? ──yes──► AlreadyRunning (op not invoked)
//!   └─► mark running (guard)
//!        loop {
//!          ├─► attempts += 1
//!          ├─► op.run()
//!          │     ├─ Ok  ──► health toast "" ──► Completed
//!          │     └─ Err ──► publish Health::Failure(err)
//!          │                ├─ delay = next Fibonacci step (capped)
//!          │                ├─ health toast "Retrying in {delay}..."
//!          │                └─ sleep(delay)
//!          └─ hub shut down at any await ──► Abandoned
//!        }
//!   guard dropped ──► running = false
//! ```
//!
//! ## Rules
//! - The `running` mutex is held only to check-and-set / clear the flag, never
//!   across the operation or the sleep
//! - Each call restarts the backoff sequence from the beginning
//! - No attempt limit: only success or hub shutdown ends the loop
//! - The operation's error is never returned; it is only observable on the
//!   health stream

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::{task::JoinHandle, time};
use tracing::{debug, info, warn};

use crate::backend::Health;
use crate::core::hub::EventHub;
use crate::operations::{Operation, OperationRef};
use crate::policies::BackoffPolicy;

/// How a [`RetrySupervisor::try_run`] call ended.
///
/// None of these is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryOutcome {
    /// The operation eventually succeeded.
    Completed {
        /// Number of attempts, including the successful one.
        attempts: u32,
    },
    /// Another loop was already in flight; the operation was not invoked.
    AlreadyRunning,
    /// The hub shut down before the operation succeeded.
    Abandoned {
        /// Number of attempts started.
        attempts: u32,
    },
}

/// Clears the running flag when dropped.
///
/// Covers normal exit, a dropped loop future, and a panicking operation.
struct RunningGuard<'a> {
    running: &'a Mutex<bool>,
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        *self.running.lock().unwrap_or_else(PoisonError::into_inner) = false;
    }
}

/// Single-flight retry loop with Fibonacci backoff.
pub struct RetrySupervisor {
    running: Mutex<bool>,
    backoff: BackoffPolicy,
}

impl RetrySupervisor {
    /// Creates an idle supervisor.
    pub fn new(backoff: BackoffPolicy) -> Self {
        Self {
            running: Mutex::new(false),
            backoff,
        }
    }

    /// Whether a loop is currently in flight.
    pub fn is_running(&self) -> bool {
        *self.lock()
    }

    /// Runs `op` until it succeeds, unless a loop is already in flight.
    ///
    /// Returns [`RetryOutcome::AlreadyRunning`] immediately if another call is
    /// still looping. Otherwise returns only once the operation succeeded or
    /// the hub shut down.
    pub async fn try_run(&self, op: &dyn Operation, hub: &EventHub) -> RetryOutcome {
        let Some(_guard) = self.acquire() else {
            debug!(operation = op.name(), "retry already in flight; trigger ignored");
            return RetryOutcome::AlreadyRunning;
        };

        let mut delays = self.backoff.iter();
        let mut attempts: u32 = 0;

        loop {
            if hub.is_shut_down() {
                break;
            }
            attempts += 1;

            let res = tokio::select! {
                res = op.run() => res,
                _ = hub.stopped() => break,
            };

            match res {
                Ok(()) => {
                    hub.show_health_toast("").await;
                    info!(operation = op.name(), attempts, "operation succeeded");
                    return RetryOutcome::Completed { attempts };
                }
                Err(e) => {
                    let delay = delays.next().unwrap_or(self.backoff.max);
                    warn!(
                        operation = op.name(),
                        attempt = attempts,
                        error = %e,
                        label = e.as_label(),
                        ?delay,
                        "operation failed; backing off"
                    );

                    hub.publish_health(Health::Failure(e)).await;
                    hub.show_health_toast(format!("Retrying in {delay:?}..."))
                        .await;

                    tokio::select! {
                        _ = time::sleep(delay) => {}
                        _ = hub.stopped() => break,
                    }
                }
            }
        }

        info!(operation = op.name(), attempts, "retry loop abandoned on shutdown");
        RetryOutcome::Abandoned { attempts }
    }

    /// Runs [`try_run`](Self::try_run) on its own task.
    ///
    /// Callers that only want to trigger a reconnect can drop the handle.
    pub fn spawn(
        self: &Arc<Self>,
        op: OperationRef,
        hub: Arc<EventHub>,
    ) -> JoinHandle<RetryOutcome> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.try_run(op.as_ref(), &hub).await })
    }

    fn acquire(&self) -> Option<RunningGuard<'_>> {
        let mut running = self.lock();
        if *running {
            return None;
        }
        *running = true;
        Some(RunningGuard {
            running: &self.running,
        })
    }

    fn lock(&self) -> MutexGuard<'_, bool> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RetrySupervisor {
    fn default() -> Self {
        Self::new(BackoffPolicy::default())
    }
}
