//! # EventHub: wallet-update fan-out and status channels.
//!
//! The [`EventHub`] decouples the backend's raw update sources from any number
//! of UI consumers, and carries the status texts and health signals that the
//! status bar renders.
//!
//! ## Architecture
//! ```text
//! WatchStreams (backend):
//!   accounts ─────┐
//!   transactions ─┼──► listener task ──► Registry::broadcast() ──► [slot 1..N] ──► Subscription
//!   spentness ────┘          ▲
//!                            └─ stops on CancellationToken (shutdown)
//!
//!   health_tx/rx ──────────────────────────────────────────────► electrum_health(): Inbox<Health>
//!
//! Narration:
//!   show_toast / show_toast_with_timeout ──► [toast, cap 5]        ──► toast(): Inbox<String>
//!   RetrySupervisor / Session            ──► [health toast, cap 5] ──► electrum_toast(): Inbox<String>
//! ```
//!
//! ## Rules
//! - `broadcast_wallet_update()` never blocks; slots coalesce to one pending signal
//! - bounded sends wait while the buffer is full (delay, not loss) and give up
//!   once the hub shuts down, so no producer outlives teardown
//! - `shutdown()` cancels the listener and pending toast timers and closes every
//!   subscription; later subscriptions are born closed
//! - the deferred clear of `show_toast_with_timeout` is skipped if a newer toast
//!   was published in the meantime
//!
//! ## Example
//! ```rust
//! use syncvisor::{Config, EventHub, WatchStreams};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let cfg = Config::default();
//!     let (_acc_tx, accounts) = mpsc::channel(8);
//!     let (_tx_tx, transactions) = mpsc::channel(8);
//!     let (_sp_tx, spentness) = mpsc::channel(8);
//!     let (health_tx, health_rx) = cfg.health_channel();
//!
//!     let hub = EventHub::new(
//!         WatchStreams { accounts, transactions, spentness, health_tx, health_rx },
//!         &cfg,
//!     );
//!
//!     let mut sub = hub.subscribe();
//!     hub.broadcast_wallet_update();
//!     assert!(sub.changed().await);
//!
//!     hub.shutdown();
//!     assert!(!sub.changed().await);
//! }
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::{sync::mpsc, time};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::backend::{
    AccountNotification, Health, SpentnessNotifications, TransactionNotifications, WatchStreams,
};
use crate::core::{
    config::Config,
    inbox::Inbox,
    join::{Tracked, join_with_grace},
    subscription::{Registry, Subscription},
};
use crate::error::HubError;

/// Name under which the update listener is tracked.
const LISTENER: &str = "listener";
/// Name under which deferred toast clears are tracked.
const TOAST_TIMER: &str = "toast-timer";

/// Transient toast channel plus the generation of the latest message.
///
/// The generation lock is held across the send so a deferred clear can never
/// slip in between a newer toast's bump and its delivery.
struct ToastLane {
    tx: mpsc::Sender<String>,
    generation: tokio::sync::Mutex<u64>,
}

impl ToastLane {
    async fn publish(&self, text: String, token: &CancellationToken) -> u64 {
        let mut generation = self.generation.lock().await;
        *generation += 1;
        send_or_stop(&self.tx, text, token).await;
        *generation
    }

    async fn clear_if_current(&self, issued: u64, token: &CancellationToken) {
        let generation = self.generation.lock().await;
        if *generation == issued {
            send_or_stop(&self.tx, String::new(), token).await;
        } else {
            debug!(issued, current = *generation, "stale toast clear skipped");
        }
    }
}

/// Fan-out hub for one open wallet session.
///
/// Created with [`EventHub::new`] (inside a tokio runtime); lives until
/// [`shutdown`](EventHub::shutdown) or drop.
pub struct EventHub {
    registry: Arc<Registry>,
    toast_lane: Arc<ToastLane>,
    toast: Inbox<String>,
    health_toast_tx: mpsc::Sender<String>,
    health_toast: Inbox<String>,
    health_tx: mpsc::Sender<Health>,
    health: Inbox<Health>,
    token: CancellationToken,
    tasks: Mutex<Vec<Tracked>>,
    grace: Duration,
}

impl EventHub {
    /// Creates the hub and spawns its update listener.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    pub fn new(streams: WatchStreams, cfg: &Config) -> Arc<Self> {
        let WatchStreams {
            accounts,
            transactions,
            spentness,
            health_tx,
            health_rx,
        } = streams;

        let (toast_tx, toast_rx) = mpsc::channel(cfg.toast_capacity_clamped());
        let (health_toast_tx, health_toast_rx) =
            mpsc::channel(cfg.health_toast_capacity_clamped());

        let registry = Arc::new(Registry::default());
        let token = CancellationToken::new();

        let listener = tokio::spawn(listen(
            Sources {
                accounts,
                transactions,
                spentness,
            },
            Arc::clone(&registry),
            token.clone(),
        ));

        Arc::new(Self {
            registry,
            toast_lane: Arc::new(ToastLane {
                tx: toast_tx,
                generation: tokio::sync::Mutex::new(0),
            }),
            toast: Inbox::new(toast_rx),
            health_toast_tx,
            health_toast: Inbox::new(health_toast_rx),
            health_tx,
            health: Inbox::new(health_rx),
            token,
            tasks: Mutex::new(vec![(LISTENER, listener)]),
            grace: cfg.grace,
        })
    }

    /// Registers a new subscriber and returns its signal handle.
    pub fn subscribe(&self) -> Subscription {
        self.registry.subscribe()
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }

    /// Tells every subscriber that wallet state changed.
    ///
    /// Subscribers with a signal already pending are skipped.
    pub fn broadcast_wallet_update(&self) {
        let delivered = self.registry.broadcast();
        debug!(delivered, "wallet update broadcast");
    }

    /// Stops the listener and pending timers, and closes every subscription.
    ///
    /// Background tasks exit on their own; use [`wait_stopped`](Self::wait_stopped)
    /// to join them.
    pub fn shutdown(&self) {
        self.token.cancel();
        let closed = self.registry.close();
        info!(closed, "event hub shut down");
    }

    /// Whether [`shutdown`](Self::shutdown) was called.
    pub fn is_shut_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the hub shuts down.
    pub async fn stopped(&self) {
        self.token.cancelled().await
    }

    /// Joins the listener and any pending toast timers.
    ///
    /// Waits up to [`Config::grace`]; tasks still running after that are
    /// aborted and reported in [`HubError::GraceExceeded`].
    pub async fn wait_stopped(&self) -> Result<(), HubError> {
        let tasks = std::mem::take(&mut *self.lock_tasks());
        join_with_grace(tasks, self.grace).await
    }

    /// Transient UI messages; an empty string means "clear".
    pub fn toast(&self) -> Inbox<String> {
        self.toast.clone()
    }

    /// Connection-status texts published while reconnecting.
    pub fn electrum_toast(&self) -> Inbox<String> {
        self.health_toast.clone()
    }

    /// Health signals from the backend and from supervised operations.
    pub fn electrum_health(&self) -> Inbox<Health> {
        self.health.clone()
    }

    /// Publishes a transient message.
    ///
    /// Waits while the toast buffer is full; no-op after shutdown.
    pub async fn show_toast(&self, text: impl Into<String>) {
        self.toast_lane.publish(text.into(), &self.token).await;
    }

    /// Clears the transient message.
    pub async fn cancel_toast(&self) {
        self.show_toast(String::new()).await
    }

    /// Publishes a transient message and clears it after `after`.
    ///
    /// The clear is skipped if another toast was published in the meantime.
    pub async fn show_toast_with_timeout(&self, text: impl Into<String>, after: Duration) {
        if self.is_shut_down() {
            return;
        }
        let issued = self.toast_lane.publish(text.into(), &self.token).await;

        let lane = Arc::clone(&self.toast_lane);
        let token = self.token.clone();
        let timer = tokio::spawn(async move {
            tokio::select! {
                _ = time::sleep(after) => lane.clear_if_current(issued, &token).await,
                _ = token.cancelled() => {}
            }
        });

        let mut tasks = self.lock_tasks();
        tasks.retain(|(_, handle)| !handle.is_finished());
        tasks.push((TOAST_TIMER, timer));
    }

    /// Publishes a connection-status text.
    pub(crate) async fn show_health_toast(&self, text: impl Into<String>) {
        send_or_stop(&self.health_toast_tx, text.into(), &self.token).await;
    }

    /// Publishes a health signal on the backend's health stream.
    pub(crate) async fn publish_health(&self, health: Health) {
        send_or_stop(&self.health_tx, health, &self.token).await;
    }

    fn lock_tasks(&self) -> MutexGuard<'_, Vec<Tracked>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for EventHub {
    fn drop(&mut self) {
        self.token.cancel();
        self.registry.close();
    }
}

/// Sends unless the hub shuts down first.
///
/// Returns `false` if the value was not delivered.
async fn send_or_stop<T>(tx: &mpsc::Sender<T>, value: T, token: &CancellationToken) -> bool {
    if token.is_cancelled() {
        return false;
    }
    tokio::select! {
        biased;
        _ = token.cancelled() => false,
        res = tx.send(value) => res.is_ok(),
    }
}

/// Raw update sources consumed by the listener.
struct Sources {
    accounts: mpsc::Receiver<AccountNotification>,
    transactions: mpsc::Receiver<TransactionNotifications>,
    spentness: mpsc::Receiver<SpentnessNotifications>,
}

/// Turns every raw backend notification into a coalesced broadcast.
///
/// A source that closes is no longer polled; the listener keeps serving the
/// others until the token is cancelled.
async fn listen(mut sources: Sources, registry: Arc<Registry>, token: CancellationToken) {
    let mut accounts_open = true;
    let mut transactions_open = true;
    let mut spentness_open = true;

    loop {
        let source = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            ev = sources.accounts.recv(), if accounts_open => match ev {
                Some(n) => {
                    debug!(account = n.account, balance = n.balance, "account notification");
                    "account"
                }
                None => {
                    accounts_open = false;
                    continue;
                }
            },
            ev = sources.transactions.recv(), if transactions_open => match ev {
                Some(n) => {
                    debug!(count = n.hashes.len(), "transaction notification");
                    "transaction"
                }
                None => {
                    transactions_open = false;
                    continue;
                }
            },
            ev = sources.spentness.recv(), if spentness_open => match ev {
                Some(n) => {
                    debug!(count = n.outpoints.len(), "spentness notification");
                    "spentness"
                }
                None => {
                    spentness_open = false;
                    continue;
                }
            },
        };

        let delivered = registry.broadcast();
        debug!(source, delivered, "wallet update broadcast");
    }
    debug!("update listener stopped");
}
