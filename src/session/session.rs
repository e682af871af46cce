//! # Session: one open wallet, its hub, and its reconnect supervisor.
//!
//! [`Session`] wires a [`Wallet`] to an [`EventHub`] and a [`RetrySupervisor`]
//! and owns everything that lives as long as the wallet stays open: the UI
//! command queue, the active layout, and the watcher tasks feeding the status
//! bar.
//!
//! ## Lifecycle
//! ```text
//! Session::open(wallet, cfg)
//!   ├─► EventHub::new(wallet.watch())     (listener task)
//!   └─► UiWorker                          (single display writer)
//!
//! start_sync() ── Err ──► restart() ──► RetrySupervisor::spawn(restart op)
//!                                           op: "Restarting..." → Health::Restarting
//!                                               → sleep(restart_delay) → synchronize()
//!
//! spawn_status_monitor(f): toast / electrum_toast / electrum_health ──► UiQueue ──► f(StatusUpdate)
//!                          Health::requests_restart() ──► restart()
//! spawn_balance_monitor(f): Subscription ──► wallet.balance() ──► UiQueue ──► f(balance)
//!
//! close(): hub.shutdown() → destroy layout → join watchers ∥ hub.wait_stopped()
//! drop without close(): hub.shutdown() so background tasks exit
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::time;
use tracing::{debug, info, warn};

use crate::backend::{Health, Indicator, Wallet};
use crate::core::{
    Config, EventHub, RetryOutcome, RetrySupervisor, Tracked, join_with_grace,
    wait_for_shutdown_signal,
};
use crate::error::HubError;
use crate::operations::{OperationFn, OperationRef};
use crate::session::dispatch::{UiQueue, ui_queue};
use crate::session::layout::{Layout, LayoutSlot};

/// One change for the status bar.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusUpdate {
    /// Transient message (empty = clear).
    Info(String),
    /// Connection-status text (empty = clear).
    Connection(String),
    /// Connection-health indicator.
    Indicator(Indicator),
}

/// An open wallet session.
pub struct Session<W: Wallet> {
    wallet: Arc<W>,
    hub: Arc<EventHub>,
    supervisor: Arc<RetrySupervisor>,
    cfg: Config,
    ui: UiQueue,
    layout: LayoutSlot,
    tasks: Mutex<Vec<Tracked>>,
}

impl<W: Wallet> Session<W> {
    /// Opens a session over `wallet`.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    pub fn open(wallet: Arc<W>, cfg: Config) -> Arc<Self> {
        let hub = EventHub::new(wallet.watch(), &cfg);
        let supervisor = Arc::new(RetrySupervisor::new(cfg.backoff));

        let (ui, worker) = ui_queue();
        let worker = {
            let hub = Arc::clone(&hub);
            tokio::spawn(async move {
                worker.run(hub.stopped()).await;
            })
        };

        info!("session opened");
        Arc::new(Self {
            wallet,
            hub,
            supervisor,
            cfg,
            ui,
            layout: LayoutSlot::default(),
            tasks: Mutex::new(vec![("ui-worker", worker)]),
        })
    }

    pub fn hub(&self) -> &Arc<EventHub> {
        &self.hub
    }

    pub fn wallet(&self) -> &Arc<W> {
        &self.wallet
    }

    pub fn ui(&self) -> &UiQueue {
        &self.ui
    }

    /// Whether a supervised reconnect is in flight.
    pub fn is_restarting(&self) -> bool {
        self.supervisor.is_running()
    }

    /// Runs one synchronization; on failure starts a supervised restart.
    ///
    /// A wallet that is already synced is not synchronized again; subscribers
    /// are still told to re-read its state.
    ///
    /// Returns the restart handle when one was started.
    pub async fn start_sync(
        self: &Arc<Self>,
    ) -> Option<tokio::task::JoinHandle<RetryOutcome>> {
        if self.wallet.is_synced() {
            debug!("wallet already synced");
            self.hub.broadcast_wallet_update();
            return None;
        }
        match self.wallet.synchronize().await {
            Ok(()) => {
                info!("initial synchronization completed");
                self.hub.broadcast_wallet_update();
                None
            }
            Err(e) => {
                warn!(error = %e, label = e.as_label(), "initial synchronization failed");
                Some(self.restart())
            }
        }
    }

    /// Starts a supervised reconnect (ignored if one is already running).
    pub fn restart(self: &Arc<Self>) -> tokio::task::JoinHandle<RetryOutcome> {
        self.supervisor
            .spawn(self.restart_operation(), Arc::clone(&self.hub))
    }

    fn restart_operation(&self) -> OperationRef {
        let wallet = Arc::clone(&self.wallet);
        let hub = Arc::clone(&self.hub);
        let delay = self.cfg.restart_delay;

        OperationFn::arc("restart", move || {
            let wallet = Arc::clone(&wallet);
            let hub = Arc::clone(&hub);
            async move {
                hub.show_health_toast("Restarting...").await;
                hub.publish_health(Health::Restarting).await;
                time::sleep(delay).await;
                let res = wallet.synchronize().await;
                if res.is_ok() {
                    hub.broadcast_wallet_update();
                }
                res
            }
        })
    }

    /// Feeds the status bar from the hub's three status streams.
    ///
    /// `on_update` runs on the UI worker. A health signal that asks for a
    /// reconnect starts [`restart`](Self::restart).
    pub fn spawn_status_monitor<F>(self: &Arc<Self>, on_update: F)
    where
        F: Fn(StatusUpdate) + Send + Sync + 'static,
    {
        let on_update = Arc::new(on_update);
        let toast = self.hub.toast();
        let status = self.hub.electrum_toast();
        let health = self.hub.electrum_health();
        let hub = Arc::clone(&self.hub);
        let ui = self.ui.clone();
        let session: Weak<Self> = Arc::downgrade(self);

        let handle = tokio::spawn(async move {
            loop {
                let update = tokio::select! {
                    biased;
                    _ = hub.stopped() => break,
                    Some(text) = toast.recv() => StatusUpdate::Info(text),
                    Some(text) = status.recv() => StatusUpdate::Connection(text),
                    Some(signal) = health.recv() => {
                        debug!(label = signal.as_label(), "health signal");
                        if signal.requests_restart() {
                            if let Some(session) = session.upgrade() {
                                session.restart();
                            }
                        }
                        StatusUpdate::Indicator(signal.indicator())
                    }
                };

                let on_update = Arc::clone(&on_update);
                ui.queue_update(move || on_update(update));
            }
        });
        self.track("status-monitor", handle);
    }

    /// Re-reads the balance whenever wallet state changes.
    ///
    /// `on_balance` runs on the UI worker.
    pub fn spawn_balance_monitor<F>(self: &Arc<Self>, on_balance: F)
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        let on_balance = Arc::new(on_balance);
        let mut changes = self.hub.subscribe();
        let wallet = Arc::clone(&self.wallet);
        let ui = self.ui.clone();

        let handle = tokio::spawn(async move {
            while changes.changed().await {
                let balance = wallet.balance();
                let on_balance = Arc::clone(&on_balance);
                ui.queue_update(move || on_balance(balance));
            }
        });
        self.track("balance-monitor", handle);
    }

    /// Makes `next` the active layout and hands back the previous one.
    pub fn replace_layout(&self, next: Box<dyn Layout>) -> Option<Box<dyn Layout>> {
        debug!(layout = next.name(), "layout replaced");
        self.layout.replace(next)
    }

    /// Removes the active layout.
    pub fn take_layout(&self) -> Option<Box<dyn Layout>> {
        self.layout.take()
    }

    /// Name of the active layout.
    pub fn layout_name(&self) -> Option<String> {
        self.layout.active_name()
    }

    /// Tears the session down.
    ///
    /// Shuts the hub down, destroys the active layout, then waits up to
    /// [`Config::grace`] for every background task. The session's own tasks
    /// and the hub's are joined concurrently, under the same grace period.
    pub async fn close(&self) -> Result<(), HubError> {
        self.hub.shutdown();
        if let Some(mut layout) = self.layout.take() {
            layout.destroy();
        }

        let tasks = std::mem::take(&mut *self.lock_tasks());
        let (own, hub) = tokio::join!(
            join_with_grace(tasks, self.cfg.grace),
            self.hub.wait_stopped()
        );
        info!("session closed");
        own.and(hub)
    }

    /// Waits for a termination signal, then closes the session.
    ///
    /// Returns without waiting for a signal if the hub already shut down.
    pub async fn close_on_signal(&self) -> Result<(), HubError> {
        tokio::select! {
            biased;
            _ = self.hub.stopped() => {}
            res = wait_for_shutdown_signal() => {
                if let Err(e) = res {
                    warn!(error = %e, "signal handlers unavailable; closing now");
                }
            }
        }
        self.close().await
    }

    fn track(&self, name: &'static str, handle: tokio::task::JoinHandle<()>) {
        let mut tasks = self.lock_tasks();
        tasks.retain(|(_, h)| !h.is_finished());
        tasks.push((name, handle));
    }

    fn lock_tasks(&self) -> MutexGuard<'_, Vec<Tracked>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Wallet> Drop for Session<W> {
    /// Background tasks keep the hub alive; shutting it down lets them exit.
    fn drop(&mut self) {
        if !self.hub.is_shut_down() {
            self.hub.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use tokio::sync::mpsc;

    use super::*;
    use crate::backend::AccountNotification;
    use crate::error::BackendError;
    use crate::testing::FakeWallet;

    fn roomy() -> Config {
        Config {
            toast_capacity: 64,
            health_toast_capacity: 64,
            health_capacity: 64,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_successful_sync_needs_no_restart() {
        let cfg = roomy();
        let (wallet, _feeds) = FakeWallet::new(&cfg, []);
        let session = Session::open(Arc::clone(&wallet), cfg);
        let mut changes = session.hub().subscribe();

        assert!(session.start_sync().await.is_none());
        assert_eq!(wallet.syncs(), 1);
        assert!(changes.changed().await);
        assert!(!session.is_restarting());

        session.close().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_sync_restarts_until_success() {
        let cfg = roomy();
        let (wallet, _feeds) = FakeWallet::new(
            &cfg,
            [
                Err(BackendError::failed("no route")),
                Err(BackendError::ServerShutdown),
            ],
        );
        let session = Session::open(Arc::clone(&wallet), cfg);

        let restart = session.start_sync().await.expect("restart started");
        assert_eq!(
            restart.await.unwrap(),
            RetryOutcome::Completed { attempts: 2 }
        );
        assert_eq!(wallet.syncs(), 3);

        let status = session.hub().electrum_toast();
        let mut texts = Vec::new();
        while let Some(t) = status.try_recv() {
            texts.push(t);
        }
        assert_eq!(
            texts,
            vec!["Restarting...", "Retrying in 1s...", "Restarting...", ""]
        );

        let health = session.hub().electrum_health();
        assert_eq!(health.try_recv(), Some(Health::Restarting));
        assert_eq!(
            health.try_recv(),
            Some(Health::Failure(BackendError::ServerShutdown))
        );
        assert_eq!(health.try_recv(), Some(Health::Restarting));
        assert_eq!(health.try_recv(), None);

        session.close().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_trigger_is_single_flight() {
        let cfg = roomy();
        let (wallet, _feeds) = FakeWallet::new(&cfg, []);
        let session = Session::open(Arc::clone(&wallet), cfg);

        let first = session.restart();
        let second = session.restart();

        assert_eq!(second.await.unwrap(), RetryOutcome::AlreadyRunning);
        assert_eq!(
            first.await.unwrap(),
            RetryOutcome::Completed { attempts: 1 }
        );
        assert_eq!(wallet.syncs(), 1);

        session.close().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_monitor_reports_and_restarts_on_server_shutdown() {
        let cfg = roomy();
        let (wallet, feeds) = FakeWallet::new(&cfg, []);
        let session = Session::open(Arc::clone(&wallet), cfg);

        let (tx, mut updates) = mpsc::unbounded_channel();
        session.spawn_status_monitor(move |u| {
            let _ = tx.send(u);
        });

        feeds.health.send(Health::Pong).await.unwrap();
        assert_eq!(
            updates.recv().await,
            Some(StatusUpdate::Indicator(Indicator::Green))
        );

        session.hub().show_toast("sent").await;
        assert_eq!(
            updates.recv().await,
            Some(StatusUpdate::Info("sent".into()))
        );

        feeds
            .health
            .send(Health::Failure(BackendError::ServerShutdown))
            .await
            .unwrap();
        assert_eq!(
            updates.recv().await,
            Some(StatusUpdate::Indicator(Indicator::Red))
        );

        let mut seen = Vec::new();
        while let Some(update) = updates.recv().await {
            let done = update == StatusUpdate::Connection(String::new());
            seen.push(update);
            if done {
                break;
            }
        }
        assert!(seen.contains(&StatusUpdate::Connection("Restarting...".into())));
        assert!(seen.contains(&StatusUpdate::Indicator(Indicator::Yellow)));
        assert_eq!(wallet.syncs(), 1);

        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_balance_monitor_follows_wallet_updates() {
        let cfg = roomy();
        let (wallet, feeds) = FakeWallet::new(&cfg, []);
        let session = Session::open(Arc::clone(&wallet), cfg);

        let (tx, mut balances) = mpsc::unbounded_channel();
        session.spawn_balance_monitor(move |b| {
            let _ = tx.send(b);
        });

        feeds
            .accounts
            .send(AccountNotification {
                account: 0,
                balance: 1.5,
            })
            .await
            .unwrap();
        assert_eq!(balances.recv().await, Some(wallet.balance()));

        session.close().await.unwrap();
        assert_eq!(session.hub().subscriber_count(), 0);
    }

    struct Screen {
        name: &'static str,
        destroyed: Arc<AtomicBool>,
    }

    impl Layout for Screen {
        fn name(&self) -> &str {
            self.name
        }

        fn destroy(&mut self) {
            self.destroyed.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_close_destroys_active_layout_only() {
        let cfg = roomy();
        let (wallet, _feeds) = FakeWallet::new(&cfg, []);
        let session = Session::open(wallet, cfg);

        let splash_gone = Arc::new(AtomicBool::new(false));
        let main_gone = Arc::new(AtomicBool::new(false));
        session.replace_layout(Box::new(Screen {
            name: "splash",
            destroyed: Arc::clone(&splash_gone),
        }));
        let previous = session.replace_layout(Box::new(Screen {
            name: "main",
            destroyed: Arc::clone(&main_gone),
        }));

        assert_eq!(previous.unwrap().name(), "splash");
        assert_eq!(session.layout_name().as_deref(), Some("main"));

        session.close().await.unwrap();
        assert!(main_gone.load(Ordering::SeqCst));
        assert!(!splash_gone.load(Ordering::SeqCst));
        assert!(session.layout_name().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_stops_restart_loop() {
        let cfg = Config {
            grace: Duration::from_secs(1),
            ..roomy()
        };
        let (wallet, _feeds) = FakeWallet::new(
            &cfg,
            std::iter::repeat_with(|| Err(BackendError::failed("down"))).take(1000),
        );
        let session = Session::open(wallet, cfg);

        let restart = session.restart();
        time::sleep(Duration::from_secs(20)).await;
        assert!(session.is_restarting());

        session.close().await.unwrap();
        assert!(matches!(
            restart.await.unwrap(),
            RetryOutcome::Abandoned { .. }
        ));
        assert!(!session.is_restarting());
        assert!(!session.ui().queue_update(|| {}));
    }

    #[tokio::test]
    async fn test_already_synced_wallet_is_not_resynchronized() {
        let cfg = roomy();
        let (wallet, _feeds) = FakeWallet::new(&cfg, []);
        wallet.synchronize().await.unwrap();
        let session = Session::open(Arc::clone(&wallet), cfg);
        let mut changes = session.hub().subscribe();

        assert!(session.start_sync().await.is_none());
        assert_eq!(wallet.syncs(), 1);
        assert!(changes.changed().await);

        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_dropped_session_shuts_hub_down() {
        let cfg = roomy();
        let (wallet, _feeds) = FakeWallet::new(&cfg, []);
        let session = Session::open(wallet, cfg);
        session.spawn_status_monitor(|_| {});
        session.spawn_balance_monitor(|_| {});

        let hub = Arc::clone(session.hub());
        let mut sub = hub.subscribe();
        drop(session);

        let closed = time::timeout(Duration::from_secs(1), sub.changed()).await;
        assert_eq!(closed, Ok(false));
        assert!(hub.is_shut_down());
        hub.wait_stopped().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_waits_one_grace_period() {
        let grace = Duration::from_secs(1);
        let cfg = Config { grace, ..roomy() };
        let (wallet, _feeds) = FakeWallet::new(&cfg, []);
        let session = Session::open(wallet, cfg);
        session.track("stuck", tokio::spawn(std::future::pending()));

        let start = time::Instant::now();
        match session.close().await {
            Err(HubError::GraceExceeded { stuck, .. }) => assert_eq!(stuck, vec!["stuck"]),
            other => panic!("unexpected result: {other:?}"),
        }
        let elapsed = start.elapsed();
        assert!(elapsed >= grace, "{elapsed:?}");
        assert!(elapsed < grace * 2, "{elapsed:?}");
    }

    #[tokio::test]
    async fn test_close_on_signal_returns_once_hub_stopped() {
        let cfg = roomy();
        let (wallet, _feeds) = FakeWallet::new(&cfg, []);
        let session = Session::open(wallet, cfg);
        let mut sub = session.hub().subscribe();

        session.hub().shutdown();
        let closed = time::timeout(Duration::from_secs(1), session.close_on_signal()).await;
        assert!(matches!(closed, Ok(Ok(()))));
        assert_eq!(sub.try_changed(), crate::Signal::Closed);
    }
}
