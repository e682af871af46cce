//! Test fixtures: a hub wired to hand-driven feeds and a scripted wallet.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::backend::{
    AccountNotification, Health, SpentnessNotifications, TransactionNotifications, Wallet,
    WatchStreams,
};
use crate::core::{Config, EventHub};
use crate::error::BackendError;

/// Sending ends of the raw backend sources.
pub(crate) struct Feeds {
    pub accounts: mpsc::Sender<AccountNotification>,
    pub transactions: mpsc::Sender<TransactionNotifications>,
    pub spentness: mpsc::Sender<SpentnessNotifications>,
    pub health: mpsc::Sender<Health>,
}

pub(crate) fn streams(cfg: &Config) -> (WatchStreams, Feeds) {
    let (acc_tx, accounts) = mpsc::channel(16);
    let (tx_tx, transactions) = mpsc::channel(16);
    let (sp_tx, spentness) = mpsc::channel(16);
    let (health_tx, health_rx) = cfg.health_channel();
    (
        WatchStreams {
            accounts,
            transactions,
            spentness,
            health_tx: health_tx.clone(),
            health_rx,
        },
        Feeds {
            accounts: acc_tx,
            transactions: tx_tx,
            spentness: sp_tx,
            health: health_tx,
        },
    )
}

pub(crate) fn hub_with(cfg: &Config) -> (Arc<EventHub>, Feeds) {
    let (streams, feeds) = streams(cfg);
    (EventHub::new(streams, cfg), feeds)
}

/// Wallet whose `synchronize` results are scripted up front.
///
/// Once the script runs out every call succeeds.
pub(crate) struct FakeWallet {
    streams: Mutex<Option<WatchStreams>>,
    script: Mutex<VecDeque<Result<(), BackendError>>>,
    syncs: AtomicU32,
    synced: AtomicBool,
}

impl FakeWallet {
    pub(crate) fn new(
        cfg: &Config,
        script: impl IntoIterator<Item = Result<(), BackendError>>,
    ) -> (Arc<Self>, Feeds) {
        let (streams, feeds) = streams(cfg);
        let wallet = Arc::new(Self {
            streams: Mutex::new(Some(streams)),
            script: Mutex::new(script.into_iter().collect()),
            syncs: AtomicU32::new(0),
            synced: AtomicBool::new(false),
        });
        (wallet, feeds)
    }

    pub(crate) fn syncs(&self) -> u32 {
        self.syncs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Wallet for FakeWallet {
    fn watch(&self) -> WatchStreams {
        self.streams
            .lock()
            .unwrap()
            .take()
            .expect("watch() called twice")
    }

    async fn synchronize(&self) -> Result<(), BackendError> {
        self.syncs.fetch_add(1, Ordering::SeqCst);
        let res = self.script.lock().unwrap().pop_front().unwrap_or(Ok(()));
        self.synced.store(res.is_ok(), Ordering::SeqCst);
        res
    }

    fn is_synced(&self) -> bool {
        self.synced.load(Ordering::SeqCst)
    }

    fn balance(&self) -> f64 {
        0.0
    }
}
