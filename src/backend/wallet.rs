//! # Wallet backend contract.
//!
//! The coordination core consumes an externally supplied wallet service only
//! through the [`Wallet`] trait. The service hands over its raw update sources
//! once, as [`WatchStreams`], when the session opens.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::backend::Health;
use crate::error::BackendError;

/// Account balance changed.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountNotification {
    /// Account number.
    pub account: u32,
    /// New confirmed balance, in whole coins.
    pub balance: f64,
}

/// One or more wallet transactions were added or confirmed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionNotifications {
    /// Hex-encoded transaction hashes.
    pub hashes: Vec<String>,
}

/// Outputs owned by the wallet were spent or unspent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpentnessNotifications {
    /// `txid:vout` of every affected output.
    pub outpoints: Vec<String>,
}

/// Raw update sources exposed by the backend.
///
/// The health stream is handed over as both ends: the backend keeps its own
/// sender clone, and the hub keeps `health_tx` so supervised operations can
/// report on the same stream.
pub struct WatchStreams {
    pub accounts: mpsc::Receiver<AccountNotification>,
    pub transactions: mpsc::Receiver<TransactionNotifications>,
    pub spentness: mpsc::Receiver<SpentnessNotifications>,
    pub health_tx: mpsc::Sender<Health>,
    pub health_rx: mpsc::Receiver<Health>,
}

/// Wallet service as seen by the session.
#[async_trait]
pub trait Wallet: Send + Sync + 'static {
    /// Hands over the raw update sources.
    ///
    /// Called once per session.
    fn watch(&self) -> WatchStreams;

    /// Resynchronizes with the remote server.
    async fn synchronize(&self) -> Result<(), BackendError>;

    /// Whether the last synchronization completed.
    fn is_synced(&self) -> bool;

    /// Confirmed balance, in whole coins.
    fn balance(&self) -> f64;
}
