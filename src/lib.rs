//! # syncvisor
//!
//! **Syncvisor** is the session coordination core of a terminal wallet
//! frontend.
//!
//! It decouples the wallet backend's raw update sources from any number of UI
//! widgets, carries transient status texts and connection-health signals to the
//! status bar, and re-establishes the backend connection with a single-flight
//! retry loop when it drops.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────────────────────────────────────────────────────┐
//!     │  Wallet (backend, supplied by the caller)                    │
//!     │  watch() ─► WatchStreams     synchronize()     balance()     │
//!     └──────┬──────────────────────────────┬──────────────────┬─────┘
//!            ▼                              │                  │
//! ┌────────────────────────────────────┐    │                  │
//! │  EventHub                          │    │                  │
//! │  - listener (accounts/tx/spent)    │    │                  │
//! │  - Registry ─► Subscription 1..N   │◄───┼── RetrySupervisor│
//! │  - toast / electrum_toast          │    │   (narrates)     │
//! │  - electrum_health                 │    │                  │
//! └──────┬─────────────────────────────┘    │                  │
//!        ▼                                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Session                                                          │
//! │  - start_sync / restart (single-flight, Fibonacci backoff)        │
//! │  - status monitor ─► StatusUpdate ─┐                              │
//! │  - balance monitor ─► f64 ─────────┼─► UiQueue ─► UiWorker (1)    │
//! │  - active Layout                   │                              │
//! └────────────────────────────────────┴──────────────────────────────┘
//! ```
//!
//! ### Reconnect loop
//! ```text
//! RetrySupervisor::try_run(op, hub)
//!   ├─► already running ─► AlreadyRunning
//!   └─► loop {
//!         ├─► op.run()
//!         │     ├─ Ok  ─► electrum_toast "" ─► Completed
//!         │     └─ Err ─► electrum_health Failure(err)
//!         │               ├─ electrum_toast "Retrying in {delay}..."
//!         │               └─ sleep(delay)   1s, 1s, 2s, 3s, 5s, ... ≤ 30s
//!         └─ hub shut down ─► Abandoned
//!       }
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                        |
//! |-------------------|---------------------------------------------------------------|-------------------------------------------|
//! | **Fan-out**       | Coalescing wallet-update signals, toasts, health signals.     | [`EventHub`], [`Subscription`], [`Inbox`] |
//! | **Supervision**   | Single-flight retry of a fallible operation.                  | [`RetrySupervisor`], [`RetryOutcome`]     |
//! | **Policies**      | Fibonacci backoff with a cap.                                 | [`BackoffPolicy`]                         |
//! | **Operations**    | Units of work the supervisor repeats.                         | [`Operation`], [`OperationFn`]            |
//! | **Backend**       | Contract the wallet service implements.                       | [`Wallet`], [`WatchStreams`], [`Health`]  |
//! | **Session**       | Lifecycle of one open wallet and its UI plumbing.             | [`Session`], [`UiQueue`], [`Layout`]      |
//! | **Errors**        | Typed backend and teardown errors.                            | [`BackendError`], [`HubError`]            |
//! | **Configuration** | Buffer sizes, backoff, delays, grace period.                  | [`Config`]                                |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use std::time::Duration;
//! use syncvisor::{
//!     BackendError, BackoffPolicy, Config, EventHub, OperationFn, OperationRef,
//!     RetryOutcome, RetrySupervisor, WatchStreams,
//! };
//! use tokio::sync::mpsc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let cfg = Config::default();
//!     let (_acc_tx, accounts) = mpsc::channel(8);
//!     let (_tx_tx, transactions) = mpsc::channel(8);
//!     let (_sp_tx, spentness) = mpsc::channel(8);
//!     let (health_tx, health_rx) = cfg.health_channel();
//!     let hub = EventHub::new(
//!         WatchStreams { accounts, transactions, spentness, health_tx, health_rx },
//!         &cfg,
//!     );
//!
//!     // Fails once, then connects.
//!     let tries = Arc::new(AtomicU32::new(0));
//!     let connect: OperationRef = OperationFn::arc("connect", move || {
//!         let tries = Arc::clone(&tries);
//!         async move {
//!             if tries.fetch_add(1, Ordering::SeqCst) == 0 {
//!                 Err(BackendError::failed("connection refused"))
//!             } else {
//!                 Ok(())
//!             }
//!         }
//!     });
//!
//!     let sup = RetrySupervisor::new(BackoffPolicy {
//!         unit: Duration::from_millis(10),
//!         max: Duration::from_millis(100),
//!     });
//!     let out = sup.try_run(connect.as_ref(), &hub).await;
//!     assert_eq!(out, RetryOutcome::Completed { attempts: 2 });
//!
//!     hub.shutdown();
//!     hub.wait_stopped().await.unwrap();
//! }
//! ```
mod backend;
mod core;
mod error;
mod operations;
mod policies;
mod session;

#[cfg(test)]
mod testing;

// ---- Public re-exports ----

pub use backend::{
    AccountNotification, Health, Indicator, SpentnessNotifications, TransactionNotifications,
    Wallet, WatchStreams,
};
pub use core::{
    Config, EventHub, Inbox, RetryOutcome, RetrySupervisor, Signal, Subscription,
};
pub use error::{BackendError, HubError};
pub use operations::{Operation, OperationFn, OperationRef};
pub use policies::{BackoffPolicy, Fibonacci};
pub use session::{Layout, Session, StatusUpdate, UiCommand, UiQueue, UiWorker, ui_queue};
