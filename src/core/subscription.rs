//! # Coalescing change subscriptions.
//!
//! Provides [`Subscription`], a single-slot "something changed" signal, and
//! the crate-internal [`Registry`] that fans a broadcast out to all of them.
//!
//! ## Architecture
//! ```text
//! broadcast()
//!     │
//!     ├──► [slot 1] ──► widget 1 re-reads wallet state
//!     │    (cap 1)
//!     ├──► [slot 2] ──► widget 2
//!     │    (cap 1)
//!     └──► [slot N] ──► widget N
//! ```
//!
//! ## Rules
//! - **Coalescing**: a slot holds at most one pending signal; a broadcast that
//!   finds the slot full is skipped for that subscriber
//! - **Non-blocking**: `broadcast()` uses `try_send` and returns immediately
//! - **Pruning**: slots whose [`Subscription`] was dropped are removed
//! - **Close**: `close()` drops every sender; readers observe the pending
//!   signal (if any) and then closure

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

/// Result of a non-blocking look at a [`Subscription`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Something changed since the last read.
    Changed,
    /// Nothing pending.
    Idle,
    /// The hub shut down.
    Closed,
}

/// Receive end of a single-slot change signal.
///
/// Obtained from [`EventHub::subscribe`](crate::EventHub::subscribe). Reading
/// the signal consumes it; the next broadcast refills the slot.
#[derive(Debug)]
pub struct Subscription {
    rx: mpsc::Receiver<()>,
}

impl Subscription {
    /// Waits until something changed.
    ///
    /// Returns `false` once the hub has shut down.
    pub async fn changed(&mut self) -> bool {
        self.rx.recv().await.is_some()
    }

    /// Consumes a pending signal without waiting.
    pub fn try_changed(&mut self) -> Signal {
        match self.rx.try_recv() {
            Ok(()) => Signal::Changed,
            Err(mpsc::error::TryRecvError::Empty) => Signal::Idle,
            Err(mpsc::error::TryRecvError::Disconnected) => Signal::Closed,
        }
    }
}

#[derive(Default)]
struct Slots {
    senders: Vec<mpsc::Sender<()>>,
    closed: bool,
}

/// Registry of live subscription slots.
#[derive(Default)]
pub(crate) struct Registry {
    slots: Mutex<Slots>,
}

impl Registry {
    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Allocates and registers a new slot.
    ///
    /// After [`close`](Self::close) the returned subscription is already closed.
    pub(crate) fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel(1);
        let mut slots = self.lock();
        if !slots.closed {
            slots.senders.push(tx);
        }
        Subscription { rx }
    }

    /// Signals every slot that is not already pending.
    ///
    /// Returns the number of slots that received a fresh signal.
    pub(crate) fn broadcast(&self) -> usize {
        let mut delivered = 0;
        // try_send never waits, so holding the lock across the loop is fine.
        self.lock().senders.retain(|tx| match tx.try_send(()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(mpsc::error::TrySendError::Full(())) => true,
            Err(mpsc::error::TrySendError::Closed(())) => false,
        });
        delivered
    }

    /// Drops every sender; no slot is registered afterwards.
    ///
    /// Returns the number of slots that were closed.
    pub(crate) fn close(&self) -> usize {
        let mut slots = self.lock();
        slots.closed = true;
        std::mem::take(&mut slots.senders).len()
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().senders.len()
    }
}
