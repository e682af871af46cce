//! # Read-only receive ends of hub channels.
//!
//! [`Inbox`] is a cloneable handle over a single `mpsc::Receiver`. Clones
//! compete for messages (each message is delivered to exactly one reader), so
//! in practice one redraw consumer drains each inbox.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};

/// Cloneable, receive-only view of a hub channel.
pub struct Inbox<T> {
    rx: Arc<Mutex<mpsc::Receiver<T>>>,
}

impl<T> Clone for Inbox<T> {
    fn clone(&self) -> Self {
        Self {
            rx: Arc::clone(&self.rx),
        }
    }
}

impl<T> Inbox<T> {
    pub(crate) fn new(rx: mpsc::Receiver<T>) -> Self {
        Self {
            rx: Arc::new(Mutex::new(rx)),
        }
    }

    /// Waits for the next message.
    ///
    /// Returns `None` once every sender is gone and the buffer is drained.
    pub async fn recv(&self) -> Option<T> {
        self.rx.lock().await.recv().await
    }

    /// Takes a buffered message without waiting.
    ///
    /// Returns `None` when the buffer is empty or another reader holds the
    /// receiver.
    pub fn try_recv(&self) -> Option<T> {
        self.rx.try_lock().ok()?.try_recv().ok()
    }
}
