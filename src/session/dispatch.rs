//! # Single-writer UI command queue.
//!
//! Background tasks never touch the display directly. They submit closures to
//! a [`UiQueue`]; one [`UiWorker`] runs them in submission order, so exactly
//! one task writes to the display.
//!
//! ```text
//! status monitor ──┐
//! balance monitor ─┼──► UiQueue (unbounded) ──► UiWorker::run ──► f()
//! widget callback ─┘                            (one task)
//! ```

use std::future::Future;

use tokio::sync::mpsc;
use tracing::debug;

/// A deferred display update.
pub type UiCommand = Box<dyn FnOnce() + Send + 'static>;

/// Submitting end of the UI command queue. Cheap to clone.
#[derive(Clone)]
pub struct UiQueue {
    tx: mpsc::UnboundedSender<UiCommand>,
}

/// Draining end of the UI command queue.
pub struct UiWorker {
    rx: mpsc::UnboundedReceiver<UiCommand>,
}

/// Creates a connected queue/worker pair.
pub fn ui_queue() -> (UiQueue, UiWorker) {
    let (tx, rx) = mpsc::unbounded_channel();
    (UiQueue { tx }, UiWorker { rx })
}

impl UiQueue {
    /// Submits a display update; never waits.
    ///
    /// Returns `false` if the worker has stopped and the update was dropped.
    pub fn queue_update(&self, f: impl FnOnce() + Send + 'static) -> bool {
        self.tx.send(Box::new(f)).is_ok()
    }
}

impl UiWorker {
    /// Runs queued updates one at a time until `stop` resolves or every
    /// [`UiQueue`] is dropped.
    ///
    /// Returns the number of updates that ran.
    pub async fn run(mut self, stop: impl Future<Output = ()>) -> usize {
        tokio::pin!(stop);
        let mut ran = 0;
        loop {
            tokio::select! {
                biased;
                _ = &mut stop => break,
                cmd = self.rx.recv() => match cmd {
                    Some(cmd) => {
                        cmd();
                        ran += 1;
                    }
                    None => break,
                },
            }
        }
        debug!(ran, "ui worker stopped");
        ran
    }
}
