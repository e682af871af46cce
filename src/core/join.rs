//! Bounded join of named background tasks.

use std::time::Duration;

use futures::future::join_all;
use tokio::{task::JoinHandle, time};
use tracing::warn;

use crate::error::HubError;

/// A background task tracked under a stable name.
pub(crate) type Tracked = (&'static str, JoinHandle<()>);

/// Waits up to `grace` for every task; aborts and reports the stragglers.
pub(crate) async fn join_with_grace(
    mut tasks: Vec<Tracked>,
    grace: Duration,
) -> Result<(), HubError> {
    let joined = time::timeout(grace, join_all(tasks.iter_mut().map(|(_, handle)| handle))).await;
    if joined.is_ok() {
        return Ok(());
    }

    let stuck: Vec<&'static str> = tasks
        .iter()
        .filter(|(_, handle)| !handle.is_finished())
        .map(|(name, handle)| {
            handle.abort();
            *name
        })
        .collect();
    warn!(?grace, ?stuck, "background tasks outlived shutdown");
    Err(HubError::GraceExceeded { grace, stuck })
}
