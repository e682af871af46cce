//! # Session-wide configuration.
//!
//! Provides [`Config`] centralized settings for the hub, the retry supervisor
//! and the session built on top of them.
//!
//! ## Sentinel values
//! - capacities of `0` are clamped to `1` (tokio channels cannot be zero-sized)

use std::time::Duration;

use tokio::sync::mpsc;

use crate::backend::Health;
use crate::policies::BackoffPolicy;

/// Configuration for one session.
///
/// ## Field semantics
/// - `toast_capacity`: buffered transient UI messages before `show_toast` waits
/// - `health_toast_capacity`: buffered connection-status texts
/// - `health_capacity`: buffered health signals (`1` = closest to a rendezvous channel)
/// - `backoff`: delay schedule between failed attempts
/// - `restart_delay`: pause between "Restarting..." and the resync attempt
/// - `grace`: how long [`EventHub::wait_stopped`](crate::EventHub::wait_stopped) waits
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the transient toast channel.
    pub toast_capacity: usize,

    /// Capacity of the connection-status text channel.
    pub health_toast_capacity: usize,

    /// Capacity of the health channel created by [`Config::health_channel`].
    ///
    /// Only relevant to backends that let the session build the health
    /// stream; a backend supplying its own keeps its own capacity.
    pub health_capacity: usize,

    /// Backoff schedule used by the retry supervisor.
    pub backoff: BackoffPolicy,

    /// Delay inserted by a session restart before resynchronizing.
    pub restart_delay: Duration,

    /// Maximum time to wait for background tasks after hub shutdown.
    pub grace: Duration,
}

impl Config {
    /// Toast capacity clamped to a minimum of 1.
    #[inline]
    pub fn toast_capacity_clamped(&self) -> usize {
        self.toast_capacity.max(1)
    }

    /// Health-toast capacity clamped to a minimum of 1.
    #[inline]
    pub fn health_toast_capacity_clamped(&self) -> usize {
        self.health_toast_capacity.max(1)
    }

    /// Builds a health channel with the configured (clamped) capacity.
    pub fn health_channel(&self) -> (mpsc::Sender<Health>, mpsc::Receiver<Health>) {
        mpsc::channel(self.health_capacity.max(1))
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `toast_capacity = 5`
    /// - `health_toast_capacity = 5`
    /// - `health_capacity = 1`
    /// - `backoff = BackoffPolicy::default()` (1s unit, 30s cap)
    /// - `restart_delay = 2s`
    /// - `grace = 5s`
    fn default() -> Self {
        Self {
            toast_capacity: 5,
            health_toast_capacity: 5,
            health_capacity: 1,
            backoff: BackoffPolicy::default(),
            restart_delay: Duration::from_secs(2),
            grace: Duration::from_secs(5),
        }
    }
}
