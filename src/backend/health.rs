//! # Connection health signals.
//!
//! [`Health`] is what flows on the health stream: the backend writes its own
//! pings and failures there, and the retry supervisor adds the failures of the
//! operations it runs. The hub forwards them verbatim.
//!
//! [`Indicator`] is the observer-side reading of a signal (the colored dot in
//! a status bar). Classification lives here, next to the observers, and is
//! never performed by the hub or the supervisor.

use crate::error::BackendError;

/// Typed connection-health condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Health {
    /// Backend answered a health probe.
    Pong,
    /// A reconnect is in progress.
    Restarting,
    /// Backend reported, or an operation hit, a failure.
    Failure(BackendError),
}

impl Health {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Health::Pong => "health_pong",
            Health::Restarting => "health_restarting",
            Health::Failure(e) => e.as_label(),
        }
    }

    /// Observer reading of this signal.
    pub fn indicator(&self) -> Indicator {
        match self {
            Health::Pong => Indicator::Green,
            Health::Restarting => Indicator::Yellow,
            Health::Failure(_) => Indicator::Red,
        }
    }

    /// Whether an observer should start a supervised reconnect on this signal.
    pub fn requests_restart(&self) -> bool {
        matches!(self, Health::Failure(e) if e.is_server_shutdown())
    }
}

impl From<BackendError> for Health {
    fn from(e: BackendError) -> Self {
        Health::Failure(e)
    }
}

/// Status-bar reading of a [`Health`] signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Green,
    Yellow,
    Red,
}
