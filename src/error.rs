//! Error types used by the syncvisor runtime and its backend collaborator.
//!
//! This module defines two main error enums:
//!
//! - [`HubError`]: errors raised by the coordination layer itself.
//! - [`BackendError`]: errors raised by the wallet backend (synchronization,
//!   connection health).
//!
//! Both types provide an `as_label` helper for logging.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the coordination layer.
///
/// These represent failures of the hub itself, such as background tasks
/// outliving the shutdown grace period.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum HubError {
    /// Shutdown grace period was exceeded; some background tasks were still running.
    #[error("shutdown grace {grace:?} exceeded; stuck: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of the background tasks that did not stop in time.
        stuck: Vec<&'static str>,
    },
}

impl HubError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use syncvisor::HubError;
    /// use std::time::Duration;
    ///
    /// let err = HubError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "hub_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            HubError::GraceExceeded { .. } => "hub_grace_exceeded",
        }
    }
}

/// # Errors produced by the wallet backend.
///
/// The hub and supervisor never interpret these; they are forwarded verbatim
/// on the health stream. Observers decide what each one means for the UI.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The remote server announced it is going away.
    #[error("server shutdown")]
    ServerShutdown,

    /// Connection to the remote server was lost or could not be established.
    #[error("disconnected: {reason}")]
    Disconnected {
        /// Transport-level description.
        reason: String,
    },

    /// The wallet is not opened yet.
    #[error("wallet not opened")]
    NotOpened,

    /// Any other backend failure.
    #[error("backend failure: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },
}

impl BackendError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use syncvisor::BackendError;
    ///
    /// let err = BackendError::Disconnected { reason: "reset by peer".into() };
    /// assert_eq!(err.as_label(), "backend_disconnected");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            BackendError::ServerShutdown => "backend_server_shutdown",
            BackendError::Disconnected { .. } => "backend_disconnected",
            BackendError::NotOpened => "backend_not_opened",
            BackendError::Failed { .. } => "backend_failed",
        }
    }

    /// Shorthand for building a [`BackendError::Failed`].
    pub fn failed(error: impl Into<String>) -> Self {
        BackendError::Failed {
            error: error.into(),
        }
    }

    /// Whether the server announced its own shutdown.
    pub fn is_server_shutdown(&self) -> bool {
        matches!(self, BackendError::ServerShutdown)
    }
}
