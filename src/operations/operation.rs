//! # Operation abstraction.
//!
//! An [`Operation`] is what the [`RetrySupervisor`](crate::RetrySupervisor)
//! repeats until it succeeds: typically "resynchronize with the backend". The
//! supervisor only looks at `Ok`/`Err`; the error itself is forwarded to the
//! health stream untouched.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::BackendError;

/// Shared handle to an operation.
pub type OperationRef = Arc<dyn Operation>;

/// # Async, fallible, repeatable unit.
///
/// Each call to [`run`](Operation::run) is one attempt. Implementations must be
/// safe to call again after a failure.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use syncvisor::{BackendError, Operation};
///
/// struct Resync;
///
/// #[async_trait]
/// impl Operation for Resync {
///     fn name(&self) -> &str { "resync" }
///
///     async fn run(&self) -> Result<(), BackendError> {
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Operation: Send + Sync + 'static {
    /// Returns a stable, human-readable name (for logs).
    fn name(&self) -> &str;

    /// Performs one attempt.
    async fn run(&self) -> Result<(), BackendError>;
}
