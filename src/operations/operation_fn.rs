//! # Function-backed operation (`OperationFn`)
//!
//! [`OperationFn`] wraps a closure `F: Fn() -> Fut`, producing a fresh future
//! per attempt. No state is carried between attempts; if an attempt needs
//! shared state, capture an `Arc<...>` in the closure explicitly.
//!
//! ## Example
//! ```rust
//! use syncvisor::{BackendError, OperationFn, OperationRef};
//!
//! let op: OperationRef = OperationFn::arc("resync", || async {
//!     Ok::<_, BackendError>(())
//! });
//!
//! assert_eq!(op.name(), "resync");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::BackendError;
use crate::operations::Operation;

/// Function-backed operation.
#[derive(Debug)]
pub struct OperationFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> OperationFn<F> {
    /// Creates a new function-backed operation.
    ///
    /// Prefer [`OperationFn::arc`] when you immediately need an [`OperationRef`](crate::OperationRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the operation and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Operation for OperationFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BackendError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self) -> Result<(), BackendError> {
        (self.f)().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::operations::OperationRef;

    #[tokio::test]
    async fn test_fresh_future_per_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let op: OperationRef = OperationFn::arc("count", move || {
            let c = Arc::clone(&c);
            async move {
                if c.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(BackendError::failed("first"))
                } else {
                    Ok(())
                }
            }
        });

        assert_eq!(op.run().await, Err(BackendError::failed("first")));
        assert_eq!(op.run().await, Ok(()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(op.name(), "count");
    }
}
