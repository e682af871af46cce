//! # Active layout ownership.
//!
//! A session shows at most one top-level [`Layout`]. The [`LayoutSlot`] owns
//! it; swapping layouts hands the previous one back to the caller instead of
//! overwriting a shared pointer.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Top-level screen owned by a session.
pub trait Layout: Send + 'static {
    /// Stable name, for logs.
    fn name(&self) -> &str;

    /// Releases resources (stops the layout's own watchers).
    ///
    /// Called by the session when it closes while this layout is active.
    fn destroy(&mut self) {}
}

/// Holds the active layout, if any.
#[derive(Default)]
pub(crate) struct LayoutSlot {
    active: Mutex<Option<Box<dyn Layout>>>,
}

impl LayoutSlot {
    fn lock(&self) -> MutexGuard<'_, Option<Box<dyn Layout>>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Installs `next` and returns the previously active layout.
    pub(crate) fn replace(&self, next: Box<dyn Layout>) -> Option<Box<dyn Layout>> {
        self.lock().replace(next)
    }

    /// Removes and returns the active layout.
    pub(crate) fn take(&self) -> Option<Box<dyn Layout>> {
        self.lock().take()
    }

    /// Name of the active layout.
    pub(crate) fn active_name(&self) -> Option<String> {
        self.lock().as_ref().map(|l| l.name().to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    impl Layout for Named {
        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_replace_hands_back_previous() {
        let slot = LayoutSlot::default();
        assert!(slot.replace(Box::new(Named("splash"))).is_none());

        let prev = slot.replace(Box::new(Named("wallet"))).unwrap();
        assert_eq!(prev.name(), "splash");
        assert_eq!(slot.active_name().as_deref(), Some("wallet"));

        assert_eq!(slot.take().unwrap().name(), "wallet");
        assert!(slot.active_name().is_none());
    }
}
