//! Session layer: one open wallet wired to its hub, supervisor and UI queue.
//!
//! - [`session`]: [`Session`] lifecycle, status and balance monitors;
//! - [`dispatch`]: single-writer UI command queue;
//! - [`layout`]: ownership of the active top-level layout.

mod dispatch;
mod layout;
#[allow(clippy::module_inception)]
mod session;

pub use dispatch::{UiCommand, UiQueue, UiWorker, ui_queue};
pub use layout::Layout;
pub use session::{Session, StatusUpdate};
