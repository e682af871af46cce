//! Runtime core: notification fan-out and supervised reconnects.
//!
//! The public API from this module is [`EventHub`] (fan-out, status channels,
//! shutdown) and [`RetrySupervisor`] (single-flight retry loop), plus their
//! [`Config`].
//!
//! Internal modules:
//! - [`hub`]: update listener, subscription fan-out, toast/health channels;
//! - [`subscription`]: single-slot coalescing signals and their registry;
//! - [`inbox`]: read-only receive ends handed to UI consumers;
//! - [`join`]: bounded join of background tasks after shutdown;
//! - [`supervisor`]: single-flight retry loop with Fibonacci backoff;
//! - [`shutdown`]: cross-platform termination signal handling;
//! - [`config`]: session-wide settings.

mod config;
mod hub;
mod inbox;
mod join;
mod shutdown;
mod subscription;
mod supervisor;

pub use config::Config;
pub use hub::EventHub;
pub use inbox::Inbox;
pub(crate) use join::{Tracked, join_with_grace};
pub(crate) use shutdown::wait_for_shutdown_signal;
pub use subscription::{Signal, Subscription};
pub use supervisor::{RetryOutcome, RetrySupervisor};
