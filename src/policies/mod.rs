//! Retry policies.
//!
//! This module groups the knobs that control **how long** the supervisor waits
//! between reconnect attempts.
//!
//! ## Contents
//! - [`BackoffPolicy`] how retry delays evolve (unit / max)
//! - [`Fibonacci`]     the capped delay sequence a policy produces
//!
//! ## Quick wiring
//! ```text
//! Config { backoff: BackoffPolicy, .. }
//!      └─► core::supervisor::RetrySupervisor uses:
//!           - backoff.iter() restarted on every try_run()
//! ```
//!
//! ## Defaults
//! - `BackoffPolicy::default()` → unit=1s, max=30s.

mod backoff;

pub use backoff::{BackoffPolicy, Fibonacci};
