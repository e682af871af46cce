//! # Backend collaborator contract.
//!
//! Types the coordination core shares with the externally supplied wallet
//! service:
//! - [`Wallet`] - async trait the session drives
//! - [`WatchStreams`] - the raw update sources handed over at session open
//! - [`Health`] / [`Indicator`] - connection-health signals and their reading

mod health;
mod wallet;

pub use health::{Health, Indicator};
pub use wallet::{
    AccountNotification, SpentnessNotifications, TransactionNotifications, Wallet, WatchStreams,
};
