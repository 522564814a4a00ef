//! Account ledger for the gacha economy.
//!
//! The crate exposes:
//! - [`Account`]: the per-user record (tier counts, balance, hourly window).
//! - [`AccountStore`]: the seam the economy service mutates accounts through.
//! - [`MemoryAccountStore`] / [`JsonAccountStore`]: in-memory and
//!   json-file-backed implementations sharing one versioned core.

pub mod account;
pub mod config;
pub mod error;
pub mod json;
pub mod store;

pub use account::{Account, next_window_reset};
pub use config::LedgerConfig;
pub use error::{LedgerError, Result};
pub use json::JsonAccountStore;
pub use store::{
    AccountOrigin, AccountRecord, AccountStore, MemoryAccountStore, StagedWrite, Version,
};
