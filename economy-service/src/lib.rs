//! Economy service: mediates every account mutation of the gacha economy.
//!
//! The service owns the hourly earning window, the roll settlement path, and
//! the two-sided transfer protocol with its confirmation wait. It holds no
//! state between invocations; each call re-reads current account state from
//! the injected [`ledger::AccountStore`].

mod confirm;
mod error;
mod outcome;
mod service;

pub use confirm::{ConfirmToken, ConfirmationSource};
pub use error::{EconomyError, Result};
pub use outcome::{
    ProfileView, RollOutcome, TransferOutcome, TransferRejection, TransferRequest,
};
pub use service::EconomyService;
