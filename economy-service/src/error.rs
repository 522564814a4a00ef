use ledger::LedgerError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EconomyError>;

#[derive(Debug, Error)]
pub enum EconomyError {
    /// Optimistic writes kept colliding after bounded retries; transient.
    #[error("ledger contention persisted after {attempts} attempts")]
    Contention { attempts: usize },
    /// An account that was just read vanished on write. Store detail is
    /// logged, never surfaced to the end user.
    #[error("internal ledger inconsistency")]
    Internal,
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl EconomyError {
    pub(crate) fn is_contention(&self) -> bool {
        matches!(self, EconomyError::Ledger(err) if err.is_contention())
    }
}
