use core_types::types::UserId;
use thiserror::Error;

use crate::store::Version;

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("account {id} already exists")]
    AlreadyExists { id: UserId },
    #[error("account {id} not found")]
    NotFound { id: UserId },
    #[error("version conflict for account {id}: expected {expected}, actual {actual}")]
    VersionConflict {
        id: UserId,
        expected: Version,
        actual: Version,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    /// Whether a retry after re-reading current state can succeed: another
    /// writer moved the record (or created it) between read and write.
    pub fn is_contention(&self) -> bool {
        matches!(
            self,
            LedgerError::VersionConflict { .. } | LedgerError::AlreadyExists { .. }
        )
    }
}
