use std::collections::HashMap;

use core_types::types::UserId;
use parking_lot::RwLock;

use crate::{
    account::Account,
    error::{LedgerError, Result},
};

/// In-process record version used for optimistic concurrency; bumped on
/// every committed write.
pub type Version = u64;

#[derive(Debug, Clone, PartialEq)]
pub struct AccountRecord {
    pub version: Version,
    pub account: Account,
}

/// Whether `get_or_create` found the record or made it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountOrigin {
    Existing,
    Created,
}

/// One guarded write inside a compound commit. `expected_version: None`
/// stages an insert that must not find an existing record.
#[derive(Debug, Clone)]
pub struct StagedWrite {
    pub expected_version: Option<Version>,
    pub account: Account,
}

/// The seam the economy service mutates accounts through. Every write is
/// guarded: either by absence (insert) or by the version observed at read
/// time, so lost updates surface as [`LedgerError::VersionConflict`] instead
/// of silently clobbering concurrent writers.
pub trait AccountStore: Send + Sync {
    fn find(&self, id: UserId) -> Result<Option<AccountRecord>>;

    fn insert(&self, account: Account) -> Result<AccountRecord>;

    /// Guarded replace of `account.id`'s record. Fails with `VersionConflict`
    /// when the record moved since it was read and `NotFound` when it is
    /// missing entirely.
    fn update(&self, expected_version: Version, account: Account) -> Result<AccountRecord>;

    /// Finds `blank.id`'s record, persisting `blank` when absent.
    fn get_or_create(&self, blank: Account) -> Result<(AccountRecord, AccountOrigin)>;

    /// Applies debit and credit as one atomic unit: both guards are checked
    /// before either write lands, so no partial transfer is ever observable.
    fn commit_transfer(&self, debit: StagedWrite, credit: StagedWrite) -> Result<()>;
}

/// Versioned account map shared by the store implementations; all methods
/// run under the caller's lock.
pub(crate) struct StoreCore {
    accounts: HashMap<UserId, AccountRecord>,
}

impl StoreCore {
    pub(crate) fn new() -> Self {
        Self {
            accounts: HashMap::new(),
        }
    }

    /// Rebuilds the map from a persisted snapshot. Versions restart at 1:
    /// they guard in-process read-modify-write cycles, not durability.
    pub(crate) fn from_accounts(accounts: Vec<Account>) -> Self {
        Self {
            accounts: accounts
                .into_iter()
                .map(|account| {
                    (
                        account.id,
                        AccountRecord {
                            version: 1,
                            account,
                        },
                    )
                })
                .collect(),
        }
    }

    pub(crate) fn find(&self, id: UserId) -> Option<AccountRecord> {
        self.accounts.get(&id).cloned()
    }

    pub(crate) fn insert(&mut self, account: Account) -> Result<AccountRecord> {
        if self.accounts.contains_key(&account.id) {
            return Err(LedgerError::AlreadyExists { id: account.id });
        }
        let record = AccountRecord {
            version: 1,
            account,
        };
        self.accounts.insert(record.account.id, record.clone());
        Ok(record)
    }

    pub(crate) fn update(
        &mut self,
        expected_version: Version,
        account: Account,
    ) -> Result<AccountRecord> {
        let id = account.id;
        let current = self
            .accounts
            .get_mut(&id)
            .ok_or(LedgerError::NotFound { id })?;
        if current.version != expected_version {
            return Err(LedgerError::VersionConflict {
                id,
                expected: expected_version,
                actual: current.version,
            });
        }
        current.version += 1;
        current.account = account;
        Ok(current.clone())
    }

    pub(crate) fn get_or_create(
        &mut self,
        blank: Account,
    ) -> Result<(AccountRecord, AccountOrigin)> {
        if let Some(record) = self.accounts.get(&blank.id) {
            return Ok((record.clone(), AccountOrigin::Existing));
        }
        let record = self.insert(blank)?;
        Ok((record, AccountOrigin::Created))
    }

    fn check_staged(&self, staged: &StagedWrite) -> Result<()> {
        let id = staged.account.id;
        match (staged.expected_version, self.accounts.get(&id)) {
            (None, None) => Ok(()),
            (None, Some(_)) => Err(LedgerError::AlreadyExists { id }),
            (Some(_), None) => Err(LedgerError::NotFound { id }),
            (Some(expected), Some(current)) if current.version != expected => {
                Err(LedgerError::VersionConflict {
                    id,
                    expected,
                    actual: current.version,
                })
            }
            (Some(_), Some(_)) => Ok(()),
        }
    }

    fn apply_staged(&mut self, staged: StagedWrite) {
        let id = staged.account.id;
        let version = staged.expected_version.map(|v| v + 1).unwrap_or(1);
        self.accounts.insert(
            id,
            AccountRecord {
                version,
                account: staged.account,
            },
        );
    }

    pub(crate) fn commit_transfer(
        &mut self,
        debit: StagedWrite,
        credit: StagedWrite,
    ) -> Result<()> {
        self.check_staged(&debit)?;
        self.check_staged(&credit)?;
        self.apply_staged(debit);
        self.apply_staged(credit);
        Ok(())
    }

    /// Stable-ordered snapshot for persistence.
    pub(crate) fn snapshot(&self) -> Vec<Account> {
        let mut accounts: Vec<Account> = self
            .accounts
            .values()
            .map(|record| record.account.clone())
            .collect();
        accounts.sort_by_key(|account| account.id);
        accounts
    }
}

/// Purely in-process store; state dies with the process.
pub struct MemoryAccountStore {
    core: RwLock<StoreCore>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self {
            core: RwLock::new(StoreCore::new()),
        }
    }
}

impl Default for MemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountStore for MemoryAccountStore {
    fn find(&self, id: UserId) -> Result<Option<AccountRecord>> {
        Ok(self.core.read().find(id))
    }

    fn insert(&self, account: Account) -> Result<AccountRecord> {
        self.core.write().insert(account)
    }

    fn update(&self, expected_version: Version, account: Account) -> Result<AccountRecord> {
        self.core.write().update(expected_version, account)
    }

    fn get_or_create(&self, blank: Account) -> Result<(AccountRecord, AccountOrigin)> {
        self.core.write().get_or_create(blank)
    }

    fn commit_transfer(&self, debit: StagedWrite, credit: StagedWrite) -> Result<()> {
        self.core.write().commit_transfer(debit, credit)
    }
}
