use std::{fs, path::PathBuf};

use core_types::types::UserId;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::{
    account::Account,
    config::LedgerConfig,
    error::Result,
    store::{AccountOrigin, AccountRecord, AccountStore, StagedWrite, StoreCore, Version},
};

#[derive(Serialize, Deserialize)]
struct AccountsFile {
    accounts: Vec<Account>,
}

/// Account store backed by a whole-file json snapshot, rewritten after every
/// committed mutation. Record versions are in-process only; the snapshot
/// persists accounts, not versions.
pub struct JsonAccountStore {
    core: RwLock<StoreCore>,
    path: PathBuf,
}

impl JsonAccountStore {
    /// Creates the state directory as needed and loads any existing
    /// snapshot; an unreadable snapshot starts the store empty.
    pub fn open(config: &LedgerConfig) -> Result<Self> {
        config.ensure_dirs()?;
        Self::load_or_init(config.accounts_path())
    }

    pub fn load_or_init(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let accounts = if path.exists() {
            let bytes = fs::read(&path)?;
            if bytes.is_empty() {
                Vec::new()
            } else {
                serde_json::from_slice::<AccountsFile>(&bytes)
                    .map(|f| f.accounts)
                    .unwrap_or_default()
            }
        } else {
            Vec::new()
        };
        Ok(Self {
            core: RwLock::new(StoreCore::from_accounts(accounts)),
            path,
        })
    }

    /// Rewrites the snapshot; runs under the caller's write guard so the
    /// file always reflects a committed state.
    fn persist(&self, core: &StoreCore) -> Result<()> {
        let file = AccountsFile {
            accounts: core.snapshot(),
        };
        let bytes = serde_json::to_vec_pretty(&file).expect("serialize accounts");
        fs::write(&self.path, bytes)?;
        Ok(())
    }
}

impl AccountStore for JsonAccountStore {
    fn find(&self, id: UserId) -> Result<Option<AccountRecord>> {
        Ok(self.core.read().find(id))
    }

    fn insert(&self, account: Account) -> Result<AccountRecord> {
        let mut core = self.core.write();
        let record = core.insert(account)?;
        self.persist(&core)?;
        Ok(record)
    }

    fn update(&self, expected_version: Version, account: Account) -> Result<AccountRecord> {
        let mut core = self.core.write();
        let record = core.update(expected_version, account)?;
        self.persist(&core)?;
        Ok(record)
    }

    fn get_or_create(&self, blank: Account) -> Result<(AccountRecord, AccountOrigin)> {
        let mut core = self.core.write();
        let (record, origin) = core.get_or_create(blank)?;
        if origin == AccountOrigin::Created {
            self.persist(&core)?;
        }
        Ok((record, origin))
    }

    fn commit_transfer(&self, debit: StagedWrite, credit: StagedWrite) -> Result<()> {
        let mut core = self.core.write();
        core.commit_transfer(debit, credit)?;
        self.persist(&core)
    }
}
