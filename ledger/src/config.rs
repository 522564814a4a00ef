use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::Result;

pub const DEFAULT_STATE_DIR: &str = "gacha.state";

#[derive(Clone)]
pub struct LedgerConfig {
    pub state_dir: PathBuf,
}

impl LedgerConfig {
    pub fn new(state_dir: PathBuf) -> Self {
        Self { state_dir }
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    pub fn accounts_path(&self) -> PathBuf {
        self.state_dir.join("accounts.json")
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        if !self.state_dir.exists() {
            fs::create_dir_all(&self.state_dir)?;
        }
        Ok(())
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self::new(PathBuf::from(DEFAULT_STATE_DIR))
    }
}
