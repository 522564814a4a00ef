use config::{Config, ConfigError};
use serde::{Deserialize, Serialize};

use crate::tier::{TierSpec, TierTable, TierTableError};

/// Config structure with the economy's tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub economy: EconomyConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomyConfig {
    /// Points earnable per hourly window before further rolls are rejected.
    #[serde(default = "default_hour_limit")]
    pub hour_limit: u32,
    /// Seconds to wait for a transfer confirmation reply.
    #[serde(default = "default_confirmation_timeout_s")]
    pub confirmation_timeout_s: u64,
    /// Optional override of the built-in tier table.
    #[serde(default)]
    pub tiers: Option<Vec<TierSpec>>,
}

fn default_hour_limit() -> u32 {
    50
}

fn default_confirmation_timeout_s() -> u64 {
    10
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            hour_limit: default_hour_limit(),
            confirmation_timeout_s: default_confirmation_timeout_s(),
            tiers: None,
        }
    }
}

impl EconomyConfig {
    pub fn tier_table(&self) -> Result<TierTable, TierTableError> {
        match &self.tiers {
            Some(tiers) => TierTable::new(tiers.clone()),
            None => Ok(TierTable::default()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_state_dir")]
    pub state_dir: String,
}

fn default_state_dir() -> String {
    "gacha.state".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(config::File::with_name("config.toml").required(false))
            .add_source(config::Environment::with_prefix("GACHA").separator("__"))
            .build()?;
        settings.try_deserialize()
    }
}
