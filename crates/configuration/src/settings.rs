use core_types::constants::{DEFAULT_LOCK_PERIOD_SECS, DEFAULT_MIN_DEPOSIT};
use core_types::{Address, Amount, Bps, Timestamp};
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub deployment: Deployment,
    #[serde(default)]
    pub vault: VaultSettings,
    pub rebalance: RebalanceSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    /// Sample strategies registered by `init`.
    #[serde(default)]
    pub strategies: Vec<StrategySeed>,
}

/// The identities of every participant, fixed at bootstrap.
#[derive(Debug, Clone, Deserialize)]
pub struct Deployment {
    /// Owner of all three components.
    pub owner: Address,
    pub vault: Address,
    pub strategy_manager: Address,
    pub rebalance_executor: Address,
    pub asset_token: Address,
    pub reward_token: Address,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VaultSettings {
    /// Smallest accepted deposit, in the asset's smallest unit.
    #[serde(default = "default_min_deposit", with = "core_types::amount::string")]
    pub min_deposit: Amount,
    #[serde(default = "default_lock_period")]
    pub lock_period_secs: Timestamp,
}

impl Default for VaultSettings {
    fn default() -> Self {
        Self {
            min_deposit: DEFAULT_MIN_DEPOSIT,
            lock_period_secs: DEFAULT_LOCK_PERIOD_SECS,
        }
    }
}

/// Initial rebalance policy and the auto-rebalance scheduler.
#[derive(Debug, Clone, Deserialize)]
pub struct RebalanceSettings {
    pub threshold_bps: Bps,
    #[serde(with = "core_types::amount::string")]
    pub max_rebalance_amount: Amount,
    pub cooldown_secs: Timestamp,
    #[serde(default = "default_true")]
    pub auto_enabled: bool,
    /// How often the scheduler checks whether an auto rebalance is due.
    /// Zero disables the scheduler.
    #[serde(default = "default_auto_interval")]
    pub auto_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageSettings {
    /// Where the state snapshot lives. Without it the state is memory-only.
    pub snapshot_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_level")]
    pub level: String,
    /// When set, logs are also written to a daily-rolling file here.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            directory: None,
        }
    }
}

/// A strategy to register (and optionally activate and allocate) at bootstrap.
#[derive(Debug, Clone, Deserialize)]
pub struct StrategySeed {
    pub address: Address,
    pub name: String,
    pub max_allocation_bps: Bps,
    #[serde(default)]
    pub activate: bool,
    #[serde(default)]
    pub allocation_bps: Bps,
}

fn default_min_deposit() -> Amount {
    DEFAULT_MIN_DEPOSIT
}

fn default_lock_period() -> Timestamp {
    DEFAULT_LOCK_PERIOD_SECS
}

fn default_true() -> bool {
    true
}

fn default_auto_interval() -> u64 {
    60
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_level() -> String {
    "info".to_string()
}
