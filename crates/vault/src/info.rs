use core_types::{Address, Amount, Bps, Timestamp};
use serde::{Deserialize, Serialize};

/// Everything a depositor's dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub user: Address,
    #[serde(with = "core_types::amount::string")]
    pub balance: Amount,
    #[serde(with = "core_types::amount::string")]
    pub shares: Amount,
    /// Share of total assets in basis points, rounded down.
    pub share_bps: Bps,
    pub is_locked: bool,
    pub last_deposit_time: Timestamp,
    /// Zero for users who never deposited.
    pub unlock_time: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultInfo {
    pub address: Address,
    pub owner: Address,
    #[serde(with = "core_types::amount::string")]
    pub total_assets: Amount,
    #[serde(with = "core_types::amount::string")]
    pub total_shares: Amount,
    pub asset_token: Address,
    pub reward_token: Address,
    pub strategy_manager: Address,
    pub rebalance_executor: Address,
    #[serde(with = "core_types::amount::string")]
    pub min_deposit: Amount,
    pub lock_period: Timestamp,
    pub paused: bool,
    pub depositors: usize,
}
