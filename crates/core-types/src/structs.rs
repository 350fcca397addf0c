use crate::constants::{MAX_REBALANCE_THRESHOLD_BPS, MIN_COOLDOWN_SECS};
use crate::enums::RebalanceTrigger;
use crate::{Address, Amount, Bps, ProtocolError, Timestamp};
use serde::{Deserialize, Serialize};

/// Everything the strategy manager knows about one registered strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyRecord {
    pub strategy_address: Address,
    pub name: String,
    /// Cap on `allocation`, in basis points.
    pub max_allocation: Bps,
    /// Current share of capital, in basis points.
    pub allocation: Bps,
    pub is_active: bool,
    #[serde(with = "crate::amount::string")]
    pub total_deposited: Amount,
    #[serde(with = "crate::amount::string")]
    pub total_withdrawn: Amount,
    pub last_rebalance_time: Timestamp,
    /// 0..=100.
    pub performance_score: u8,
    /// Basis points.
    pub apy: Bps,
    pub last_update: Timestamp,
    pub registered_at: Timestamp,
}

impl StrategyRecord {
    pub fn new(strategy_address: Address, name: String, max_allocation: Bps, now: Timestamp) -> Self {
        Self {
            strategy_address,
            name,
            max_allocation,
            allocation: 0,
            is_active: false,
            total_deposited: 0,
            total_withdrawn: 0,
            last_rebalance_time: 0,
            performance_score: 0,
            apy: 0,
            last_update: 0,
            registered_at: now,
        }
    }
}

/// The `(apy, score, lastUpdate)` triple reported for a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub apy: Bps,
    pub performance_score: u8,
    pub last_update: Timestamp,
}

/// One entry of the rebalance history. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebalanceRecord {
    pub id: u64,
    pub timestamp: Timestamp,
    #[serde(with = "crate::amount::string")]
    pub total_amount: Amount,
    pub strategies: Vec<Address>,
    #[serde(with = "crate::amount::string_vec")]
    pub amounts: Vec<Amount>,
    pub reason: String,
    pub trigger: RebalanceTrigger,
}

/// Policy the rebalance executor enforces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebalanceConfig {
    /// Basis points, at most 5000.
    pub rebalance_threshold: Bps,
    /// Per-strategy ceiling on a single rebalance movement.
    #[serde(with = "crate::amount::string")]
    pub max_rebalance_amount: Amount,
    /// Seconds, at least 3600.
    pub cooldown_period: Timestamp,
    pub auto_rebalance_enabled: bool,
}

impl RebalanceConfig {
    /// Builds a validated configuration.
    pub fn new(
        rebalance_threshold: Bps,
        max_rebalance_amount: Amount,
        cooldown_period: Timestamp,
        auto_rebalance_enabled: bool,
    ) -> Result<Self, ProtocolError> {
        let config = Self {
            rebalance_threshold,
            max_rebalance_amount,
            cooldown_period,
            auto_rebalance_enabled,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.rebalance_threshold > MAX_REBALANCE_THRESHOLD_BPS {
            return Err(ProtocolError::ThresholdTooHigh);
        }
        if self.max_rebalance_amount == 0 {
            return Err(ProtocolError::MaxAmountMustBePositive);
        }
        if self.cooldown_period < MIN_COOLDOWN_SECS {
            return Err(ProtocolError::CooldownTooShort);
        }
        Ok(())
    }
}

/// Answer of `canExecuteRebalance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebalanceStatus {
    pub can_execute: bool,
    /// Seconds until the cooldown elapses; zero once it has.
    pub time_remaining: Timestamp,
}

/// Answer of `analyzePerformance`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceAdvice {
    pub should_rebalance: bool,
    pub reason: String,
}
