use crate::{Address, Amount, Bps, Timestamp};
use serde::{Deserialize, Serialize};

/// Events emitted by the vault. Field order mirrors the event signatures
/// clients already decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VaultEvent {
    Deposit {
        user: Address,
        #[serde(with = "crate::amount::string")]
        amount: Amount,
        #[serde(with = "crate::amount::string")]
        shares: Amount,
    },
    Withdraw {
        user: Address,
        #[serde(with = "crate::amount::string")]
        shares: Amount,
        #[serde(with = "crate::amount::string")]
        amount: Amount,
    },
    StrategyExecuted {
        strategy: Address,
        #[serde(with = "crate::amount::string")]
        amount: Amount,
    },
    RebalanceExecuted {
        strategies: Vec<Address>,
        #[serde(with = "crate::amount::string_vec")]
        amounts: Vec<Amount>,
        #[serde(with = "crate::amount::string")]
        total_amount: Amount,
    },
    EmergencyWithdraw {
        to: Address,
        #[serde(with = "crate::amount::string")]
        amount: Amount,
    },
    StrategyManagerUpdated { previous: Address, current: Address },
    RebalanceExecutorUpdated { previous: Address, current: Address },
    Paused { account: Address },
    Unpaused { account: Address },
    OwnershipTransferred { previous: Address, current: Address },
}

/// Events emitted by the strategy manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StrategyEvent {
    StrategyRegistered {
        strategy: Address,
        name: String,
        max_allocation: Bps,
    },
    StrategyActivated { strategy: Address },
    StrategyDeactivated { strategy: Address },
    AllocationUpdated {
        strategy: Address,
        old_allocation: Bps,
        new_allocation: Bps,
    },
    StrategyExecuted {
        strategy: Address,
        #[serde(with = "crate::amount::string")]
        amount: Amount,
    },
    PerformanceUpdated {
        strategy: Address,
        apy: Bps,
        performance_score: u8,
    },
    AllocationsReset,
    VaultUpdated { previous: Address, current: Address },
    RebalanceExecutorUpdated { previous: Address, current: Address },
    Paused { account: Address },
    Unpaused { account: Address },
    OwnershipTransferred { previous: Address, current: Address },
}

/// Events emitted by the rebalance executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ExecutorEvent {
    RebalanceExecuted {
        rebalance_id: u64,
        timestamp: Timestamp,
        #[serde(with = "crate::amount::string")]
        total_amount: Amount,
        strategies: Vec<Address>,
        #[serde(with = "crate::amount::string_vec")]
        amounts: Vec<Amount>,
        reason: String,
    },
    EmergencyRebalance {
        strategy: Address,
        #[serde(with = "crate::amount::string")]
        amount: Amount,
    },
    ConfigUpdated {
        rebalance_threshold: Bps,
        #[serde(with = "crate::amount::string")]
        max_rebalance_amount: Amount,
        cooldown_period: Timestamp,
        auto_rebalance_enabled: bool,
    },
    HistoryReset { cleared: u64 },
    VaultUpdated { previous: Address, current: Address },
    StrategyManagerUpdated { previous: Address, current: Address },
    Paused { account: Address },
    Unpaused { account: Address },
    OwnershipTransferred { previous: Address, current: Address },
}

/// Any event produced by one of the three core components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "component", content = "event")]
pub enum ProtocolEvent {
    Vault(VaultEvent),
    StrategyManager(StrategyEvent),
    RebalanceExecutor(ExecutorEvent),
}

impl ProtocolEvent {
    /// `Component.EventName`, for logs.
    pub fn label(&self) -> String {
        // The variant name is the first token of the derived Debug output.
        let (component, debug) = match self {
            ProtocolEvent::Vault(e) => ("Vault", format!("{:?}", e)),
            ProtocolEvent::StrategyManager(e) => ("StrategyManager", format!("{:?}", e)),
            ProtocolEvent::RebalanceExecutor(e) => ("RebalanceExecutor", format!("{:?}", e)),
        };
        let name = debug
            .split(|c: char| !c.is_alphanumeric())
            .next()
            .unwrap_or_default();
        format!("{}.{}", component, name)
    }
}

impl From<VaultEvent> for ProtocolEvent {
    fn from(event: VaultEvent) -> Self {
        ProtocolEvent::Vault(event)
    }
}

impl From<StrategyEvent> for ProtocolEvent {
    fn from(event: StrategyEvent) -> Self {
        ProtocolEvent::StrategyManager(event)
    }
}

impl From<ExecutorEvent> for ProtocolEvent {
    fn from(event: ExecutorEvent) -> Self {
        ProtocolEvent::RebalanceExecutor(event)
    }
}
