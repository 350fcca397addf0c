use serde::{Deserialize, Serialize};

/// What started a rebalance that made it into the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RebalanceTrigger {
    /// Submitted through the vault by the rebalance authority.
    Manual,
    /// Derived from the strategy manager's active allocations.
    Auto,
}

/// The vault operation that produced a placement movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementKind {
    StrategyExecution,
    Rebalance,
}

impl PlacementKind {
    /// Rebalances re-target a placement; strategy executions add to it.
    pub fn replaces_position(&self) -> bool {
        matches!(self, PlacementKind::Rebalance)
    }
}
