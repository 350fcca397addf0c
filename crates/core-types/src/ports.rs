//! Narrow interfaces one core component uses to call another.
//!
//! The caller never holds the callee. The engine lends the callee for the
//! duration of one transaction and the call runs with the calling
//! component's address as the acting identity.

use crate::{Address, Amount, Bps, CallContext, ProtocolError};

/// Bookkeeping the vault triggers on the strategy manager when capital is
/// placed into a strategy.
pub trait StrategyBook {
    fn execute_strategy(
        &mut self,
        ctx: &mut CallContext,
        strategy: Address,
        amount: Amount,
    ) -> Result<(), ProtocolError>;
}

/// Rebalance recording the vault triggers on the rebalance executor.
pub trait RebalanceBook {
    /// Returns the id of the history record that was written.
    fn execute_rebalance(
        &mut self,
        ctx: &mut CallContext,
        strategies: &[Address],
        amounts: &[Amount],
        reason: &str,
    ) -> Result<u64, ProtocolError>;
}

/// Read-only view of the active strategies and their current allocations,
/// in activation order.
pub trait AllocationSource {
    fn active_allocations(&self) -> Vec<(Address, Bps)>;
}
