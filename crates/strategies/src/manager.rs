use core_types::constants::{MAX_BPS, MAX_PERFORMANCE_SCORE, PERFORMING_WELL_THRESHOLD};
use core_types::{
    Address, AllocationSource, Amount, Bps, CallContext, Ownership, PerformanceMetrics,
    ProtocolError, StrategyBook, StrategyEvent, StrategyRecord,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyManager {
    ownership: Ownership,
    vault: Address,
    rebalance_executor: Address,
    strategies: BTreeMap<Address, StrategyRecord>,
    /// Registration order.
    registered: Vec<Address>,
    /// Activation order.
    active: Vec<Address>,
    total_allocation: Bps,
}

impl StrategyManager {
    pub fn new(owner: Address, vault: Address, rebalance_executor: Address) -> Self {
        Self {
            ownership: Ownership::new(owner),
            vault,
            rebalance_executor,
            strategies: BTreeMap::new(),
            registered: Vec::new(),
            active: Vec::new(),
            total_allocation: 0,
        }
    }

    // ==========================================================================
    // Registry
    // ==========================================================================

    pub fn register_strategy(
        &mut self,
        ctx: &mut CallContext,
        strategy: Address,
        name: &str,
        max_allocation: Bps,
    ) -> Result<(), ProtocolError> {
        self.ownership.ensure_owner(ctx)?;
        if strategy.is_zero() {
            return Err(ProtocolError::InvalidAddress);
        }
        if max_allocation > MAX_BPS {
            return Err(ProtocolError::MaxAllocationTooHigh);
        }
        if self.strategies.contains_key(&strategy) {
            return Err(ProtocolError::StrategyAlreadyRegistered);
        }

        let record = StrategyRecord::new(strategy, name.to_string(), max_allocation, ctx.now());
        self.strategies.insert(strategy, record);
        self.registered.push(strategy);
        debug!(%strategy, name, max_allocation, "strategy registered");
        ctx.emit(StrategyEvent::StrategyRegistered {
            strategy,
            name: name.to_string(),
            max_allocation,
        });
        Ok(())
    }

    pub fn activate_strategy(
        &mut self,
        ctx: &mut CallContext,
        strategy: Address,
    ) -> Result<(), ProtocolError> {
        self.ownership.ensure_owner(ctx)?;
        let record = self.record_mut(strategy)?;
        if record.is_active {
            return Err(ProtocolError::StrategyAlreadyActive);
        }
        record.is_active = true;
        self.active.push(strategy);
        ctx.emit(StrategyEvent::StrategyActivated { strategy });
        Ok(())
    }

    /// Removes the strategy from the active list. Its allocation is kept.
    pub fn deactivate_strategy(
        &mut self,
        ctx: &mut CallContext,
        strategy: Address,
    ) -> Result<(), ProtocolError> {
        self.ownership.ensure_owner(ctx)?;
        let record = self.record_mut(strategy)?;
        if !record.is_active {
            return Err(ProtocolError::StrategyNotActive);
        }
        record.is_active = false;
        self.active.retain(|a| *a != strategy);
        ctx.emit(StrategyEvent::StrategyDeactivated { strategy });
        Ok(())
    }

    // ==========================================================================
    // Allocation
    // ==========================================================================

    pub fn update_allocation(
        &mut self,
        ctx: &mut CallContext,
        strategy: Address,
        new_allocation: Bps,
    ) -> Result<(), ProtocolError> {
        self.ownership.ensure_owner(ctx)?;
        self.ownership.ensure_not_paused()?;
        let total = self.total_allocation;
        let record = self.record_mut(strategy)?;
        if new_allocation > record.max_allocation {
            return Err(ProtocolError::AllocationExceedsMaximum);
        }
        let old_allocation = record.allocation;
        let new_total = total - old_allocation + new_allocation;
        if new_total > MAX_BPS {
            return Err(ProtocolError::TotalAllocationExceeds100Percent);
        }

        record.allocation = new_allocation;
        self.total_allocation = new_total;
        ctx.emit(StrategyEvent::AllocationUpdated {
            strategy,
            old_allocation,
            new_allocation,
        });
        Ok(())
    }

    /// Zeroes every allocation. Registration and activation are untouched.
    pub fn emergency_reset_allocations(&mut self, ctx: &mut CallContext) -> Result<(), ProtocolError> {
        self.ownership.ensure_owner(ctx)?;
        for record in self.strategies.values_mut() {
            record.allocation = 0;
        }
        self.total_allocation = 0;
        ctx.emit(StrategyEvent::AllocationsReset);
        Ok(())
    }

    // ==========================================================================
    // Performance
    // ==========================================================================

    pub fn update_performance(
        &mut self,
        ctx: &mut CallContext,
        strategy: Address,
        apy: Bps,
        performance_score: u32,
    ) -> Result<(), ProtocolError> {
        if ctx.caller() != self.rebalance_executor {
            return Err(ProtocolError::OnlyRebalanceExecutor);
        }
        let now = ctx.now();
        let record = self.record_mut(strategy)?;
        let score = u8::try_from(performance_score)
            .ok()
            .filter(|s| *s <= MAX_PERFORMANCE_SCORE)
            .ok_or(ProtocolError::PerformanceScoreTooHigh)?;

        record.apy = apy;
        record.performance_score = score;
        record.last_update = now;
        ctx.emit(StrategyEvent::PerformanceUpdated {
            strategy,
            apy,
            performance_score: score,
        });
        Ok(())
    }

    /// Unregistered strategies are not performing well.
    pub fn is_performing_well(&self, strategy: Address) -> bool {
        self.strategies
            .get(&strategy)
            .is_some_and(|r| r.performance_score > PERFORMING_WELL_THRESHOLD)
    }

    // ==========================================================================
    // Administration
    // ==========================================================================

    pub fn set_vault(&mut self, ctx: &mut CallContext, vault: Address) -> Result<(), ProtocolError> {
        self.ownership.ensure_owner(ctx)?;
        let previous = std::mem::replace(&mut self.vault, vault);
        ctx.emit(StrategyEvent::VaultUpdated {
            previous,
            current: vault,
        });
        Ok(())
    }

    pub fn set_rebalance_executor(
        &mut self,
        ctx: &mut CallContext,
        executor: Address,
    ) -> Result<(), ProtocolError> {
        self.ownership.ensure_owner(ctx)?;
        let previous = std::mem::replace(&mut self.rebalance_executor, executor);
        ctx.emit(StrategyEvent::RebalanceExecutorUpdated {
            previous,
            current: executor,
        });
        Ok(())
    }

    pub fn pause(&mut self, ctx: &mut CallContext) -> Result<(), ProtocolError> {
        self.ownership.pause(ctx)?;
        ctx.emit(StrategyEvent::Paused {
            account: ctx.caller(),
        });
        Ok(())
    }

    pub fn unpause(&mut self, ctx: &mut CallContext) -> Result<(), ProtocolError> {
        self.ownership.unpause(ctx)?;
        ctx.emit(StrategyEvent::Unpaused {
            account: ctx.caller(),
        });
        Ok(())
    }

    pub fn transfer_ownership(
        &mut self,
        ctx: &mut CallContext,
        new_owner: Address,
    ) -> Result<(), ProtocolError> {
        let previous = self.ownership.transfer(ctx, new_owner)?;
        ctx.emit(StrategyEvent::OwnershipTransferred {
            previous,
            current: new_owner,
        });
        Ok(())
    }

    // ==========================================================================
    // Views
    // ==========================================================================

    pub fn strategy(&self, strategy: Address) -> Option<&StrategyRecord> {
        self.strategies.get(&strategy)
    }

    /// All records in registration order.
    pub fn all_strategies(&self) -> Vec<&StrategyRecord> {
        self.registered
            .iter()
            .filter_map(|a| self.strategies.get(a))
            .collect()
    }

    pub fn allocation(&self, strategy: Address) -> Bps {
        self.strategies.get(&strategy).map_or(0, |r| r.allocation)
    }

    pub fn active_strategies(&self) -> &[Address] {
        &self.active
    }

    pub fn active_strategy_count(&self) -> usize {
        self.active.len()
    }

    pub fn performance_metrics(&self, strategy: Address) -> Option<PerformanceMetrics> {
        self.strategies.get(&strategy).map(|r| PerformanceMetrics {
            apy: r.apy,
            performance_score: r.performance_score,
            last_update: r.last_update,
        })
    }

    pub fn total_allocation(&self) -> Bps {
        self.total_allocation
    }

    pub fn vault(&self) -> Address {
        self.vault
    }

    pub fn rebalance_executor(&self) -> Address {
        self.rebalance_executor
    }

    pub fn owner(&self) -> Address {
        self.ownership.owner()
    }

    pub fn is_paused(&self) -> bool {
        self.ownership.is_paused()
    }

    fn record_mut(&mut self, strategy: Address) -> Result<&mut StrategyRecord, ProtocolError> {
        self.strategies
            .get_mut(&strategy)
            .ok_or(ProtocolError::StrategyNotRegistered)
    }
}

impl StrategyBook for StrategyManager {
    /// Bookkeeping for capital the vault has placed into `strategy`.
    fn execute_strategy(
        &mut self,
        ctx: &mut CallContext,
        strategy: Address,
        amount: Amount,
    ) -> Result<(), ProtocolError> {
        if ctx.caller() != self.vault {
            return Err(ProtocolError::OnlyVault);
        }
        self.ownership.ensure_not_paused()?;
        let now = ctx.now();
        let record = self
            .strategies
            .get_mut(&strategy)
            .filter(|r| r.is_active)
            .ok_or(ProtocolError::StrategyNotActive)?;
        let total_deposited = record
            .total_deposited
            .checked_add(amount)
            .ok_or(ProtocolError::Overflow)?;

        record.total_deposited = total_deposited;
        record.last_rebalance_time = now;
        ctx.emit(StrategyEvent::StrategyExecuted { strategy, amount });
        Ok(())
    }
}

impl AllocationSource for StrategyManager {
    fn active_allocations(&self) -> Vec<(Address, Bps)> {
        self.active
            .iter()
            .map(|a| (*a, self.allocation(*a)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const OWNER: Address = Address::new([0x01; 20]);
    const VAULT: Address = Address::new([0x02; 20]);
    const EXECUTOR: Address = Address::new([0x03; 20]);
    const STRANGER: Address = Address::new([0x04; 20]);

    fn aave() -> Address {
        Address::repeat_byte(0xaa)
    }

    fn compound() -> Address {
        Address::repeat_byte(0xcc)
    }

    fn owner_ctx() -> CallContext {
        CallContext::new(OWNER, 1_000)
    }

    fn manager_with(strategies: &[(Address, Bps)]) -> StrategyManager {
        let mut manager = StrategyManager::new(OWNER, VAULT, EXECUTOR);
        let mut ctx = owner_ctx();
        for (address, max) in strategies {
            manager.register_strategy(&mut ctx, *address, "s", *max).unwrap();
        }
        manager
    }

    #[test]
    fn registers_inactive_with_zero_allocation() {
        let mut manager = StrategyManager::new(OWNER, VAULT, EXECUTOR);
        let mut ctx = owner_ctx();
        manager
            .register_strategy(&mut ctx, aave(), "Aave USDC Lending", 5_000)
            .unwrap();

        let record = manager.strategy(aave()).unwrap();
        assert_eq!(record.name, "Aave USDC Lending");
        assert_eq!(record.max_allocation, 5_000);
        assert!(!record.is_active);
        assert_eq!(record.allocation, 0);
        assert_eq!(ctx.events().len(), 1);
    }

    #[test]
    fn registration_guards() {
        let mut manager = manager_with(&[(aave(), 5_000)]);
        let mut ctx = owner_ctx();

        assert_eq!(
            manager.register_strategy(&mut ctx, Address::ZERO, "zero", 100),
            Err(ProtocolError::InvalidAddress)
        );
        assert_eq!(
            manager.register_strategy(&mut ctx, compound(), "big", 10_001),
            Err(ProtocolError::MaxAllocationTooHigh)
        );
        assert_eq!(
            manager.register_strategy(&mut ctx, aave(), "again", 100),
            Err(ProtocolError::StrategyAlreadyRegistered)
        );
        let mut stranger = CallContext::new(STRANGER, 1_000);
        assert_eq!(
            manager.register_strategy(&mut stranger, compound(), "c", 100),
            Err(ProtocolError::NotOwner)
        );
        assert!(ctx.events().is_empty());
    }

    #[test]
    fn activation_lifecycle_keeps_active_list_in_order() {
        let mut manager = manager_with(&[(aave(), 5_000), (compound(), 5_000)]);
        let mut ctx = owner_ctx();

        manager.activate_strategy(&mut ctx, compound()).unwrap();
        manager.activate_strategy(&mut ctx, aave()).unwrap();
        assert_eq!(manager.active_strategies(), &[compound(), aave()]);
        assert_eq!(
            manager.activate_strategy(&mut ctx, aave()),
            Err(ProtocolError::StrategyAlreadyActive)
        );

        manager.deactivate_strategy(&mut ctx, compound()).unwrap();
        assert_eq!(manager.active_strategies(), &[aave()]);
        assert_eq!(
            manager.deactivate_strategy(&mut ctx, compound()),
            Err(ProtocolError::StrategyNotActive)
        );
        assert_eq!(
            manager.activate_strategy(&mut ctx, STRANGER),
            Err(ProtocolError::StrategyNotRegistered)
        );
    }

    #[test]
    fn allocation_respects_strategy_cap_and_total() {
        let mut manager = manager_with(&[(aave(), 5_000), (compound(), 8_000)]);
        let mut ctx = owner_ctx();

        manager.update_allocation(&mut ctx, aave(), 5_000).unwrap();
        assert_eq!(
            manager.update_allocation(&mut ctx, aave(), 5_001),
            Err(ProtocolError::AllocationExceedsMaximum)
        );
        assert_eq!(
            manager.update_allocation(&mut ctx, compound(), 6_000),
            Err(ProtocolError::TotalAllocationExceeds100Percent)
        );
        manager.update_allocation(&mut ctx, compound(), 5_000).unwrap();
        assert_eq!(manager.total_allocation(), 10_000);

        // Lowering one frees room for the other.
        manager.update_allocation(&mut ctx, aave(), 1_000).unwrap();
        assert_eq!(manager.total_allocation(), 6_000);
        assert_eq!(manager.allocation(aave()), 1_000);
    }

    #[test]
    fn emergency_reset_zeroes_allocations_only() {
        let mut manager = manager_with(&[(aave(), 5_000)]);
        let mut ctx = owner_ctx();
        manager.activate_strategy(&mut ctx, aave()).unwrap();
        manager.update_allocation(&mut ctx, aave(), 3_000).unwrap();

        manager.emergency_reset_allocations(&mut ctx).unwrap();

        assert_eq!(manager.total_allocation(), 0);
        assert_eq!(manager.allocation(aave()), 0);
        assert!(manager.strategy(aave()).unwrap().is_active);
        assert_eq!(manager.active_strategy_count(), 1);
    }

    #[test]
    fn execute_strategy_is_vault_only_and_requires_active() {
        let mut manager = manager_with(&[(aave(), 5_000)]);

        let mut stranger = CallContext::new(STRANGER, 2_000);
        assert_eq!(
            manager.execute_strategy(&mut stranger, aave(), 10),
            Err(ProtocolError::OnlyVault)
        );

        let mut vault = CallContext::new(VAULT, 2_000);
        assert_eq!(
            manager.execute_strategy(&mut vault, aave(), 10),
            Err(ProtocolError::StrategyNotActive)
        );

        manager.activate_strategy(&mut owner_ctx(), aave()).unwrap();
        manager.execute_strategy(&mut vault, aave(), 10).unwrap();
        manager.execute_strategy(&mut vault, aave(), 5).unwrap();

        let record = manager.strategy(aave()).unwrap();
        assert_eq!(record.total_deposited, 15);
        assert_eq!(record.last_rebalance_time, 2_000);
    }

    #[test]
    fn pause_gates_allocation_and_execution() {
        let mut manager = manager_with(&[(aave(), 5_000)]);
        let mut ctx = owner_ctx();
        manager.activate_strategy(&mut ctx, aave()).unwrap();
        manager.pause(&mut ctx).unwrap();

        assert_eq!(
            manager.update_allocation(&mut ctx, aave(), 100),
            Err(ProtocolError::Paused)
        );
        let mut vault = CallContext::new(VAULT, 2_000);
        assert_eq!(
            manager.execute_strategy(&mut vault, aave(), 1),
            Err(ProtocolError::Paused)
        );

        manager.unpause(&mut ctx).unwrap();
        manager.update_allocation(&mut ctx, aave(), 100).unwrap();
    }

    #[test]
    fn performance_updates_from_executor_only() {
        let mut manager = manager_with(&[(aave(), 5_000)]);

        let mut stranger = CallContext::new(STRANGER, 3_000);
        assert_eq!(
            manager.update_performance(&mut stranger, aave(), 500, 80),
            Err(ProtocolError::OnlyRebalanceExecutor)
        );

        let mut executor = CallContext::new(EXECUTOR, 3_000);
        assert_eq!(
            manager.update_performance(&mut executor, aave(), 500, 101),
            Err(ProtocolError::PerformanceScoreTooHigh)
        );
        assert_eq!(
            manager.update_performance(&mut executor, compound(), 500, 80),
            Err(ProtocolError::StrategyNotRegistered)
        );

        manager.update_performance(&mut executor, aave(), 500, 51).unwrap();
        let metrics = manager.performance_metrics(aave()).unwrap();
        assert_eq!(metrics.apy, 500);
        assert_eq!(metrics.performance_score, 51);
        assert_eq!(metrics.last_update, 3_000);
        assert!(manager.is_performing_well(aave()));

        manager.update_performance(&mut executor, aave(), 500, 50).unwrap();
        assert!(!manager.is_performing_well(aave()));
    }

    #[test]
    fn active_allocations_follow_activation_order() {
        let mut manager = manager_with(&[(aave(), 5_000), (compound(), 5_000)]);
        let mut ctx = owner_ctx();
        manager.activate_strategy(&mut ctx, compound()).unwrap();
        manager.activate_strategy(&mut ctx, aave()).unwrap();
        manager.update_allocation(&mut ctx, aave(), 2_000).unwrap();

        assert_eq!(
            manager.active_allocations(),
            vec![(compound(), 0), (aave(), 2_000)]
        );
    }

    proptest! {
        #[test]
        fn prop_total_allocation_never_exceeds_100_percent(
            updates in prop::collection::vec((0usize..4, 0u32..=6_000), 1..40)
        ) {
            let addresses: Vec<Address> = (1u8..=4).map(|b| Address::repeat_byte(0x10 + b)).collect();
            let seeds: Vec<(Address, Bps)> = addresses.iter().map(|a| (*a, 6_000)).collect();
            let mut manager = manager_with(&seeds);
            let mut ctx = owner_ctx();

            for (index, allocation) in updates {
                let _ = manager.update_allocation(&mut ctx, addresses[index], allocation);
                let sum: Bps = addresses.iter().map(|a| manager.allocation(*a)).sum();
                prop_assert_eq!(sum, manager.total_allocation());
                prop_assert!(manager.total_allocation() <= MAX_BPS);
            }
        }
    }
}
