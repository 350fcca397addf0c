use crate::history::RebalanceHistory;
use analytics::AnalyticsEngine;
use core_types::constants::AUTO_REBALANCE_REASON;
use core_types::{
    Address, AllocationSource, Amount, Bps, CallContext, ExecutorEvent, Ownership,
    PerformanceAdvice, ProtocolError, RebalanceBook, RebalanceConfig, RebalanceRecord,
    RebalanceStatus, RebalanceTrigger, Timestamp,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebalanceExecutor {
    ownership: Ownership,
    vault: Address,
    strategy_manager: Address,
    config: RebalanceConfig,
    history: RebalanceHistory,
    last_rebalance_time: Option<Timestamp>,
}

impl RebalanceExecutor {
    /// Rejects an initial configuration `update_config` would reject.
    pub fn new(
        owner: Address,
        vault: Address,
        strategy_manager: Address,
        config: RebalanceConfig,
    ) -> Result<Self, ProtocolError> {
        config.validate()?;
        Ok(Self {
            ownership: Ownership::new(owner),
            vault,
            strategy_manager,
            config,
            history: RebalanceHistory::default(),
            last_rebalance_time: None,
        })
    }

    // ==========================================================================
    // Rebalancing
    // ==========================================================================

    /// Records a rebalance derived from the strategy manager's active
    /// allocations. An empty active set is recorded as an empty rebalance.
    pub fn trigger_auto_rebalance(
        &mut self,
        ctx: &mut CallContext,
        source: &impl AllocationSource,
    ) -> Result<u64, ProtocolError> {
        if ctx.caller() != self.strategy_manager {
            return Err(ProtocolError::OnlyStrategyManager);
        }
        self.ownership.ensure_not_paused()?;
        if !self.config.auto_rebalance_enabled {
            return Err(ProtocolError::AutoRebalancingDisabled);
        }

        let (strategies, amounts): (Vec<Address>, Vec<Amount>) = source
            .active_allocations()
            .into_iter()
            .map(|(strategy, allocation)| (strategy, Amount::from(allocation)))
            .unzip();
        self.record(
            ctx,
            strategies,
            amounts,
            AUTO_REBALANCE_REASON,
            RebalanceTrigger::Auto,
        )
    }

    /// Out-of-band move. Not cooldown-gated and not written to the history.
    pub fn emergency_rebalance(
        &mut self,
        ctx: &mut CallContext,
        strategy: Address,
        amount: Amount,
    ) -> Result<(), ProtocolError> {
        self.ownership.ensure_owner(ctx)?;
        if strategy.is_zero() {
            return Err(ProtocolError::InvalidStrategy);
        }
        if amount == 0 {
            return Err(ProtocolError::AmountMustBePositive);
        }
        info!(%strategy, amount = %amount, "emergency rebalance");
        ctx.emit(ExecutorEvent::EmergencyRebalance { strategy, amount });
        Ok(())
    }

    /// Validates and appends one history record, consuming the cooldown.
    fn record(
        &mut self,
        ctx: &mut CallContext,
        strategies: Vec<Address>,
        amounts: Vec<Amount>,
        reason: &str,
        trigger: RebalanceTrigger,
    ) -> Result<u64, ProtocolError> {
        if amounts.iter().any(|a| *a > self.config.max_rebalance_amount) {
            return Err(ProtocolError::AmountExceedsMaxRebalance);
        }
        let now = ctx.now();
        if self.cooldown_remaining(now) > 0 {
            return Err(ProtocolError::CooldownNotPassed);
        }
        let total_amount = amounts
            .iter()
            .try_fold(0u128, |acc, a| acc.checked_add(*a))
            .ok_or(ProtocolError::Overflow)?;

        let id = self.history.next_id();
        self.history.push(RebalanceRecord {
            id,
            timestamp: now,
            total_amount,
            strategies: strategies.clone(),
            amounts: amounts.clone(),
            reason: reason.to_string(),
            trigger,
        });
        self.last_rebalance_time = Some(now);
        debug!(id, ?trigger, total_amount = %total_amount, "rebalance recorded");

        ctx.emit(ExecutorEvent::RebalanceExecuted {
            rebalance_id: id,
            timestamp: now,
            total_amount,
            strategies,
            amounts,
            reason: reason.to_string(),
        });
        Ok(id)
    }

    /// Seconds until the cooldown elapses. The first rebalance is never gated.
    fn cooldown_remaining(&self, now: Timestamp) -> Timestamp {
        match self.last_rebalance_time {
            None => 0,
            Some(last) => last
                .saturating_add(self.config.cooldown_period)
                .saturating_sub(now),
        }
    }

    // ==========================================================================
    // Advisory
    // ==========================================================================

    pub fn analyze_performance(&self, strategies: &[Address]) -> PerformanceAdvice {
        AnalyticsEngine::new().analyze_performance(strategies)
    }

    pub fn calculate_optimal_allocation(
        &self,
        strategies: &[Address],
        current_allocations: &[Bps],
    ) -> Result<Vec<Bps>, ProtocolError> {
        AnalyticsEngine::new().calculate_optimal_allocation(strategies, current_allocations)
    }

    // ==========================================================================
    // Administration
    // ==========================================================================

    pub fn update_config(
        &mut self,
        ctx: &mut CallContext,
        config: RebalanceConfig,
    ) -> Result<(), ProtocolError> {
        self.ownership.ensure_owner(ctx)?;
        config.validate()?;
        ctx.emit(ExecutorEvent::ConfigUpdated {
            rebalance_threshold: config.rebalance_threshold,
            max_rebalance_amount: config.max_rebalance_amount,
            cooldown_period: config.cooldown_period,
            auto_rebalance_enabled: config.auto_rebalance_enabled,
        });
        self.config = config;
        Ok(())
    }

    /// Clears the history and the counter. The cooldown stays in force.
    pub fn reset_history(&mut self, ctx: &mut CallContext) -> Result<(), ProtocolError> {
        self.ownership.ensure_owner(ctx)?;
        let cleared = self.history.clear();
        ctx.emit(ExecutorEvent::HistoryReset { cleared });
        Ok(())
    }

    pub fn set_vault(&mut self, ctx: &mut CallContext, vault: Address) -> Result<(), ProtocolError> {
        self.ownership.ensure_owner(ctx)?;
        let previous = std::mem::replace(&mut self.vault, vault);
        ctx.emit(ExecutorEvent::VaultUpdated {
            previous,
            current: vault,
        });
        Ok(())
    }

    pub fn set_strategy_manager(
        &mut self,
        ctx: &mut CallContext,
        strategy_manager: Address,
    ) -> Result<(), ProtocolError> {
        self.ownership.ensure_owner(ctx)?;
        let previous = std::mem::replace(&mut self.strategy_manager, strategy_manager);
        ctx.emit(ExecutorEvent::StrategyManagerUpdated {
            previous,
            current: strategy_manager,
        });
        Ok(())
    }

    pub fn pause(&mut self, ctx: &mut CallContext) -> Result<(), ProtocolError> {
        self.ownership.pause(ctx)?;
        ctx.emit(ExecutorEvent::Paused {
            account: ctx.caller(),
        });
        Ok(())
    }

    pub fn unpause(&mut self, ctx: &mut CallContext) -> Result<(), ProtocolError> {
        self.ownership.unpause(ctx)?;
        ctx.emit(ExecutorEvent::Unpaused {
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
        ctx.emit(ExecutorEvent::OwnershipTransferred {
            previous,
            current: new_owner,
        });
        Ok(())
    }

    // ==========================================================================
    // Views
    // ==========================================================================

    pub fn can_execute_rebalance(&self, now: Timestamp) -> RebalanceStatus {
        let time_remaining = self.cooldown_remaining(now);
        RebalanceStatus {
            can_execute: time_remaining == 0,
            time_remaining,
        }
    }

    pub fn rebalance_history(&self, id: u64) -> Result<&RebalanceRecord, ProtocolError> {
        self.history.get(id)
    }

    pub fn recent_rebalances(&self, limit: usize) -> Vec<&RebalanceRecord> {
        self.history.recent(limit)
    }

    pub fn rebalance_count(&self) -> u64 {
        self.history.len()
    }

    /// `None` until the first recorded rebalance.
    pub fn last_rebalance_time(&self) -> Option<Timestamp> {
        self.last_rebalance_time
    }

    pub fn config(&self) -> &RebalanceConfig {
        &self.config
    }

    pub fn vault(&self) -> Address {
        self.vault
    }

    pub fn strategy_manager(&self) -> Address {
        self.strategy_manager
    }

    pub fn owner(&self) -> Address {
        self.ownership.owner()
    }

    pub fn is_paused(&self) -> bool {
        self.ownership.is_paused()
    }
}

impl RebalanceBook for RebalanceExecutor {
    fn execute_rebalance(
        &mut self,
        ctx: &mut CallContext,
        strategies: &[Address],
        amounts: &[Amount],
        reason: &str,
    ) -> Result<u64, ProtocolError> {
        if ctx.caller() != self.vault {
            return Err(ProtocolError::OnlyVault);
        }
        self.ownership.ensure_not_paused()?;
        if strategies.len() != amounts.len() {
            return Err(ProtocolError::ArraysLengthMismatch);
        }
        if strategies.is_empty() {
            return Err(ProtocolError::NoStrategiesProvided);
        }
        self.record(
            ctx,
            strategies.to_vec(),
            amounts.to_vec(),
            reason,
            RebalanceTrigger::Manual,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: Address = Address::new([0x01; 20]);
    const VAULT: Address = Address::new([0x02; 20]);
    const MANAGER: Address = Address::new([0x03; 20]);
    const STRANGER: Address = Address::new([0x04; 20]);
    const T0: Timestamp = 1_700_000_000;
    const MAX: Amount = 10_000_000_000;

    struct FixedAllocations(Vec<(Address, Bps)>);

    impl AllocationSource for FixedAllocations {
        fn active_allocations(&self) -> Vec<(Address, Bps)> {
            self.0.clone()
        }
    }

    fn executor() -> RebalanceExecutor {
        let config = RebalanceConfig::new(1_000, MAX, 3_600, true).unwrap();
        RebalanceExecutor::new(OWNER, VAULT, MANAGER, config).unwrap()
    }

    fn strategy(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    #[test]
    fn constructor_validates_config() {
        let config = RebalanceConfig {
            rebalance_threshold: 6_000,
            max_rebalance_amount: 1,
            cooldown_period: 3_600,
            auto_rebalance_enabled: true,
        };
        assert_eq!(
            RebalanceExecutor::new(OWNER, VAULT, MANAGER, config).unwrap_err(),
            ProtocolError::ThresholdTooHigh
        );
    }

    #[test]
    fn executes_and_records_history() {
        let mut executor = executor();
        let mut ctx = CallContext::new(VAULT, T0);

        let id = executor
            .execute_rebalance(&mut ctx, &[strategy(0xaa), strategy(0xbb)], &[300, 200], "Test rebalance")
            .unwrap();

        assert_eq!(id, 0);
        assert_eq!(executor.rebalance_count(), 1);
        assert_eq!(executor.last_rebalance_time(), Some(T0));
        let record = executor.rebalance_history(0).unwrap();
        assert_eq!(record.total_amount, 500);
        assert_eq!(record.reason, "Test rebalance");
        assert_eq!(record.trigger, RebalanceTrigger::Manual);
        assert_eq!(
            executor.rebalance_history(999),
            Err(ProtocolError::InvalidRebalanceId)
        );
        assert!(matches!(
            ctx.events()[0],
            core_types::ProtocolEvent::RebalanceExecutor(ExecutorEvent::RebalanceExecuted { rebalance_id: 0, .. })
        ));
    }

    #[test]
    fn execute_rebalance_guards() {
        let mut executor = executor();
        let one = [strategy(0xaa)];

        let mut stranger = CallContext::new(STRANGER, T0);
        assert_eq!(
            executor.execute_rebalance(&mut stranger, &one, &[1], "r"),
            Err(ProtocolError::OnlyVault)
        );

        let mut ctx = CallContext::new(VAULT, T0);
        assert_eq!(
            executor.execute_rebalance(&mut ctx, &one, &[1, 2], "r"),
            Err(ProtocolError::ArraysLengthMismatch)
        );
        assert_eq!(
            executor.execute_rebalance(&mut ctx, &[], &[], "r"),
            Err(ProtocolError::NoStrategiesProvided)
        );
        assert_eq!(
            executor.execute_rebalance(&mut ctx, &one, &[MAX + 1], "r"),
            Err(ProtocolError::AmountExceedsMaxRebalance)
        );
        assert!(ctx.events().is_empty());
        assert_eq!(executor.rebalance_count(), 0);
    }

    #[test]
    fn cooldown_gates_the_second_rebalance() {
        let mut executor = executor();
        let one = [strategy(0xaa)];
        executor
            .execute_rebalance(&mut CallContext::new(VAULT, T0), &one, &[1], "r")
            .unwrap();

        let status = executor.can_execute_rebalance(T0 + 1_000);
        assert!(!status.can_execute);
        assert_eq!(status.time_remaining, 2_600);
        assert_eq!(
            executor.execute_rebalance(&mut CallContext::new(VAULT, T0 + 3_599), &one, &[1], "r"),
            Err(ProtocolError::CooldownNotPassed)
        );

        assert!(executor.can_execute_rebalance(T0 + 3_600).can_execute);
        let id = executor
            .execute_rebalance(&mut CallContext::new(VAULT, T0 + 3_600), &one, &[1], "r")
            .unwrap();
        assert_eq!(id, 1);
    }

    #[test]
    fn rebalance_at_time_zero_still_starts_the_cooldown() {
        let mut executor = executor();
        let one = [strategy(0xaa)];
        assert!(executor.can_execute_rebalance(0).can_execute);
        assert_eq!(executor.last_rebalance_time(), None);

        executor
            .execute_rebalance(&mut CallContext::new(VAULT, 0), &one, &[1], "r")
            .unwrap();
        assert_eq!(executor.last_rebalance_time(), Some(0));

        let status = executor.can_execute_rebalance(10);
        assert!(!status.can_execute);
        assert_eq!(status.time_remaining, 3_590);
        assert_eq!(
            executor.execute_rebalance(&mut CallContext::new(VAULT, 10), &one, &[1], "r"),
            Err(ProtocolError::CooldownNotPassed)
        );
        assert_eq!(executor.rebalance_count(), 1);

        assert_eq!(
            executor.execute_rebalance(&mut CallContext::new(VAULT, 3_600), &one, &[1], "r"),
            Ok(1)
        );
    }

    #[test]
    fn reset_history_keeps_cooldown() {
        let mut executor = executor();
        let one = [strategy(0xaa)];
        executor
            .execute_rebalance(&mut CallContext::new(VAULT, T0), &one, &[1], "r")
            .unwrap();

        let mut owner = CallContext::new(OWNER, T0 + 10);
        executor.reset_history(&mut owner).unwrap();

        assert_eq!(executor.rebalance_count(), 0);
        assert_eq!(executor.last_rebalance_time(), Some(T0));
        assert_eq!(
            executor.execute_rebalance(&mut CallContext::new(VAULT, T0 + 20), &one, &[1], "r"),
            Err(ProtocolError::CooldownNotPassed)
        );
    }

    #[test]
    fn auto_rebalance_uses_active_allocations() {
        let mut executor = executor();
        let source = FixedAllocations(vec![(strategy(0xaa), 3_000), (strategy(0xbb), 0)]);

        let mut stranger = CallContext::new(STRANGER, T0);
        assert_eq!(
            executor.trigger_auto_rebalance(&mut stranger, &source),
            Err(ProtocolError::OnlyStrategyManager)
        );

        let mut ctx = CallContext::new(MANAGER, T0);
        let id = executor.trigger_auto_rebalance(&mut ctx, &source).unwrap();
        let record = executor.rebalance_history(id).unwrap();
        assert_eq!(record.amounts, vec![3_000, 0]);
        assert_eq!(record.reason, "Auto rebalance");
        assert_eq!(record.trigger, RebalanceTrigger::Auto);

        assert_eq!(
            executor.trigger_auto_rebalance(&mut CallContext::new(MANAGER, T0 + 1), &source),
            Err(ProtocolError::CooldownNotPassed)
        );
    }

    #[test]
    fn auto_rebalance_with_nothing_active_is_recorded_empty() {
        let mut executor = executor();
        let mut ctx = CallContext::new(MANAGER, T0);
        let id = executor
            .trigger_auto_rebalance(&mut ctx, &FixedAllocations(Vec::new()))
            .unwrap();
        let record = executor.rebalance_history(id).unwrap();
        assert!(record.strategies.is_empty());
        assert_eq!(record.total_amount, 0);
    }

    #[test]
    fn auto_rebalance_can_be_disabled() {
        let mut executor = executor();
        let mut owner = CallContext::new(OWNER, T0);
        let disabled = RebalanceConfig::new(1_000, MAX, 3_600, false).unwrap();
        executor.update_config(&mut owner, disabled).unwrap();

        let mut ctx = CallContext::new(MANAGER, T0);
        assert_eq!(
            executor.trigger_auto_rebalance(&mut ctx, &FixedAllocations(Vec::new())),
            Err(ProtocolError::AutoRebalancingDisabled)
        );
    }

    #[test]
    fn emergency_rebalance_bypasses_cooldown_and_history() {
        let mut executor = executor();
        executor
            .execute_rebalance(&mut CallContext::new(VAULT, T0), &[strategy(0xaa)], &[1], "r")
            .unwrap();

        let mut owner = CallContext::new(OWNER, T0 + 1);
        executor
            .emergency_rebalance(&mut owner, strategy(0xaa), 500)
            .unwrap();
        assert_eq!(executor.rebalance_count(), 1);
        assert_eq!(executor.last_rebalance_time(), Some(T0));

        assert_eq!(
            executor.emergency_rebalance(&mut owner, Address::ZERO, 500),
            Err(ProtocolError::InvalidStrategy)
        );
        assert_eq!(
            executor.emergency_rebalance(&mut owner, strategy(0xaa), 0),
            Err(ProtocolError::AmountMustBePositive)
        );
        let mut stranger = CallContext::new(STRANGER, T0 + 1);
        assert_eq!(
            executor.emergency_rebalance(&mut stranger, strategy(0xaa), 1),
            Err(ProtocolError::NotOwner)
        );
    }

    #[test]
    fn update_config_validates_and_is_owner_only() {
        let mut executor = executor();
        let mut owner = CallContext::new(OWNER, T0);
        let bad = RebalanceConfig {
            rebalance_threshold: 1_000,
            max_rebalance_amount: MAX,
            cooldown_period: 1_800,
            auto_rebalance_enabled: true,
        };
        assert_eq!(
            executor.update_config(&mut owner, bad),
            Err(ProtocolError::CooldownTooShort)
        );

        let good = RebalanceConfig::new(2_000, 5, 7_200, true).unwrap();
        let mut stranger = CallContext::new(STRANGER, T0);
        assert_eq!(
            executor.update_config(&mut stranger, good.clone()),
            Err(ProtocolError::NotOwner)
        );
        executor.update_config(&mut owner, good.clone()).unwrap();
        assert_eq!(executor.config(), &good);
    }

    #[test]
    fn pause_gates_recording() {
        let mut executor = executor();
        let mut owner = CallContext::new(OWNER, T0);
        executor.pause(&mut owner).unwrap();

        assert_eq!(
            executor.execute_rebalance(&mut CallContext::new(VAULT, T0), &[strategy(1)], &[1], "r"),
            Err(ProtocolError::Paused)
        );
        assert_eq!(
            executor.trigger_auto_rebalance(&mut CallContext::new(MANAGER, T0), &FixedAllocations(Vec::new())),
            Err(ProtocolError::Paused)
        );
    }

    #[test]
    fn recent_rebalances_are_newest_first() {
        let mut executor = executor();
        for i in 0..3u64 {
            let now = T0 + i * 3_600;
            executor
                .execute_rebalance(&mut CallContext::new(VAULT, now), &[strategy(1)], &[1], "r")
                .unwrap();
        }
        let recent: Vec<u64> = executor.recent_rebalances(2).iter().map(|r| r.id).collect();
        assert_eq!(recent, vec![2, 1]);
    }
}
