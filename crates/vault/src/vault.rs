use crate::info::{UserInfo, VaultInfo};
use crate::ledger::{CapitalLedger, PlacementLedger, PlacementMovement};
use core_types::constants::{MAX_BPS, VAULT_REBALANCE_REASON};
use core_types::{
    Address, Amount, Bps, CallContext, Ownership, PlacementKind, ProtocolError, RebalanceBook,
    StrategyBook, Timestamp, VaultEvent,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Construction parameters. Collaborator addresses may be zero and bound later.
#[derive(Debug, Clone)]
pub struct VaultParams {
    pub address: Address,
    pub owner: Address,
    pub asset_token: Address,
    pub reward_token: Address,
    pub strategy_manager: Address,
    pub rebalance_executor: Address,
    pub min_deposit: Amount,
    pub lock_period: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vault {
    /// The identity the vault acts as when calling other components.
    address: Address,
    ownership: Ownership,
    asset_token: Address,
    reward_token: Address,
    strategy_manager: Address,
    rebalance_executor: Address,
    #[serde(with = "core_types::amount::string")]
    min_deposit: Amount,
    lock_period: Timestamp,
    capital: CapitalLedger,
    placements: PlacementLedger,
}

impl Vault {
    pub fn new(params: VaultParams) -> Self {
        Self {
            address: params.address,
            ownership: Ownership::new(params.owner),
            asset_token: params.asset_token,
            reward_token: params.reward_token,
            strategy_manager: params.strategy_manager,
            rebalance_executor: params.rebalance_executor,
            min_deposit: params.min_deposit,
            lock_period: params.lock_period,
            capital: CapitalLedger::default(),
            placements: PlacementLedger::default(),
        }
    }

    // ==========================================================================
    // Depositors
    // ==========================================================================

    /// Credits the caller 1:1 and restarts their lock. Returns the shares minted.
    pub fn deposit(&mut self, ctx: &mut CallContext, amount: Amount) -> Result<Amount, ProtocolError> {
        self.ownership.ensure_not_paused()?;
        if amount < self.min_deposit {
            return Err(ProtocolError::DepositTooSmall);
        }
        let user = ctx.caller();
        let shares = self.capital.credit(user, amount, ctx.now())?;
        ctx.emit(VaultEvent::Deposit {
            user,
            amount,
            shares,
        });
        Ok(shares)
    }

    /// Burns the caller's shares 1:1. Returns the amount owed back.
    pub fn withdraw(&mut self, ctx: &mut CallContext, shares: Amount) -> Result<Amount, ProtocolError> {
        let user = ctx.caller();
        if self.is_locked(user, ctx.now()) {
            return Err(ProtocolError::FundsLocked);
        }
        let amount = self.capital.debit(user, shares)?;
        ctx.emit(VaultEvent::Withdraw {
            user,
            shares,
            amount,
        });
        Ok(amount)
    }

    // ==========================================================================
    // Placement
    // ==========================================================================

    /// Records `amount` of capital as placed into `strategy` and forwards the
    /// bookkeeping to the strategy manager. `total_assets` is unchanged.
    pub fn execute_strategy(
        &mut self,
        ctx: &mut CallContext,
        manager: &mut impl StrategyBook,
        strategy: Address,
        amount: Amount,
    ) -> Result<(), ProtocolError> {
        if ctx.caller() != self.strategy_manager {
            return Err(ProtocolError::Unauthorized);
        }
        if amount > self.capital.total_assets() {
            return Err(ProtocolError::InsufficientVaultBalance);
        }

        ctx.delegate(self.address, |inner| manager.execute_strategy(inner, strategy, amount))?;

        self.placements.apply(PlacementMovement {
            timestamp: ctx.now(),
            strategy,
            amount,
            kind: PlacementKind::StrategyExecution,
        })?;
        ctx.emit(VaultEvent::StrategyExecuted { strategy, amount });
        Ok(())
    }

    /// Re-targets placements and has the executor record the rebalance.
    /// Returns the id of the executor's history record.
    pub fn rebalance(
        &mut self,
        ctx: &mut CallContext,
        executor: &mut impl RebalanceBook,
        strategies: &[Address],
        amounts: &[Amount],
    ) -> Result<u64, ProtocolError> {
        if ctx.caller() != self.rebalance_executor {
            return Err(ProtocolError::Unauthorized);
        }
        if strategies.len() != amounts.len() {
            return Err(ProtocolError::ArraysLengthMismatch);
        }
        let total_amount = amounts
            .iter()
            .try_fold(0u128, |acc, a| acc.checked_add(*a))
            .ok_or(ProtocolError::Overflow)?;

        let id = ctx.delegate(self.address, |inner| {
            executor.execute_rebalance(inner, strategies, amounts, VAULT_REBALANCE_REASON)
        })?;

        let now = ctx.now();
        for (strategy, amount) in strategies.iter().zip(amounts) {
            self.placements.apply(PlacementMovement {
                timestamp: now,
                strategy: *strategy,
                amount: *amount,
                kind: PlacementKind::Rebalance,
            })?;
        }
        debug!(id, legs = strategies.len(), "vault rebalance placed");
        ctx.emit(VaultEvent::RebalanceExecuted {
            strategies: strategies.to_vec(),
            amounts: amounts.to_vec(),
            total_amount,
        });
        Ok(id)
    }

    // ==========================================================================
    // Administration
    // ==========================================================================

    pub fn set_strategy_manager(
        &mut self,
        ctx: &mut CallContext,
        strategy_manager: Address,
    ) -> Result<(), ProtocolError> {
        self.ownership.ensure_owner(ctx)?;
        let previous = std::mem::replace(&mut self.strategy_manager, strategy_manager);
        ctx.emit(VaultEvent::StrategyManagerUpdated {
            previous,
            current: strategy_manager,
        });
        Ok(())
    }

    pub fn set_rebalance_executor(
        &mut self,
        ctx: &mut CallContext,
        rebalance_executor: Address,
    ) -> Result<(), ProtocolError> {
        self.ownership.ensure_owner(ctx)?;
        let previous = std::mem::replace(&mut self.rebalance_executor, rebalance_executor);
        ctx.emit(VaultEvent::RebalanceExecutorUpdated {
            previous,
            current: rebalance_executor,
        });
        Ok(())
    }

    /// Gates `deposit` only.
    pub fn pause(&mut self, ctx: &mut CallContext) -> Result<(), ProtocolError> {
        self.ownership.pause(ctx)?;
        ctx.emit(VaultEvent::Paused {
            account: ctx.caller(),
        });
        Ok(())
    }

    pub fn unpause(&mut self, ctx: &mut CallContext) -> Result<(), ProtocolError> {
        self.ownership.unpause(ctx)?;
        ctx.emit(VaultEvent::Unpaused {
            account: ctx.caller(),
        });
        Ok(())
    }

    /// Lets the owner pull `amount` of the asset out regardless of locks.
    /// The capital ledger is left as is; the custody layer moves the funds.
    pub fn emergency_withdraw(&mut self, ctx: &mut CallContext, amount: Amount) -> Result<Address, ProtocolError> {
        self.ownership.ensure_owner(ctx)?;
        let to = self.ownership.owner();
        ctx.emit(VaultEvent::EmergencyWithdraw { to, amount });
        Ok(to)
    }

    pub fn transfer_ownership(
        &mut self,
        ctx: &mut CallContext,
        new_owner: Address,
    ) -> Result<(), ProtocolError> {
        let previous = self.ownership.transfer(ctx, new_owner)?;
        ctx.emit(VaultEvent::OwnershipTransferred {
            previous,
            current: new_owner,
        });
        Ok(())
    }

    // ==========================================================================
    // Views
    // ==========================================================================

    /// `floor(balance * 10000 / total_assets)`, zero while the vault is empty.
    pub fn user_share(&self, user: Address) -> Bps {
        let total = self.capital.total_assets();
        if total == 0 {
            return 0;
        }
        let balance = self.capital.balance_of(user);
        let bps = Amount::from(MAX_BPS);
        let share = match balance.checked_mul(bps) {
            Some(scaled) => scaled / total,
            None => balance / (total / bps),
        };
        // balance <= total, so share <= 10000.
        share as Bps
    }

    pub fn tvl(&self) -> Amount {
        self.capital.total_assets()
    }

    pub fn is_locked(&self, user: Address, now: Timestamp) -> bool {
        now < self.unlock_time(user)
    }

    fn unlock_time(&self, user: Address) -> Timestamp {
        self.capital
            .deposit_timestamp(user)
            .saturating_add(self.lock_period)
    }

    pub fn balance_of(&self, user: Address) -> Amount {
        self.capital.balance_of(user)
    }

    pub fn user_info(&self, user: Address, now: Timestamp) -> UserInfo {
        let balance = self.capital.balance_of(user);
        let last_deposit_time = self.capital.deposit_timestamp(user);
        UserInfo {
            user,
            balance,
            shares: balance,
            share_bps: self.user_share(user),
            is_locked: self.is_locked(user, now),
            last_deposit_time,
            unlock_time: if last_deposit_time == 0 {
                0
            } else {
                self.unlock_time(user)
            },
        }
    }

    pub fn vault_info(&self) -> VaultInfo {
        VaultInfo {
            address: self.address,
            owner: self.ownership.owner(),
            total_assets: self.capital.total_assets(),
            total_shares: self.capital.total_shares(),
            asset_token: self.asset_token,
            reward_token: self.reward_token,
            strategy_manager: self.strategy_manager,
            rebalance_executor: self.rebalance_executor,
            min_deposit: self.min_deposit,
            lock_period: self.lock_period,
            paused: self.ownership.is_paused(),
            depositors: self.capital.depositors(),
        }
    }

    pub fn capital(&self) -> &CapitalLedger {
        &self.capital
    }

    pub fn placements(&self) -> &PlacementLedger {
        &self.placements
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.ownership.owner()
    }

    pub fn strategy_manager(&self) -> Address {
        self.strategy_manager
    }

    pub fn rebalance_executor(&self) -> Address {
        self.rebalance_executor
    }

    pub fn is_paused(&self) -> bool {
        self.ownership.is_paused()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{ProtocolEvent, RebalanceConfig};
    use executor::RebalanceExecutor;
    use proptest::prelude::*;
    use strategies::StrategyManager;

    const OWNER: Address = Address::new([0x01; 20]);
    const VAULT: Address = Address::new([0x02; 20]);
    const MANAGER: Address = Address::new([0x03; 20]);
    const EXECUTOR: Address = Address::new([0x04; 20]);
    const ALICE: Address = Address::new([0x0a; 20]);
    const BOB: Address = Address::new([0x0b; 20]);
    const T0: Timestamp = 1_700_000_000;
    const WEEK: Timestamp = 7 * 24 * 3_600;
    const MIN: Amount = 100_000_000;

    fn vault() -> Vault {
        Vault::new(VaultParams {
            address: VAULT,
            owner: OWNER,
            asset_token: Address::repeat_byte(0x05),
            reward_token: Address::repeat_byte(0x06),
            strategy_manager: MANAGER,
            rebalance_executor: EXECUTOR,
            min_deposit: MIN,
            lock_period: WEEK,
        })
    }

    fn aave() -> Address {
        Address::repeat_byte(0xaa)
    }

    fn manager_with_active_aave() -> StrategyManager {
        let mut manager = StrategyManager::new(OWNER, VAULT, EXECUTOR);
        let mut owner = CallContext::new(OWNER, T0);
        manager.register_strategy(&mut owner, aave(), "Aave", 5_000).unwrap();
        manager.activate_strategy(&mut owner, aave()).unwrap();
        manager
    }

    fn rebalance_executor() -> RebalanceExecutor {
        let config = RebalanceConfig::new(1_000, 10_000_000_000, 3_600, true).unwrap();
        RebalanceExecutor::new(OWNER, VAULT, MANAGER, config).unwrap()
    }

    fn deposit(vault: &mut Vault, user: Address, amount: Amount, now: Timestamp) {
        vault.deposit(&mut CallContext::new(user, now), amount).unwrap();
    }

    #[test]
    fn deposit_mints_shares_one_to_one() {
        let mut vault = vault();
        let mut ctx = CallContext::new(ALICE, T0);
        let shares = vault.deposit(&mut ctx, 1_000 * MIN).unwrap();

        assert_eq!(shares, 1_000 * MIN);
        assert_eq!(vault.balance_of(ALICE), 1_000 * MIN);
        assert_eq!(vault.tvl(), 1_000 * MIN);
        assert_eq!(vault.capital().total_shares(), 1_000 * MIN);
        assert!(vault.is_locked(ALICE, T0));
        assert_eq!(
            ctx.events(),
            &[ProtocolEvent::Vault(VaultEvent::Deposit {
                user: ALICE,
                amount: 1_000 * MIN,
                shares: 1_000 * MIN,
            })]
        );
    }

    #[test]
    fn deposit_below_minimum_is_rejected() {
        let mut vault = vault();
        let mut ctx = CallContext::new(ALICE, T0);
        assert_eq!(vault.deposit(&mut ctx, MIN - 1), Err(ProtocolError::DepositTooSmall));
        vault.deposit(&mut ctx, MIN).unwrap();
    }

    #[test]
    fn withdraw_respects_lock_and_balance() {
        let mut vault = vault();
        deposit(&mut vault, ALICE, 1_000 * MIN, T0);

        let mut early = CallContext::new(ALICE, T0 + WEEK - 1);
        assert_eq!(vault.withdraw(&mut early, MIN), Err(ProtocolError::FundsLocked));

        let mut later = CallContext::new(ALICE, T0 + WEEK);
        assert_eq!(
            vault.withdraw(&mut later, 1_000 * MIN + 1),
            Err(ProtocolError::InsufficientBalance)
        );
        assert_eq!(vault.withdraw(&mut later, 400 * MIN).unwrap(), 400 * MIN);
        assert_eq!(vault.balance_of(ALICE), 600 * MIN);
        assert_eq!(vault.tvl(), 600 * MIN);
    }

    #[test]
    fn new_deposit_restarts_the_lock() {
        let mut vault = vault();
        deposit(&mut vault, ALICE, MIN, T0);
        deposit(&mut vault, ALICE, MIN, T0 + WEEK);
        assert!(vault.is_locked(ALICE, T0 + WEEK + 1));
        assert_eq!(vault.user_info(ALICE, T0 + WEEK).unlock_time, T0 + 2 * WEEK);
    }

    #[test]
    fn pause_gates_deposit_only() {
        let mut vault = vault();
        deposit(&mut vault, ALICE, MIN, T0);
        let mut owner = CallContext::new(OWNER, T0);
        vault.pause(&mut owner).unwrap();

        let mut bob = CallContext::new(BOB, T0);
        assert_eq!(vault.deposit(&mut bob, MIN), Err(ProtocolError::Paused));

        let mut alice = CallContext::new(ALICE, T0 + WEEK);
        vault.withdraw(&mut alice, MIN).unwrap();

        let mut stranger = CallContext::new(BOB, T0);
        assert_eq!(vault.unpause(&mut stranger), Err(ProtocolError::NotOwner));
        vault.unpause(&mut owner).unwrap();
        vault.deposit(&mut bob, MIN).unwrap();
    }

    #[test]
    fn user_share_in_basis_points() {
        let mut vault = vault();
        assert_eq!(vault.user_share(ALICE), 0);

        deposit(&mut vault, ALICE, 2 * MIN, T0);
        deposit(&mut vault, BOB, MIN, T0);
        assert_eq!(vault.user_share(ALICE), 6_666);
        assert_eq!(vault.user_share(BOB), 3_333);
    }

    #[test]
    fn execute_strategy_places_capital_without_moving_assets() {
        let mut vault = vault();
        let mut manager = manager_with_active_aave();
        deposit(&mut vault, ALICE, 1_000 * MIN, T0);

        let mut ctx = CallContext::new(MANAGER, T0 + 1);
        vault
            .execute_strategy(&mut ctx, &mut manager, aave(), 500 * MIN)
            .unwrap();

        assert_eq!(vault.tvl(), 1_000 * MIN);
        assert_eq!(vault.placements().position(aave()), 500 * MIN);
        assert_eq!(manager.strategy(aave()).unwrap().total_deposited, 500 * MIN);
        assert_eq!(ctx.caller(), MANAGER);
        assert_eq!(ctx.events().len(), 2);
    }

    #[test]
    fn execute_strategy_guards() {
        let mut vault = vault();
        let mut manager = manager_with_active_aave();
        deposit(&mut vault, ALICE, MIN, T0);

        let mut stranger = CallContext::new(ALICE, T0);
        assert_eq!(
            vault.execute_strategy(&mut stranger, &mut manager, aave(), 1),
            Err(ProtocolError::Unauthorized)
        );

        let mut ctx = CallContext::new(MANAGER, T0);
        assert_eq!(
            vault.execute_strategy(&mut ctx, &mut manager, aave(), MIN + 1),
            Err(ProtocolError::InsufficientVaultBalance)
        );
    }

    #[test]
    fn nested_rejection_from_manager_fails_the_whole_call() {
        let mut vault = vault();
        let mut manager = manager_with_active_aave();
        deposit(&mut vault, ALICE, MIN, T0);

        let mut ctx = CallContext::new(MANAGER, T0);
        let unknown = Address::repeat_byte(0xee);
        assert_eq!(
            vault.execute_strategy(&mut ctx, &mut manager, unknown, 1),
            Err(ProtocolError::StrategyNotActive)
        );
        assert!(vault.placements().movements().is_empty());
        assert_eq!(ctx.caller(), MANAGER);
    }

    #[test]
    fn rebalance_forwards_to_the_executor() {
        let mut vault = vault();
        let mut executor = rebalance_executor();
        let strategies = [aave(), Address::repeat_byte(0xbb)];

        let mut ctx = CallContext::new(EXECUTOR, T0);
        let id = vault
            .rebalance(&mut ctx, &mut executor, &strategies, &[300, 200])
            .unwrap();

        assert_eq!(id, 0);
        assert_eq!(vault.placements().position(aave()), 300);
        let record = executor.rebalance_history(0).unwrap();
        assert_eq!(record.reason, "Vault rebalance");
        assert_eq!(record.total_amount, 500);
        assert!(matches!(
            ctx.events().last(),
            Some(ProtocolEvent::Vault(VaultEvent::RebalanceExecuted { total_amount: 500, .. }))
        ));
    }

    #[test]
    fn rebalance_guards() {
        let mut vault = vault();
        let mut executor = rebalance_executor();

        let mut stranger = CallContext::new(ALICE, T0);
        assert_eq!(
            vault.rebalance(&mut stranger, &mut executor, &[aave()], &[1]),
            Err(ProtocolError::Unauthorized)
        );

        let mut ctx = CallContext::new(EXECUTOR, T0);
        assert_eq!(
            vault.rebalance(&mut ctx, &mut executor, &[aave()], &[1, 2]),
            Err(ProtocolError::ArraysLengthMismatch)
        );
    }

    #[test]
    fn emergency_withdraw_is_owner_only_and_keeps_the_ledger() {
        let mut vault = vault();
        deposit(&mut vault, ALICE, MIN, T0);

        let mut stranger = CallContext::new(ALICE, T0);
        assert_eq!(
            vault.emergency_withdraw(&mut stranger, MIN),
            Err(ProtocolError::NotOwner)
        );

        let mut owner = CallContext::new(OWNER, T0);
        assert_eq!(vault.emergency_withdraw(&mut owner, MIN).unwrap(), OWNER);
        assert_eq!(vault.tvl(), MIN);
    }

    #[test]
    fn ownership_transfer_moves_admin_rights() {
        let mut vault = vault();
        let mut owner = CallContext::new(OWNER, T0);
        assert_eq!(
            vault.transfer_ownership(&mut owner, Address::ZERO),
            Err(ProtocolError::InvalidAddress)
        );
        vault.transfer_ownership(&mut owner, BOB).unwrap();

        assert_eq!(vault.pause(&mut owner), Err(ProtocolError::NotOwner));
        vault.pause(&mut CallContext::new(BOB, T0)).unwrap();
    }

    #[derive(Debug, Clone)]
    enum Op {
        Deposit(usize, Amount),
        Withdraw(usize, Amount),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..3, MIN..=50 * MIN).prop_map(|(u, a)| Op::Deposit(u, a)),
            (0usize..3, 0..=60 * MIN).prop_map(|(u, s)| Op::Withdraw(u, s)),
        ]
    }

    proptest! {
        #[test]
        fn prop_capital_ledger_stays_balanced(ops in prop::collection::vec(op(), 1..50)) {
            let users = [ALICE, BOB, Address::repeat_byte(0x0c)];
            let mut vault = vault();
            let mut now = T0;

            for op in ops {
                now += WEEK;
                let _ = match op {
                    Op::Deposit(u, amount) => vault.deposit(&mut CallContext::new(users[u], now), amount),
                    Op::Withdraw(u, shares) => vault.withdraw(&mut CallContext::new(users[u], now), shares),
                };
                let capital = vault.capital();
                prop_assert_eq!(capital.total_assets(), capital.total_shares());
                prop_assert_eq!(capital.total_assets(), capital.sum_of_balances());
            }
        }
    }
}
