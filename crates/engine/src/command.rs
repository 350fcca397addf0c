use crate::custody::CustodyMove;
use crate::state::ProtocolState;
use core_types::{
    Address, Amount, Bps, CallContext, ProtocolError, RebalanceBook, RebalanceConfig,
    StrategyBook,
};

/// Every state-changing operation the engine accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // --- Vault ---
    Deposit { amount: Amount },
    Withdraw { shares: Amount },
    VaultExecuteStrategy { strategy: Address, amount: Amount },
    VaultRebalance { strategies: Vec<Address>, amounts: Vec<Amount> },
    SetVaultStrategyManager { strategy_manager: Address },
    SetVaultRebalanceExecutor { rebalance_executor: Address },
    PauseVault,
    UnpauseVault,
    EmergencyWithdraw { amount: Amount },
    TransferVaultOwnership { new_owner: Address },

    // --- Strategy manager ---
    RegisterStrategy { strategy: Address, name: String, max_allocation: Bps },
    ActivateStrategy { strategy: Address },
    DeactivateStrategy { strategy: Address },
    UpdateAllocation { strategy: Address, allocation: Bps },
    RecordStrategyExecution { strategy: Address, amount: Amount },
    UpdatePerformance { strategy: Address, apy: Bps, performance_score: u32 },
    ResetAllocations,
    SetManagerVault { vault: Address },
    SetManagerRebalanceExecutor { rebalance_executor: Address },
    PauseStrategyManager,
    UnpauseStrategyManager,
    TransferStrategyManagerOwnership { new_owner: Address },

    // --- Rebalance executor ---
    ExecuteRebalance { strategies: Vec<Address>, amounts: Vec<Amount>, reason: String },
    TriggerAutoRebalance,
    EmergencyRebalance { strategy: Address, amount: Amount },
    UpdateRebalanceConfig { config: RebalanceConfig },
    ResetHistory,
    SetExecutorVault { vault: Address },
    SetExecutorStrategyManager { strategy_manager: Address },
    PauseRebalanceExecutor,
    UnpauseRebalanceExecutor,
    TransferRebalanceExecutorOwnership { new_owner: Address },
}

/// What a committed command hands back to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutput {
    Done,
    SharesMinted(Amount),
    AmountReturned(Amount),
    RebalanceId(u64),
}

/// The result of applying a command to a working copy of the state.
#[derive(Debug)]
pub(crate) struct Applied {
    pub output: CommandOutput,
    pub custody: Option<CustodyMove>,
}

impl Applied {
    fn done() -> Self {
        Self::with(CommandOutput::Done)
    }

    fn with(output: CommandOutput) -> Self {
        Self {
            output,
            custody: None,
        }
    }
}

impl Command {
    /// Stable name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Deposit { .. } => "vault.deposit",
            Command::Withdraw { .. } => "vault.withdraw",
            Command::VaultExecuteStrategy { .. } => "vault.execute_strategy",
            Command::VaultRebalance { .. } => "vault.rebalance",
            Command::SetVaultStrategyManager { .. } => "vault.set_strategy_manager",
            Command::SetVaultRebalanceExecutor { .. } => "vault.set_rebalance_executor",
            Command::PauseVault => "vault.pause",
            Command::UnpauseVault => "vault.unpause",
            Command::EmergencyWithdraw { .. } => "vault.emergency_withdraw",
            Command::TransferVaultOwnership { .. } => "vault.transfer_ownership",
            Command::RegisterStrategy { .. } => "strategy_manager.register_strategy",
            Command::ActivateStrategy { .. } => "strategy_manager.activate_strategy",
            Command::DeactivateStrategy { .. } => "strategy_manager.deactivate_strategy",
            Command::UpdateAllocation { .. } => "strategy_manager.update_allocation",
            Command::RecordStrategyExecution { .. } => "strategy_manager.execute_strategy",
            Command::UpdatePerformance { .. } => "strategy_manager.update_performance",
            Command::ResetAllocations => "strategy_manager.emergency_reset_allocations",
            Command::SetManagerVault { .. } => "strategy_manager.set_vault",
            Command::SetManagerRebalanceExecutor { .. } => "strategy_manager.set_rebalance_executor",
            Command::PauseStrategyManager => "strategy_manager.pause",
            Command::UnpauseStrategyManager => "strategy_manager.unpause",
            Command::TransferStrategyManagerOwnership { .. } => "strategy_manager.transfer_ownership",
            Command::ExecuteRebalance { .. } => "rebalance_executor.execute_rebalance",
            Command::TriggerAutoRebalance => "rebalance_executor.trigger_auto_rebalance",
            Command::EmergencyRebalance { .. } => "rebalance_executor.emergency_rebalance",
            Command::UpdateRebalanceConfig { .. } => "rebalance_executor.update_config",
            Command::ResetHistory => "rebalance_executor.reset_history",
            Command::SetExecutorVault { .. } => "rebalance_executor.set_vault",
            Command::SetExecutorStrategyManager { .. } => "rebalance_executor.set_strategy_manager",
            Command::PauseRebalanceExecutor => "rebalance_executor.pause",
            Command::UnpauseRebalanceExecutor => "rebalance_executor.unpause",
            Command::TransferRebalanceExecutorOwnership { .. } => "rebalance_executor.transfer_ownership",
        }
    }

    /// Applies the command to `state`. On error `state` may be partially
    /// modified and must be discarded.
    pub(crate) fn apply(
        self,
        state: &mut ProtocolState,
        ctx: &mut CallContext,
    ) -> Result<Applied, ProtocolError> {
        let ProtocolState {
            vault,
            strategy_manager,
            rebalance_executor,
            ..
        } = state;

        let applied = match self {
            Command::Deposit { amount } => {
                let shares = vault.deposit(ctx, amount)?;
                Applied {
                    output: CommandOutput::SharesMinted(shares),
                    custody: Some(CustodyMove::Collect {
                        from: ctx.caller(),
                        amount,
                    }),
                }
            }
            Command::Withdraw { shares } => {
                let amount = vault.withdraw(ctx, shares)?;
                Applied {
                    output: CommandOutput::AmountReturned(amount),
                    custody: Some(CustodyMove::Release {
                        to: ctx.caller(),
                        amount,
                    }),
                }
            }
            Command::VaultExecuteStrategy { strategy, amount } => {
                vault.execute_strategy(ctx, strategy_manager, strategy, amount)?;
                Applied::done()
            }
            Command::VaultRebalance { strategies, amounts } => {
                let id = vault.rebalance(ctx, rebalance_executor, &strategies, &amounts)?;
                Applied::with(CommandOutput::RebalanceId(id))
            }
            Command::SetVaultStrategyManager { strategy_manager: address } => {
                vault.set_strategy_manager(ctx, address)?;
                Applied::done()
            }
            Command::SetVaultRebalanceExecutor { rebalance_executor: address } => {
                vault.set_rebalance_executor(ctx, address)?;
                Applied::done()
            }
            Command::PauseVault => {
                vault.pause(ctx)?;
                Applied::done()
            }
            Command::UnpauseVault => {
                vault.unpause(ctx)?;
                Applied::done()
            }
            Command::EmergencyWithdraw { amount } => {
                let to = vault.emergency_withdraw(ctx, amount)?;
                Applied {
                    output: CommandOutput::AmountReturned(amount),
                    custody: Some(CustodyMove::Release { to, amount }),
                }
            }
            Command::TransferVaultOwnership { new_owner } => {
                vault.transfer_ownership(ctx, new_owner)?;
                Applied::done()
            }

            Command::RegisterStrategy {
                strategy,
                name,
                max_allocation,
            } => {
                strategy_manager.register_strategy(ctx, strategy, &name, max_allocation)?;
                Applied::done()
            }
            Command::ActivateStrategy { strategy } => {
                strategy_manager.activate_strategy(ctx, strategy)?;
                Applied::done()
            }
            Command::DeactivateStrategy { strategy } => {
                strategy_manager.deactivate_strategy(ctx, strategy)?;
                Applied::done()
            }
            Command::UpdateAllocation {
                strategy,
                allocation,
            } => {
                strategy_manager.update_allocation(ctx, strategy, allocation)?;
                Applied::done()
            }
            Command::RecordStrategyExecution { strategy, amount } => {
                strategy_manager.execute_strategy(ctx, strategy, amount)?;
                Applied::done()
            }
            Command::UpdatePerformance {
                strategy,
                apy,
                performance_score,
            } => {
                strategy_manager.update_performance(ctx, strategy, apy, performance_score)?;
                Applied::done()
            }
            Command::ResetAllocations => {
                strategy_manager.emergency_reset_allocations(ctx)?;
                Applied::done()
            }
            Command::SetManagerVault { vault: address } => {
                strategy_manager.set_vault(ctx, address)?;
                Applied::done()
            }
            Command::SetManagerRebalanceExecutor { rebalance_executor: address } => {
                strategy_manager.set_rebalance_executor(ctx, address)?;
                Applied::done()
            }
            Command::PauseStrategyManager => {
                strategy_manager.pause(ctx)?;
                Applied::done()
            }
            Command::UnpauseStrategyManager => {
                strategy_manager.unpause(ctx)?;
                Applied::done()
            }
            Command::TransferStrategyManagerOwnership { new_owner } => {
                strategy_manager.transfer_ownership(ctx, new_owner)?;
                Applied::done()
            }

            Command::ExecuteRebalance {
                strategies,
                amounts,
                reason,
            } => {
                let id = rebalance_executor.execute_rebalance(ctx, &strategies, &amounts, &reason)?;
                Applied::with(CommandOutput::RebalanceId(id))
            }
            Command::TriggerAutoRebalance => {
                let id = rebalance_executor.trigger_auto_rebalance(ctx, &*strategy_manager)?;
                Applied::with(CommandOutput::RebalanceId(id))
            }
            Command::EmergencyRebalance { strategy, amount } => {
                rebalance_executor.emergency_rebalance(ctx, strategy, amount)?;
                Applied::done()
            }
            Command::UpdateRebalanceConfig { config } => {
                rebalance_executor.update_config(ctx, config)?;
                Applied::done()
            }
            Command::ResetHistory => {
                rebalance_executor.reset_history(ctx)?;
                Applied::done()
            }
            Command::SetExecutorVault { vault: address } => {
                rebalance_executor.set_vault(ctx, address)?;
                Applied::done()
            }
            Command::SetExecutorStrategyManager { strategy_manager: address } => {
                rebalance_executor.set_strategy_manager(ctx, address)?;
                Applied::done()
            }
            Command::PauseRebalanceExecutor => {
                rebalance_executor.pause(ctx)?;
                Applied::done()
            }
            Command::UnpauseRebalanceExecutor => {
                rebalance_executor.unpause(ctx)?;
                Applied::done()
            }
            Command::TransferRebalanceExecutorOwnership { new_owner } => {
                rebalance_executor.transfer_ownership(ctx, new_owner)?;
                Applied::done()
            }
        };
        Ok(applied)
    }
}
