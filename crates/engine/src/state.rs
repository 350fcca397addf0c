use crate::error::EngineError;
use configuration::Config;
use core_types::{Amount, CallContext, ProtocolEvent, RebalanceConfig, Timestamp};
use executor::RebalanceExecutor;
use serde::{Deserialize, Serialize};
use strategies::StrategyManager;
use tracing::info;
use vault::{Vault, VaultParams};

/// The three core components, committed and persisted as one unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolState {
    pub vault: Vault,
    pub strategy_manager: StrategyManager,
    pub rebalance_executor: RebalanceExecutor,
    /// What custody held when this state was committed. Custody is reseeded
    /// from it on load, since emergency withdrawals leave the ledger alone.
    #[serde(default)]
    pub custody_held: Amount,
}

impl ProtocolState {
    /// Deploys and links the three components, then registers the configured
    /// sample strategies. Returns the state and the events the setup emitted.
    pub fn bootstrap(
        config: &Config,
        now: Timestamp,
    ) -> Result<(Self, Vec<ProtocolEvent>), EngineError> {
        let deployment = &config.deployment;

        let vault = Vault::new(VaultParams {
            address: deployment.vault,
            owner: deployment.owner,
            asset_token: deployment.asset_token,
            reward_token: deployment.reward_token,
            strategy_manager: deployment.strategy_manager,
            rebalance_executor: deployment.rebalance_executor,
            min_deposit: config.vault.min_deposit,
            lock_period: config.vault.lock_period_secs,
        });
        let strategy_manager = StrategyManager::new(
            deployment.owner,
            deployment.vault,
            deployment.rebalance_executor,
        );
        let rebalance_config = RebalanceConfig::new(
            config.rebalance.threshold_bps,
            config.rebalance.max_rebalance_amount,
            config.rebalance.cooldown_secs,
            config.rebalance.auto_enabled,
        )?;
        let rebalance_executor = RebalanceExecutor::new(
            deployment.owner,
            deployment.vault,
            deployment.strategy_manager,
            rebalance_config,
        )?;

        let mut state = Self {
            vault,
            strategy_manager,
            rebalance_executor,
            custody_held: 0,
        };

        let mut ctx = CallContext::new(deployment.owner, now);
        for seed in &config.strategies {
            let manager = &mut state.strategy_manager;
            manager.register_strategy(&mut ctx, seed.address, &seed.name, seed.max_allocation_bps)?;
            if seed.activate {
                manager.activate_strategy(&mut ctx, seed.address)?;
            }
            if seed.allocation_bps > 0 {
                manager.update_allocation(&mut ctx, seed.address, seed.allocation_bps)?;
            }
            info!(strategy = %seed.address, name = %seed.name, "sample strategy registered");
        }

        Ok((state, ctx.into_events()))
    }
}
