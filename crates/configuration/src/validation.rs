use crate::error::ConfigError;
use crate::settings::Config;
use core_types::constants::MAX_BPS;
use core_types::{Bps, RebalanceConfig};
use std::collections::HashSet;

/// Checks everything a bootstrap would otherwise reject halfway through.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let deployment = &config.deployment;
    if deployment.owner.is_zero() {
        return Err(invalid("deployment.owner must not be the zero address"));
    }

    let components = [
        ("deployment.vault", deployment.vault),
        ("deployment.strategy_manager", deployment.strategy_manager),
        ("deployment.rebalance_executor", deployment.rebalance_executor),
    ];
    let mut seen = HashSet::new();
    for (field, address) in components {
        if address.is_zero() {
            return Err(invalid(&format!("{} must not be the zero address", field)));
        }
        if !seen.insert(address) {
            return Err(invalid(&format!("{} duplicates another component address", field)));
        }
    }

    RebalanceConfig::new(
        config.rebalance.threshold_bps,
        config.rebalance.max_rebalance_amount,
        config.rebalance.cooldown_secs,
        config.rebalance.auto_enabled,
    )
    .map_err(|e| invalid(&format!("rebalance: {}", e)))?;

    if config.server.host.trim().is_empty() {
        return Err(invalid("server.host must not be empty"));
    }

    let mut addresses = HashSet::new();
    let mut total_allocation: Bps = 0;
    for seed in &config.strategies {
        if seed.address.is_zero() {
            return Err(invalid(&format!("strategy '{}' has the zero address", seed.name)));
        }
        if !addresses.insert(seed.address) {
            return Err(invalid(&format!("strategy {} is listed twice", seed.address)));
        }
        if seed.max_allocation_bps > MAX_BPS {
            return Err(invalid(&format!(
                "strategy '{}' max_allocation_bps exceeds {}",
                seed.name, MAX_BPS
            )));
        }
        if seed.allocation_bps > seed.max_allocation_bps {
            return Err(invalid(&format!(
                "strategy '{}' allocation_bps exceeds its max_allocation_bps",
                seed.name
            )));
        }
        total_allocation = total_allocation.saturating_add(seed.allocation_bps);
    }
    if total_allocation > MAX_BPS {
        return Err(invalid("strategy allocations sum to more than 100%"));
    }

    Ok(())
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::ValidationError(message.to_string())
}
