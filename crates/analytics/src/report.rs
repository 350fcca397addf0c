use core_types::{Address, Amount, Bps};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A snapshot of where the vault's capital is meant to sit and how the
/// strategies holding it are doing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioReport {
    #[serde(with = "core_types::amount::string")]
    pub tvl: Amount,
    pub total_allocation_bps: Bps,
    /// Allocation weighted APY over active strategies, in percent. `None` when
    /// nothing active carries an allocation.
    pub weighted_apy_pct: Option<Decimal>,
    /// Mean score of the active strategies.
    pub average_score: Option<Decimal>,
    pub active_strategies: usize,
    pub strategies: Vec<StrategyBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyBreakdown {
    pub address: Address,
    pub name: String,
    pub is_active: bool,
    pub allocation_bps: Bps,
    pub allocation_pct: Decimal,
    /// `tvl * allocation / 10000`, rounded down.
    #[serde(with = "core_types::amount::string")]
    pub target_amount: Amount,
    pub apy_pct: Decimal,
    pub performance_score: u8,
    pub performing_well: bool,
    #[serde(with = "core_types::amount::string")]
    pub total_deposited: Amount,
}
