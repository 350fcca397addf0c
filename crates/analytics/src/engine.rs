use crate::error::AnalyticsError;
use crate::report::{PortfolioReport, StrategyBreakdown};
use core_types::constants::{
    ANALYSIS_SUGGESTS_REBALANCING, MAX_BPS, NO_STRATEGIES_TO_ANALYZE, PERFORMING_WELL_THRESHOLD,
};
use core_types::{Address, Amount, Bps, PerformanceAdvice, ProtocolError, StrategyRecord};
use rust_decimal::Decimal;
use tracing::debug;

/// Converts basis points to a percentage (`150` -> `1.50`).
pub fn bps_to_pct(bps: Bps) -> Decimal {
    Decimal::new(i64::from(bps), 2)
}

/// A stateless calculator for advisory figures over the strategy registry.
#[derive(Debug, Default)]
pub struct AnalyticsEngine {}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixed advisory: any non-empty set of strategies warrants a rebalance.
    pub fn analyze_performance(&self, strategies: &[Address]) -> PerformanceAdvice {
        if strategies.is_empty() {
            return PerformanceAdvice {
                should_rebalance: false,
                reason: NO_STRATEGIES_TO_ANALYZE.to_string(),
            };
        }
        PerformanceAdvice {
            should_rebalance: true,
            reason: ANALYSIS_SUGGESTS_REBALANCING.to_string(),
        }
    }

    /// Equal-weight target allocation in basis points.
    ///
    /// Every strategy gets `10000 / n`; the remainder `10000 % n` is handed
    /// out one basis point at a time to the first strategies in input order,
    /// so a non-empty result always sums to 10000. `current_allocations` only
    /// has to match in length.
    pub fn calculate_optimal_allocation(
        &self,
        strategies: &[Address],
        current_allocations: &[Bps],
    ) -> Result<Vec<Bps>, ProtocolError> {
        if strategies.len() != current_allocations.len() {
            return Err(ProtocolError::ArraysLengthMismatch);
        }
        let n = strategies.len();
        if n == 0 {
            return Ok(Vec::new());
        }

        let total = MAX_BPS as usize;
        let base = total / n;
        let remainder = total % n;
        Ok((0..n)
            .map(|i| (base + usize::from(i < remainder)) as Bps)
            .collect())
    }

    /// Derives the portfolio summary for `records` holding `tvl` in total.
    pub fn portfolio_summary(
        &self,
        tvl: Amount,
        records: &[&StrategyRecord],
    ) -> Result<PortfolioReport, AnalyticsError> {
        let mut breakdown = Vec::with_capacity(records.len());
        let mut total_allocation: Bps = 0;
        let mut weighted_apy = Decimal::ZERO;
        let mut active_allocation: Bps = 0;
        let mut score_sum = Decimal::ZERO;
        let mut active = 0usize;

        for record in records {
            let target_amount = tvl
                .checked_mul(Amount::from(record.allocation))
                .map(|v| v / Amount::from(MAX_BPS))
                .ok_or_else(|| {
                    AnalyticsError::Calculation(format!(
                        "target amount overflows for {}",
                        record.strategy_address
                    ))
                })?;

            total_allocation += record.allocation;
            if record.is_active {
                active += 1;
                score_sum += Decimal::from(record.performance_score);
                if record.allocation > 0 {
                    active_allocation += record.allocation;
                    weighted_apy += Decimal::from(record.allocation) * bps_to_pct(record.apy);
                }
            }

            breakdown.push(StrategyBreakdown {
                address: record.strategy_address,
                name: record.name.clone(),
                is_active: record.is_active,
                allocation_bps: record.allocation,
                allocation_pct: bps_to_pct(record.allocation),
                target_amount,
                apy_pct: bps_to_pct(record.apy),
                performance_score: record.performance_score,
                performing_well: record.performance_score > PERFORMING_WELL_THRESHOLD,
                total_deposited: record.total_deposited,
            });
        }

        let weighted_apy_pct = (active_allocation > 0)
            .then(|| (weighted_apy / Decimal::from(active_allocation)).round_dp(2));
        let average_score = (active > 0).then(|| (score_sum / Decimal::from(active)).round_dp(2));
        debug!(
            tvl = %tvl,
            strategies = breakdown.len(),
            active,
            total_allocation,
            "portfolio summary computed"
        );

        Ok(PortfolioReport {
            tvl,
            total_allocation_bps: total_allocation,
            weighted_apy_pct,
            average_score,
            active_strategies: active,
            strategies: breakdown,
        })
    }
}
