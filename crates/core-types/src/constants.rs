//! Policy constants shared by the core components.

use crate::{Amount, Bps, Timestamp};

/// 100% expressed in basis points.
pub const MAX_BPS: Bps = 10_000;

/// Upper bound of a strategy's performance score.
pub const MAX_PERFORMANCE_SCORE: u8 = 100;

/// A strategy performs well when its score is strictly above this value.
pub const PERFORMING_WELL_THRESHOLD: u8 = 50;

/// Largest accepted rebalance threshold (50%).
pub const MAX_REBALANCE_THRESHOLD_BPS: Bps = 5_000;

/// Shortest accepted cooldown between rebalances (one hour).
pub const MIN_COOLDOWN_SECS: Timestamp = 3_600;

/// 100 units of a 6-decimal asset.
pub const DEFAULT_MIN_DEPOSIT: Amount = 100_000_000;

/// Seven days.
pub const DEFAULT_LOCK_PERIOD_SECS: Timestamp = 7 * 24 * 3_600;

pub const VAULT_REBALANCE_REASON: &str = "Vault rebalance";
pub const AUTO_REBALANCE_REASON: &str = "Auto rebalance";

pub const NO_STRATEGIES_TO_ANALYZE: &str = "No strategies to analyze";
pub const ANALYSIS_SUGGESTS_REBALANCING: &str = "Performance analysis suggests rebalancing";
