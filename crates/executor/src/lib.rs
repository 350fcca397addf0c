//! # AutoFi Rebalance Executor
//!
//! Rate-limits and logs rebalance operations, holds the rebalance policy and
//! answers the two advisory questions (should we rebalance, and to what).
//!
//! ## Architectural Principles
//!
//! - **Cooldown gating:** A rebalance is only recorded once `cooldown_period`
//!   has passed since the previous one. Manual and automatic rebalances share
//!   the same clock; emergency rebalances bypass it and are not recorded.
//! - **No side effects beyond bookkeeping:** The executor moves no funds. The
//!   vault calls it through the `RebalanceBook` port and only the history,
//!   counter and timestamp change.
//!
//! ## Public API
//!
//! - `RebalanceExecutor`: The component itself.
//! - `RebalanceHistory`: The append-only log of recorded rebalances.

pub mod history;
pub mod rebalancer;

pub use history::RebalanceHistory;
pub use rebalancer::RebalanceExecutor;
