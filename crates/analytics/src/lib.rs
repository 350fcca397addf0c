//! # AutoFi Analytics
//!
//! Advisory calculations over the strategy registry. None of these functions
//! touch protocol state; the rebalance executor and the RPC layer call them
//! and decide what to do with the answer.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** The `AnalyticsEngine` is a stateless calculator.
//!
//! The performance analysis and the optimal allocation are deliberately simple
//! placeholders: a fixed advisory and an equal-weight split.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: The main struct that contains the calculation logic.
//! - `PortfolioReport`: Derived figures for the whole registry.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use engine::{AnalyticsEngine, bps_to_pct};
pub use error::AnalyticsError;
pub use report::{PortfolioReport, StrategyBreakdown};
