//! # AutoFi Vault
//!
//! Custody accounting for pooled deposits.
//!
//! The vault keeps two ledgers that never touch each other:
//!
//! - The **capital ledger** is what the vault owes its depositors: per-user
//!   balances, deposit timestamps and the totals. Shares are minted 1:1 with
//!   the deposited amount, so `total_assets == total_shares == Σ balances`
//!   always holds. Only `deposit` and `withdraw` change it.
//! - The **placement ledger** records where capital is notionally deployed.
//!   Strategy executions and rebalances write to it and nothing else.
//!
//! Cross-component calls go through the `StrategyBook` and `RebalanceBook`
//! ports with the vault's own address as the caller. A rejection from the
//! callee rejects the vault operation.

pub mod info;
pub mod ledger;
pub mod vault;

pub use info::{UserInfo, VaultInfo};
pub use ledger::{CapitalLedger, PlacementLedger, PlacementMovement};
pub use vault::{Vault, VaultParams};
