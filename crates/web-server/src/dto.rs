//! Request bodies and response shapes of the HTTP API.
//!
//! Amounts travel as decimal strings; plain JSON numbers are accepted on input.

use core_types::{Address, Amount, Bps, PerformanceMetrics, Timestamp};
use engine::CommandOutput;
use serde::{Deserialize, Serialize};

// ==============================================================================
// Requests
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    #[serde(with = "core_types::amount::string")]
    pub amount: Amount,
}

#[derive(Debug, Deserialize)]
pub struct WithdrawRequest {
    #[serde(with = "core_types::amount::string")]
    pub shares: Amount,
}

#[derive(Debug, Deserialize)]
pub struct PlacementRequest {
    pub strategy: Address,
    #[serde(with = "core_types::amount::string")]
    pub amount: Amount,
}

#[derive(Debug, Deserialize)]
pub struct RebalanceRequest {
    pub strategies: Vec<Address>,
    #[serde(with = "core_types::amount::string_vec")]
    pub amounts: Vec<Amount>,
    /// Only used by the executor's own entry point.
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct AddressRequest {
    pub address: Address,
}

#[derive(Debug, Deserialize)]
pub struct TransferOwnershipRequest {
    pub new_owner: Address,
}

#[derive(Debug, Deserialize)]
pub struct RegisterStrategyRequest {
    pub strategy: Address,
    pub name: String,
    pub max_allocation: Bps,
}

#[derive(Debug, Deserialize)]
pub struct AllocationRequest {
    pub allocation: Bps,
}

#[derive(Debug, Deserialize)]
pub struct PerformanceRequest {
    pub apy: Bps,
    pub performance_score: u32,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub strategies: Vec<Address>,
}

#[derive(Debug, Deserialize)]
pub struct OptimalAllocationRequest {
    pub strategies: Vec<Address>,
    pub current_allocations: Vec<Bps>,
}

#[derive(Debug, Deserialize)]
pub struct Limit {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    20
}

// ==============================================================================
// Responses
// ==============================================================================

/// What a committed command returned.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CommandResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shares: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rebalance_id: Option<u64>,
}

impl From<CommandOutput> for CommandResponse {
    fn from(output: CommandOutput) -> Self {
        let mut response = CommandResponse {
            ok: true,
            shares: None,
            amount: None,
            rebalance_id: None,
        };
        match output {
            CommandOutput::Done => {}
            CommandOutput::SharesMinted(shares) => response.shares = Some(shares.to_string()),
            CommandOutput::AmountReturned(amount) => response.amount = Some(amount.to_string()),
            CommandOutput::RebalanceId(id) => response.rebalance_id = Some(id),
        }
        response
    }
}

#[derive(Debug, Serialize)]
pub struct PerformanceView {
    #[serde(flatten)]
    pub metrics: PerformanceMetrics,
    pub performing_well: bool,
}

#[derive(Debug, Serialize)]
pub struct ManagerView {
    pub owner: Address,
    pub vault: Address,
    pub rebalance_executor: Address,
    pub total_allocation: Bps,
    pub active_strategies: usize,
    pub paused: bool,
}

#[derive(Debug, Serialize)]
pub struct RebalanceStatusView {
    pub can_execute: bool,
    pub time_remaining: Timestamp,
    pub last_rebalance_time: Option<Timestamp>,
    pub rebalance_count: u64,
    pub auto_rebalance_enabled: bool,
    pub paused: bool,
}

#[derive(Debug, Serialize)]
pub struct AllocationView {
    pub allocations: Vec<Bps>,
}
