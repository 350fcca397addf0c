use super::{submit, AddressPath, JsonBody};
use crate::{
    caller::Caller,
    dto::{
        AddressRequest, AllocationRequest, AmountRequest, CommandResponse, ManagerView,
        PerformanceRequest, PerformanceView, RegisterStrategyRequest, TransferOwnershipRequest,
    },
    error::AppError,
    AppState,
};
use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::extract::WithRejection;
use core_types::StrategyRecord;
use engine::Command;
use std::sync::Arc;

type Response = Result<Json<CommandResponse>, AppError>;

// ==============================================================================
// Commands
// ==============================================================================

/// # POST /api/strategies
pub async fn register(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    WithRejection(Json(body), _): JsonBody<RegisterStrategyRequest>,
) -> Response {
    let command = Command::RegisterStrategy {
        strategy: body.strategy,
        name: body.name,
        max_allocation: body.max_allocation,
    };
    submit(&state, caller, command).await
}

/// # POST /api/strategies/:address/activate
pub async fn activate(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    WithRejection(Path(strategy), _): AddressPath,
) -> Response {
    submit(&state, caller, Command::ActivateStrategy { strategy }).await
}

/// # POST /api/strategies/:address/deactivate
pub async fn deactivate(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    WithRejection(Path(strategy), _): AddressPath,
) -> Response {
    submit(&state, caller, Command::DeactivateStrategy { strategy }).await
}

/// # POST /api/strategies/:address/allocation
pub async fn update_allocation(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    WithRejection(Path(strategy), _): AddressPath,
    WithRejection(Json(body), _): JsonBody<AllocationRequest>,
) -> Response {
    let command = Command::UpdateAllocation {
        strategy,
        allocation: body.allocation,
    };
    submit(&state, caller, command).await
}

/// # POST /api/strategies/:address/execute
/// The vault's bookkeeping hook; any other caller is rejected.
pub async fn record_execution(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    WithRejection(Path(strategy), _): AddressPath,
    WithRejection(Json(body), _): JsonBody<AmountRequest>,
) -> Response {
    let command = Command::RecordStrategyExecution {
        strategy,
        amount: body.amount,
    };
    submit(&state, caller, command).await
}

/// # POST /api/strategies/:address/performance
pub async fn update_performance(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    WithRejection(Path(strategy), _): AddressPath,
    WithRejection(Json(body), _): JsonBody<PerformanceRequest>,
) -> Response {
    let command = Command::UpdatePerformance {
        strategy,
        apy: body.apy,
        performance_score: body.performance_score,
    };
    submit(&state, caller, command).await
}

/// # POST /api/strategy-manager/vault
pub async fn set_vault(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    WithRejection(Json(body), _): JsonBody<AddressRequest>,
) -> Response {
    submit(&state, caller, Command::SetManagerVault { vault: body.address }).await
}

/// # POST /api/strategy-manager/rebalance-executor
pub async fn set_rebalance_executor(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    WithRejection(Json(body), _): JsonBody<AddressRequest>,
) -> Response {
    let command = Command::SetManagerRebalanceExecutor {
        rebalance_executor: body.address,
    };
    submit(&state, caller, command).await
}

/// # POST /api/strategy-manager/pause
pub async fn pause(State(state): State<Arc<AppState>>, Caller(caller): Caller) -> Response {
    submit(&state, caller, Command::PauseStrategyManager).await
}

/// # POST /api/strategy-manager/unpause
pub async fn unpause(State(state): State<Arc<AppState>>, Caller(caller): Caller) -> Response {
    submit(&state, caller, Command::UnpauseStrategyManager).await
}

/// # POST /api/strategy-manager/reset-allocations
pub async fn reset_allocations(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
) -> Response {
    submit(&state, caller, Command::ResetAllocations).await
}

/// # POST /api/strategy-manager/transfer-ownership
pub async fn transfer_ownership(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    WithRejection(Json(body), _): JsonBody<TransferOwnershipRequest>,
) -> Response {
    let command = Command::TransferStrategyManagerOwnership {
        new_owner: body.new_owner,
    };
    submit(&state, caller, command).await
}

// ==============================================================================
// Views
// ==============================================================================

/// # GET /api/strategies
pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<StrategyRecord>> {
    let records: Vec<StrategyRecord> = state
        .engine
        .read(|s, _| s.strategy_manager.all_strategies().into_iter().cloned().collect())
        .await;
    Json(records)
}

/// # GET /api/strategies/active
/// Records of the active strategies, in activation order.
pub async fn active(State(state): State<Arc<AppState>>) -> Json<Vec<StrategyRecord>> {
    let records: Vec<StrategyRecord> = state
        .engine
        .read(|s, _| {
            let manager = &s.strategy_manager;
            manager
                .active_strategies()
                .iter()
                .filter_map(|address| manager.strategy(*address).cloned())
                .collect()
        })
        .await;
    Json(records)
}

/// # GET /api/strategies/:address
pub async fn get(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(strategy), _): AddressPath,
) -> Result<Json<StrategyRecord>, AppError> {
    state
        .engine
        .read(|s, _| s.strategy_manager.strategy(strategy).cloned())
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("strategy {} is not registered", strategy)))
}

/// # GET /api/strategies/:address/performance
pub async fn performance(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(strategy), _): AddressPath,
) -> Result<Json<PerformanceView>, AppError> {
    state
        .engine
        .read(|s, _| {
            let manager = &s.strategy_manager;
            manager.performance_metrics(strategy).map(|metrics| PerformanceView {
                metrics,
                performing_well: manager.is_performing_well(strategy),
            })
        })
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("strategy {} is not registered", strategy)))
}

/// # GET /api/strategy-manager
pub async fn manager(State(state): State<Arc<AppState>>) -> Json<ManagerView> {
    let view = state
        .engine
        .read(|s, _| {
            let manager = &s.strategy_manager;
            ManagerView {
                owner: manager.owner(),
                vault: manager.vault(),
                rebalance_executor: manager.rebalance_executor(),
                total_allocation: manager.total_allocation(),
                active_strategies: manager.active_strategy_count(),
                paused: manager.is_paused(),
            }
        })
        .await;
    Json(view)
}
