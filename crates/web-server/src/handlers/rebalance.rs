use super::{submit, JsonBody, LimitQuery};
use crate::{
    caller::Caller,
    dto::{
        AddressRequest, AllocationView, AnalyzeRequest, CommandResponse, OptimalAllocationRequest,
        PlacementRequest, RebalanceRequest, RebalanceStatusView, TransferOwnershipRequest,
    },
    error::AppError,
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use axum_extra::extract::WithRejection;
use core_types::{PerformanceAdvice, RebalanceConfig, RebalanceRecord};
use engine::Command;
use std::sync::Arc;

type Response = Result<Json<CommandResponse>, AppError>;

// ==============================================================================
// Commands
// ==============================================================================

/// # POST /api/rebalance/execute
/// Only the vault may record a rebalance.
pub async fn execute(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    WithRejection(Json(body), _): JsonBody<RebalanceRequest>,
) -> Response {
    let command = Command::ExecuteRebalance {
        strategies: body.strategies,
        amounts: body.amounts,
        reason: body.reason,
    };
    submit(&state, caller, command).await
}

/// # POST /api/rebalance/auto
pub async fn trigger_auto(State(state): State<Arc<AppState>>, Caller(caller): Caller) -> Response {
    submit(&state, caller, Command::TriggerAutoRebalance).await
}

/// # POST /api/rebalance/emergency
pub async fn emergency(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    WithRejection(Json(body), _): JsonBody<PlacementRequest>,
) -> Response {
    let command = Command::EmergencyRebalance {
        strategy: body.strategy,
        amount: body.amount,
    };
    submit(&state, caller, command).await
}

/// # POST /api/rebalance/config
pub async fn update_config(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    WithRejection(Json(config), _): JsonBody<RebalanceConfig>,
) -> Response {
    submit(&state, caller, Command::UpdateRebalanceConfig { config }).await
}

/// # POST /api/rebalance/reset-history
pub async fn reset_history(State(state): State<Arc<AppState>>, Caller(caller): Caller) -> Response {
    submit(&state, caller, Command::ResetHistory).await
}

/// # POST /api/rebalance/vault
pub async fn set_vault(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    WithRejection(Json(body), _): JsonBody<AddressRequest>,
) -> Response {
    submit(&state, caller, Command::SetExecutorVault { vault: body.address }).await
}

/// # POST /api/rebalance/strategy-manager
pub async fn set_strategy_manager(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    WithRejection(Json(body), _): JsonBody<AddressRequest>,
) -> Response {
    let command = Command::SetExecutorStrategyManager {
        strategy_manager: body.address,
    };
    submit(&state, caller, command).await
}

/// # POST /api/rebalance/pause
pub async fn pause(State(state): State<Arc<AppState>>, Caller(caller): Caller) -> Response {
    submit(&state, caller, Command::PauseRebalanceExecutor).await
}

/// # POST /api/rebalance/unpause
pub async fn unpause(State(state): State<Arc<AppState>>, Caller(caller): Caller) -> Response {
    submit(&state, caller, Command::UnpauseRebalanceExecutor).await
}

/// # POST /api/rebalance/transfer-ownership
pub async fn transfer_ownership(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    WithRejection(Json(body), _): JsonBody<TransferOwnershipRequest>,
) -> Response {
    let command = Command::TransferRebalanceExecutorOwnership {
        new_owner: body.new_owner,
    };
    submit(&state, caller, command).await
}

// ==============================================================================
// Advisory
// ==============================================================================

/// # POST /api/rebalance/analyze
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(body), _): JsonBody<AnalyzeRequest>,
) -> Json<PerformanceAdvice> {
    let advice = state
        .engine
        .read(|s, _| s.rebalance_executor.analyze_performance(&body.strategies))
        .await;
    Json(advice)
}

/// # POST /api/rebalance/optimal-allocation
pub async fn optimal_allocation(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(body), _): JsonBody<OptimalAllocationRequest>,
) -> Result<Json<AllocationView>, AppError> {
    let allocations = state
        .engine
        .read(|s, _| {
            s.rebalance_executor
                .calculate_optimal_allocation(&body.strategies, &body.current_allocations)
        })
        .await?;
    Ok(Json(AllocationView { allocations }))
}

// ==============================================================================
// Views
// ==============================================================================

/// # GET /api/rebalance/config
pub async fn config(State(state): State<Arc<AppState>>) -> Json<RebalanceConfig> {
    Json(state.engine.read(|s, _| s.rebalance_executor.config().clone()).await)
}

/// # GET /api/rebalance/status
pub async fn status(State(state): State<Arc<AppState>>) -> Json<RebalanceStatusView> {
    let view = state
        .engine
        .read(|s, now| {
            let executor = &s.rebalance_executor;
            let status = executor.can_execute_rebalance(now);
            RebalanceStatusView {
                can_execute: status.can_execute,
                time_remaining: status.time_remaining,
                last_rebalance_time: executor.last_rebalance_time(),
                rebalance_count: executor.rebalance_count(),
                auto_rebalance_enabled: executor.config().auto_rebalance_enabled,
                paused: executor.is_paused(),
            }
        })
        .await;
    Json(view)
}

/// # GET /api/rebalance/history?limit=N
/// Newest first.
pub async fn history(
    State(state): State<Arc<AppState>>,
    WithRejection(Query(query), _): LimitQuery,
) -> Json<Vec<RebalanceRecord>> {
    let records: Vec<RebalanceRecord> = state
        .engine
        .read(|s, _| {
            s.rebalance_executor
                .recent_rebalances(query.limit)
                .into_iter()
                .cloned()
                .collect()
        })
        .await;
    Json(records)
}

/// # GET /api/rebalance/history/:id
pub async fn history_entry(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): WithRejection<Path<u64>, AppError>,
) -> Result<Json<RebalanceRecord>, AppError> {
    let record = state
        .engine
        .read(|s, _| s.rebalance_executor.rebalance_history(id).cloned())
        .await?;
    Ok(Json(record))
}
