use super::{submit, AddressPath, JsonBody};
use crate::{
    caller::Caller,
    dto::{
        AddressRequest, AmountRequest, CommandResponse, PlacementRequest, RebalanceRequest,
        TransferOwnershipRequest, WithdrawRequest,
    },
    error::AppError,
    AppState,
};
use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::extract::WithRejection;
use engine::Command;
use std::sync::Arc;
use vault::{UserInfo, VaultInfo};

type Response = Result<Json<CommandResponse>, AppError>;

/// # POST /api/vault/deposit
pub async fn deposit(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    WithRejection(Json(body), _): JsonBody<AmountRequest>,
) -> Response {
    submit(&state, caller, Command::Deposit { amount: body.amount }).await
}

/// # POST /api/vault/withdraw
pub async fn withdraw(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    WithRejection(Json(body), _): JsonBody<WithdrawRequest>,
) -> Response {
    submit(&state, caller, Command::Withdraw { shares: body.shares }).await
}

/// # POST /api/vault/execute-strategy
/// Only the strategy manager may place capital.
pub async fn execute_strategy(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    WithRejection(Json(body), _): JsonBody<PlacementRequest>,
) -> Response {
    let command = Command::VaultExecuteStrategy {
        strategy: body.strategy,
        amount: body.amount,
    };
    submit(&state, caller, command).await
}

/// # POST /api/vault/rebalance
/// Only the rebalance executor may re-target placements.
pub async fn rebalance(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    WithRejection(Json(body), _): JsonBody<RebalanceRequest>,
) -> Response {
    let command = Command::VaultRebalance {
        strategies: body.strategies,
        amounts: body.amounts,
    };
    submit(&state, caller, command).await
}

/// # POST /api/vault/strategy-manager
pub async fn set_strategy_manager(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    WithRejection(Json(body), _): JsonBody<AddressRequest>,
) -> Response {
    let command = Command::SetVaultStrategyManager {
        strategy_manager: body.address,
    };
    submit(&state, caller, command).await
}

/// # POST /api/vault/rebalance-executor
pub async fn set_rebalance_executor(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    WithRejection(Json(body), _): JsonBody<AddressRequest>,
) -> Response {
    let command = Command::SetVaultRebalanceExecutor {
        rebalance_executor: body.address,
    };
    submit(&state, caller, command).await
}

/// # POST /api/vault/pause
pub async fn pause(State(state): State<Arc<AppState>>, Caller(caller): Caller) -> Response {
    submit(&state, caller, Command::PauseVault).await
}

/// # POST /api/vault/unpause
pub async fn unpause(State(state): State<Arc<AppState>>, Caller(caller): Caller) -> Response {
    submit(&state, caller, Command::UnpauseVault).await
}

/// # POST /api/vault/emergency-withdraw
/// Releases custody to the owner without touching depositor balances.
pub async fn emergency_withdraw(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    WithRejection(Json(body), _): JsonBody<AmountRequest>,
) -> Response {
    submit(&state, caller, Command::EmergencyWithdraw { amount: body.amount }).await
}

/// # POST /api/vault/transfer-ownership
pub async fn transfer_ownership(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    WithRejection(Json(body), _): JsonBody<TransferOwnershipRequest>,
) -> Response {
    let command = Command::TransferVaultOwnership {
        new_owner: body.new_owner,
    };
    submit(&state, caller, command).await
}

/// # GET /api/vault
pub async fn info(State(state): State<Arc<AppState>>) -> Json<VaultInfo> {
    Json(state.engine.read(|s, _| s.vault.vault_info()).await)
}

/// # GET /api/vault/users/:address
pub async fn user(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(user), _): AddressPath,
) -> Json<UserInfo> {
    Json(state.engine.read(|s, now| s.vault.user_info(user, now)).await)
}
