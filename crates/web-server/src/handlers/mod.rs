use crate::{dto::CommandResponse, error::AppError, AppState};
use axum::extract::{Json, Path, Query};
use axum_extra::extract::WithRejection;
use core_types::Address;
use engine::Command;

pub mod portfolio;
pub mod rebalance;
pub mod strategies;
pub mod stream;
pub mod vault;

pub(crate) type JsonBody<T> = WithRejection<Json<T>, AppError>;
pub(crate) type AddressPath = WithRejection<Path<Address>, AppError>;
pub(crate) type LimitQuery = WithRejection<Query<crate::dto::Limit>, AppError>;

/// Runs one command through the engine and reports its output.
pub(crate) async fn submit(
    state: &AppState,
    caller: Address,
    command: Command,
) -> Result<Json<CommandResponse>, AppError> {
    let output = state.engine.execute(caller, command).await?;
    Ok(Json(output.into()))
}

/// # GET /api/health
pub async fn health() -> &'static str {
    "OK"
}

pub async fn fallback() -> AppError {
    AppError::NotFound("no such route".to_string())
}

