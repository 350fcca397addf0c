use super::LimitQuery;
use crate::{error::AppError, AppState};
use analytics::{AnalyticsEngine, PortfolioReport};
use axum::{
    extract::{Query, State},
    Json,
};
use axum_extra::extract::WithRejection;
use events::EventEnvelope;
use std::sync::Arc;

/// # GET /api/portfolio
/// TVL, weighted APY and per-strategy breakdown of the committed state.
pub async fn summary(State(state): State<Arc<AppState>>) -> Result<Json<PortfolioReport>, AppError> {
    let report = state
        .engine
        .read(|s, _| {
            let records = s.strategy_manager.all_strategies();
            AnalyticsEngine::new().portfolio_summary(s.vault.tvl(), &records)
        })
        .await?;
    Ok(Json(report))
}

/// # GET /api/events?limit=N
/// The most recent committed events, oldest first.
pub async fn events(
    State(state): State<Arc<AppState>>,
    WithRejection(Query(query), _): LimitQuery,
) -> Json<Vec<EventEnvelope>> {
    Json(state.engine.recent_events(query.limit).await)
}
