use crate::command::{Command, CommandOutput};
use crate::engine::Engine;
use crate::error::EngineError;
use std::sync::Arc;
use tokio::time::{Duration, interval};
use tracing::{debug, error, info};

/// Periodically triggers the auto rebalance acting as the strategy manager.
///
/// Designed to run in a concurrent background task next to the RPC server.
pub struct AutoRebalancer {
    engine: Arc<Engine>,
    period: Duration,
}

impl AutoRebalancer {
    pub fn new(engine: Arc<Engine>, period: Duration) -> Self {
        Self { engine, period }
    }

    /// One check. Returns the id of the recorded rebalance, if one was due.
    pub async fn run_once(&self) -> Result<Option<u64>, EngineError> {
        let due = self
            .engine
            .read(|state, now| {
                let executor = &state.rebalance_executor;
                let enabled = executor.config().auto_rebalance_enabled && !executor.is_paused();
                let status = executor.can_execute_rebalance(now);
                debug!(enabled, time_remaining = status.time_remaining, "auto rebalance check");
                (enabled && status.can_execute).then(|| executor.strategy_manager())
            })
            .await;

        let Some(strategy_manager) = due else {
            return Ok(None);
        };
        match self
            .engine
            .execute(strategy_manager, Command::TriggerAutoRebalance)
            .await?
        {
            CommandOutput::RebalanceId(id) => {
                info!(id, "auto rebalance recorded");
                Ok(Some(id))
            }
            _ => Ok(None),
        }
    }

    pub async fn start(self) {
        info!(period_secs = self.period.as_secs(), "starting auto rebalance task");
        let mut timer = interval(self.period);

        loop {
            // The first tick is immediate.
            timer.tick().await;

            if let Err(e) = self.run_once().await {
                error!("auto rebalance failed: {}", e);
            }
        }
    }
}
