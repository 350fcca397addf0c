use crate::clock::Clock;
use crate::custody::InMemoryCustody;
use crate::engine::Engine;
use crate::error::EngineError;
use crate::state::ProtocolState;
use configuration::Config;
use std::sync::Arc;
use storage::SnapshotStore;
use tracing::info;

/// How the engine's initial state was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Startup {
    Loaded,
    Bootstrapped,
}

/// Builds an engine from the configured snapshot, or bootstraps a fresh state
/// from configuration when there is none.
///
/// Custody is in-memory and starts out holding what the snapshot recorded.
pub async fn load_or_bootstrap(
    config: &Config,
    clock: Arc<dyn Clock>,
) -> Result<(Engine, Startup), EngineError> {
    let store = config.storage.snapshot_path.clone().map(SnapshotStore::new);

    if let Some(store) = &store {
        if let Some(snapshot) = store.load::<ProtocolState>().await? {
            let custody = Arc::new(InMemoryCustody::new(snapshot.state.custody_held));
            let engine = Engine::new(snapshot.state, clock, custody, Some(store.clone()));
            return Ok((engine, Startup::Loaded));
        }
    }

    let (state, events) = ProtocolState::bootstrap(config, clock.now())?;
    if let Some(store) = &store {
        store.ensure_parent_dir().await?;
    }
    let custody = Arc::new(InMemoryCustody::default());
    let engine = Engine::new(state, clock, custody, store);
    engine.persist().await?;
    engine.publish_bootstrap_events(events).await;
    info!("bootstrapped a fresh protocol state from configuration");
    Ok((engine, Startup::Bootstrapped))
}

/// Bootstraps a fresh state and writes it to the configured snapshot path.
/// An existing snapshot is only replaced with `force`.
pub async fn initialise(
    config: &Config,
    clock: &dyn Clock,
    force: bool,
) -> Result<ProtocolState, EngineError> {
    let path = config.storage.snapshot_path.clone().ok_or_else(|| {
        EngineError::Configuration("storage.snapshot_path must be set to initialise state".to_string())
    })?;
    let store = SnapshotStore::new(path);
    if store.exists().await && !force {
        return Err(EngineError::Configuration(format!(
            "a snapshot already exists at {}; pass --force to replace it",
            store.path().display()
        )));
    }

    let (state, _) = ProtocolState::bootstrap(config, clock.now())?;
    store.ensure_parent_dir().await?;
    store.save(&state).await?;
    info!(path = %store.path().display(), "protocol state initialised");
    Ok(state)
}
