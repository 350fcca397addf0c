use crate::clock::Clock;
use crate::command::{Command, CommandOutput};
use crate::custody::AssetCustody;
use crate::error::EngineError;
use crate::state::ProtocolState;
use core_types::{Address, CallContext, ProtocolEvent, Timestamp};
use events::{EventEnvelope, EventJournal};
use std::sync::Arc;
use storage::SnapshotStore;
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, error, info, warn};

const JOURNAL_CAPACITY: usize = 1_000;
const EVENT_CHANNEL_CAPACITY: usize = 256;

struct Inner {
    state: ProtocolState,
    journal: EventJournal,
}

/// The serialised transaction executor over the protocol state.
///
/// Every command runs under one lock: read the clock once, apply the command
/// to a working copy, move assets, persist, then swap the copy in and publish
/// the buffered events. Any failure on the way drops the copy, leaving no
/// observable change.
pub struct Engine {
    inner: Mutex<Inner>,
    clock: Arc<dyn Clock>,
    custody: Arc<dyn AssetCustody>,
    store: Option<SnapshotStore>,
    events_tx: broadcast::Sender<EventEnvelope>,
}

impl Engine {
    pub fn new(
        state: ProtocolState,
        clock: Arc<dyn Clock>,
        custody: Arc<dyn AssetCustody>,
        store: Option<SnapshotStore>,
    ) -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Mutex::new(Inner {
                state,
                journal: EventJournal::new(JOURNAL_CAPACITY),
            }),
            clock,
            custody,
            store,
            events_tx,
        }
    }

    /// Runs `command` as `caller` as one all-or-nothing transaction.
    pub async fn execute(&self, caller: Address, command: Command) -> Result<CommandOutput, EngineError> {
        let name = command.name();
        let mut inner = self.inner.lock().await;
        let mut ctx = CallContext::new(caller, self.clock.now());
        let mut working = inner.state.clone();

        let applied = match command.apply(&mut working, &mut ctx) {
            Ok(applied) => applied,
            Err(e) => {
                warn!(command = name, %caller, error = e.name(), "command rejected: {}", e);
                return Err(e.into());
            }
        };

        if let Some(movement) = applied.custody {
            if let Err(e) = self.custody.apply(movement).await {
                warn!(command = name, %caller, "custody movement failed: {}", e);
                return Err(e.into());
            }
        }
        working.custody_held = self.custody.held().await;

        if let Some(store) = &self.store {
            if let Err(e) = store.save(&working).await {
                error!(command = name, %caller, "failed to persist state: {}", e);
                if let Some(movement) = applied.custody {
                    if let Err(undo) = self.custody.apply(movement.reversed()).await {
                        error!(command = name, ?movement, "failed to compensate custody movement: {}", undo);
                    }
                }
                return Err(e.into());
            }
        }

        inner.state = working;
        let published = self.publish(&mut inner.journal, ctx.into_events());
        info!(command = name, %caller, events = published, "command committed");
        Ok(applied.output)
    }

    /// Reads the committed state at the current time.
    pub async fn read<T>(&self, f: impl FnOnce(&ProtocolState, Timestamp) -> T) -> T {
        let inner = self.inner.lock().await;
        f(&inner.state, self.clock.now())
    }

    /// A copy of the committed state.
    pub async fn snapshot(&self) -> ProtocolState {
        self.inner.lock().await.state.clone()
    }

    /// Up to `limit` most recent events, oldest first.
    pub async fn recent_events(&self, limit: usize) -> Vec<EventEnvelope> {
        self.inner.lock().await.journal.recent(limit)
    }

    /// Live feed of committed events.
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.events_tx.subscribe()
    }

    /// Writes the committed state to the store, if one is configured.
    pub async fn persist(&self) -> Result<(), EngineError> {
        if let Some(store) = &self.store {
            let inner = self.inner.lock().await;
            store.save(&inner.state).await?;
        }
        Ok(())
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn custody(&self) -> &Arc<dyn AssetCustody> {
        &self.custody
    }

    /// Records setup events that were produced outside a transaction.
    pub async fn publish_bootstrap_events(&self, events: Vec<ProtocolEvent>) {
        let mut inner = self.inner.lock().await;
        self.publish(&mut inner.journal, events);
    }

    fn publish(&self, journal: &mut EventJournal, events: Vec<ProtocolEvent>) -> usize {
        let envelopes = journal.record(events);
        for envelope in &envelopes {
            debug!(sequence = envelope.sequence, event = %envelope.label, "event published");
            // No subscribers is not an error.
            let _ = self.events_tx.send(envelope.clone());
        }
        envelopes.len()
    }
}
