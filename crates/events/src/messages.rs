use crate::error::EventsError;
use chrono::{DateTime, Utc};
use core_types::ProtocolEvent;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Enum representing the severity of a log message for structured logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// A structured log message to be sent over WebSocket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogMessage {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

/// A committed protocol event, stamped for delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: Uuid,
    /// Monotonic across the lifetime of the journal that issued it.
    pub sequence: u64,
    pub published_at: DateTime<Utc>,
    /// `Component.EventName`.
    pub label: String,
    pub event: ProtocolEvent,
}

impl EventEnvelope {
    pub fn new(sequence: u64, event: ProtocolEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            sequence,
            published_at: Utc::now(),
            label: event.label(),
            event,
        }
    }
}

/// The top-level WebSocket message enum.
/// All communication from the server to the client will be one of these variants.
///
/// Serialized as `{"type": "...", "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum StreamMessage {
    /// A simple message to confirm to a new client that its WebSocket connection is active.
    Connected,
    /// A committed protocol event.
    Event(EventEnvelope),
    /// A structured log message.
    Log(LogMessage),
}

impl StreamMessage {
    pub fn to_json(&self) -> Result<String, EventsError> {
        Ok(serde_json::to_string(self)?)
    }
}
