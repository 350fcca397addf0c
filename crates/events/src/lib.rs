//! # AutoFi Events
//!
//! This crate defines the real-time event structures used for WebSocket communication
//! between the engine and any connected client, plus the bounded journal the engine
//! keeps so late clients can catch up on recent history.
//!
//! As a Layer 0 crate, it depends only on `core-types`.

// Declare the modules that make up this crate.
pub mod error;
pub mod journal;
pub mod messages;

// Re-export the core types to provide a clean public API.
pub use error::EventsError;
pub use journal::EventJournal;
pub use messages::{EventEnvelope, LogLevel, LogMessage, StreamMessage};
