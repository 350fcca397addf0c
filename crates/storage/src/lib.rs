//! # AutoFi Storage Crate
//!
//! The system's "permanent archive": a single JSON snapshot of the protocol
//! state, rewritten after every committed transaction.
//!
//! ## Architectural Principles
//!
//! - **Layer 3 Adapter:** This crate encapsulates all file-format and I/O
//!   details. It knows nothing about what the state contains beyond the fact
//!   that it is serializable.
//! - **Atomic Replacement:** Snapshots are written to a sibling temporary file,
//!   flushed, and renamed over the previous one, so a reader sees either the
//!   old or the new snapshot and never a torn one.
//!
//! ## Public API
//!
//! - `SnapshotStore`: Loads and saves snapshots at a fixed path.
//! - `Snapshot`: The on-disk envelope (format version, write time, state).
//! - `StorageError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod error;
pub mod snapshot;

// Re-export the key components to create a clean, public-facing API.
pub use error::StorageError;
pub use snapshot::{SNAPSHOT_VERSION, Snapshot, SnapshotStore};
